mod subscriptions;
mod users;

pub use subscriptions::SubscriptionRepo;
pub use users::UsersRepo;
