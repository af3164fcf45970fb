mod subscriptions;
mod users;

pub use subscriptions::{
    NewSubscription, Subscription, SubscriptionDetails, SubscriptionDraft, SubscriptionOwner,
};
pub use users::{NewUser, User, UserCredentials};
