mod category;
mod email_address;
mod frequency;
mod password;
mod price;
mod subscription_name;
mod subscription_status;
mod user_name;

pub use category::Category;
pub use email_address::EmailAddress;
pub use frequency::Frequency;
pub use password::Password;
pub use price::{Currency, Price};
pub use subscription_name::{PaymentMethod, SubscriptionName};
pub use subscription_status::SubscriptionStatus;
pub use user_name::UserName;
