use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, Currency, Frequency, PaymentMethod, Price, SubscriptionName, SubscriptionStatus,
};
use crate::error::{Error, Result};

/// Validated subscription request before the renewal rules are applied
#[derive(Debug)]
pub struct SubscriptionDraft {
    pub user_id: Uuid,
    pub name: SubscriptionName,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Option<Frequency>,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub start_date: Option<DateTime<Utc>>,
    pub renewal_date: Option<DateTime<Utc>>,
}

impl SubscriptionDraft {
    /// Resolve the start/renewal dates and initial status as of `now`.
    ///
    /// A missing start date defaults to `now` and a missing renewal date is
    /// derived from the frequency. A renewal already in the past marks the
    /// subscription as expired.
    pub fn prepare(self, now: DateTime<Utc>) -> Result<NewSubscription> {
        let start_date = self.start_date.unwrap_or(now);
        if start_date > now {
            return Err(Error::parsing("Start date must be in the past"));
        }

        let renewal_date = match (self.renewal_date, self.frequency) {
            (Some(renewal_date), _) => renewal_date,
            (None, Some(frequency)) => frequency.renewal_after(start_date),
            (None, None) => {
                return Err(Error::parsing(
                    "Renewal date is required when no frequency is given",
                ))
            }
        };
        if renewal_date <= start_date {
            return Err(Error::parsing(
                "Renewal date must be greater than start-date",
            ));
        }

        let status = if renewal_date < now {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        };

        Ok(NewSubscription {
            user_id: self.user_id,
            name: self.name,
            price: self.price,
            currency: self.currency,
            frequency: self.frequency,
            category: self.category,
            payment_method: self.payment_method,
            status,
            start_date,
            renewal_date,
        })
    }
}

/// New subscription ready to be persisted
#[derive(Debug)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub name: SubscriptionName,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Option<Frequency>,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
}

/// Stored subscription record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// User supplied data, validated on the way in
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Option<Frequency>,
    pub category: Category,
    pub payment_method: String,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub renewal_date: DateTime<Utc>,
    /// NOTE: Auto-set and updated by database triggers
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name and email of the user owning a subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Subscription snapshot joined with its owner, as read by the reminder workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub user: SubscriptionOwner,
}
