use uuid::Uuid;

use chrono::{DateTime, Utc};

use sqlx::{PgExecutor, PgPool};

use crate::domain::SubscriptionStatus;
use crate::error::{Error, Result};
use crate::model::{NewSubscription, Subscription, SubscriptionDetails, SubscriptionOwner};
use crate::workflow::SubscriptionStore;

/// Raw subscription row, with enum columns still as text
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    price: f64,
    currency: String,
    frequency: Option<String>,
    category: String,
    payment_method: String,
    status: String,
    start_date: DateTime<Utc>,
    renewal_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = Error;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            price: row.price,
            currency: row.currency.parse()?,
            frequency: row.frequency.map(|f| f.parse()).transpose()?,
            category: row.category.parse()?,
            payment_method: row.payment_method,
            status: row.status.parse()?,
            start_date: row.start_date,
            renewal_date: row.renewal_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionDetailsRow {
    #[sqlx(flatten)]
    subscription: SubscriptionRow,
    owner_name: String,
    owner_email: String,
}

impl TryFrom<SubscriptionDetailsRow> for SubscriptionDetails {
    type Error = Error;

    fn try_from(row: SubscriptionDetailsRow) -> Result<Self> {
        let subscription: Subscription = row.subscription.try_into()?;
        let user = SubscriptionOwner {
            id: subscription.user_id,
            name: row.owner_name,
            email: row.owner_email,
        };
        Ok(Self { subscription, user })
    }
}

const COLUMNS: &str = "id, user_id, name, price, currency, frequency, category, payment_method, \
                       status, start_date, renewal_date, created_at, updated_at";

/// Repository for the subscriptions table
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    #[tracing::instrument(name = "Insert subscription", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_subscription: &NewSubscription,
    ) -> Result<Subscription> {
        let sql = format!(
            "insert into subscriptions(user_id, name, price, currency, frequency, category, \
             payment_method, status, start_date, renewal_date) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) returning {}",
            COLUMNS
        );
        let row: SubscriptionRow = sqlx::query_as(&sql)
            .bind(new_subscription.user_id)
            .bind(new_subscription.name.as_ref())
            .bind(f64::from(new_subscription.price))
            .bind(new_subscription.currency.as_ref())
            .bind(new_subscription.frequency.map(|f| f.as_ref().to_string()))
            .bind(new_subscription.category.as_ref())
            .bind(new_subscription.payment_method.as_ref())
            .bind(new_subscription.status.as_ref())
            .bind(new_subscription.start_date)
            .bind(new_subscription.renewal_date)
            .fetch_one(executor)
            .await?;

        row.try_into()
    }

    #[tracing::instrument(name = "Fetch a subscription by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> Result<Option<Subscription>> {
        let sql = format!("select {} from subscriptions where id=$1", COLUMNS);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        row.map(Subscription::try_from).transpose()
    }

    #[tracing::instrument(name = "Fetch subscriptions of a user", skip(executor))]
    pub async fn fetch_by_user<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>> {
        let sql = format!(
            "select {} from subscriptions where user_id=$1 order by created_at",
            COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    /// Active subscriptions of a user renewing in `[from, until]`, soonest first
    #[tracing::instrument(name = "Fetch upcoming renewals", skip(executor))]
    pub async fn fetch_upcoming<'con>(
        executor: impl PgExecutor<'con>,
        user_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Subscription>> {
        let sql = format!(
            "select {} from subscriptions \
             where user_id=$1 and status=$2 and renewal_date >= $3 and renewal_date <= $4 \
             order by renewal_date",
            COLUMNS
        );
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(SubscriptionStatus::Active.as_ref())
            .bind(from)
            .bind(until)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    /// Subscription joined with its owner's name and email
    #[tracing::instrument(name = "Fetch subscription details", skip(executor))]
    pub async fn fetch_details_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> Result<Option<SubscriptionDetails>> {
        let row: Option<SubscriptionDetailsRow> = sqlx::query_as(
            "select s.id, s.user_id, s.name, s.price, s.currency, s.frequency, s.category, \
             s.payment_method, s.status, s.start_date, s.renewal_date, s.created_at, s.updated_at, \
             u.name as owner_name, u.email as owner_email \
             from subscriptions s join users u on u.id = s.user_id \
             where s.id=$1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        row.map(SubscriptionDetails::try_from).transpose()
    }

    /// Mark a subscription owned by `user_id` as cancelled.
    /// Returns `None` when no such subscription exists for that owner.
    #[tracing::instrument(name = "Cancel subscription", skip(executor))]
    pub async fn cancel<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Subscription>> {
        let sql = format!(
            "update subscriptions set status=$3 where id=$1 and user_id=$2 returning {}",
            COLUMNS
        );
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(user_id)
            .bind(SubscriptionStatus::Cancelled.as_ref())
            .fetch_optional(executor)
            .await?;

        row.map(Subscription::try_from).transpose()
    }

    /// Delete a subscription owned by `user_id`, returning whether a row was removed
    #[tracing::instrument(name = "Delete subscription", skip(executor))]
    pub async fn delete<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query("delete from subscriptions where id=$1 and user_id=$2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for PgPool {
    async fn find_subscription(&self, id: &str) -> anyhow::Result<Option<SubscriptionDetails>> {
        let Ok(id) = id.parse::<Uuid>() else {
            tracing::warn!(id, "Malformed subscription id");
            return Ok(None);
        };
        Ok(SubscriptionRepo::fetch_details_by_id(self, id).await?)
    }
}
