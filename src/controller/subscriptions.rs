use actix_web::dev::HttpServiceFactory;
use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, Responder};

use chrono::{DateTime, Duration, Utc};

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use super::{acknowledge, Reply};
use crate::auth::AuthenticatedUser;
use crate::client::WorkflowClient;
use crate::error::{Error, RestError, RestResult};
use crate::model::{Subscription, SubscriptionDraft};
use crate::repo::SubscriptionRepo;
use crate::workflow::{ReminderPayload, ReminderWorkflowUrl};

/// Window of the upcoming renewals listing
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// JSON body for new subscriptions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriptionBody {
    name: String,
    price: f64,
    currency: Option<String>,
    frequency: Option<String>,
    category: String,
    payment_method: String,
    start_date: Option<DateTime<Utc>>,
    renewal_date: Option<DateTime<Utc>>,
}

impl NewSubscriptionBody {
    fn into_draft(self, user_id: Uuid) -> Result<SubscriptionDraft, Error> {
        Ok(SubscriptionDraft {
            user_id,
            name: self.name.parse()?,
            price: self.price.try_into()?,
            currency: self
                .currency
                .map(|c| c.parse())
                .transpose()?
                .unwrap_or_default(),
            frequency: self.frequency.map(|f| f.parse()).transpose()?,
            category: self.category.parse()?,
            payment_method: self.payment_method.parse()?,
            start_date: self.start_date,
            renewal_date: self.renewal_date,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSubscription {
    subscription: Subscription,
    workflow_run_id: String,
}

/// Create a subscription for the caller and start its reminder workflow
#[tracing::instrument(
    name = "Create a new subscription",
    skip(body, pool, workflow_client, callback),
    fields(user_id = %user.id())
)]
#[post("")]
async fn create(
    user: AuthenticatedUser,
    body: web::Json<NewSubscriptionBody>,
    pool: web::Data<PgPool>,
    workflow_client: web::Data<WorkflowClient>,
    callback: web::Data<ReminderWorkflowUrl>,
) -> RestResult<impl Responder> {
    let new_subscription = body
        .into_inner()
        .into_draft(user.id())?
        .prepare(Utc::now())?;

    let subscription = SubscriptionRepo::insert(pool.get_ref(), &new_subscription).await?;

    let payload = ReminderPayload {
        subscription_id: subscription.id.to_string(),
    };
    let workflow_run_id = match workflow_client
        .trigger(callback.get_ref().as_ref(), &payload, 0)
        .await
    {
        Ok(workflow_run_id) => workflow_run_id,
        Err(e) => {
            // A subscription is only kept once its reminder run exists
            SubscriptionRepo::delete(pool.get_ref(), subscription.id, user.id()).await?;
            return Err(Error::TriggerWorkflowError(e).into());
        }
    };

    Ok(Reply::new("Subscription created successfully")
        .data(CreatedSubscription {
            subscription,
            workflow_run_id,
        })
        .respond(StatusCode::CREATED))
}

/// All subscriptions of a user; only the user themself may list them
#[tracing::instrument(name = "List subscriptions of a user", skip(pool))]
#[get("/user/{id}")]
async fn list_for_user(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();
    if id.parse::<Uuid>().ok() != Some(user.id()) {
        return Err(RestError::Unauthorized(
            "You are not the owner of this account".into(),
        ));
    }

    let subscriptions = SubscriptionRepo::fetch_by_user(pool.get_ref(), user.id()).await?;

    Ok(Reply::new(format!("Fetched subscriptions for user {}", id))
        .total(subscriptions.len())
        .data(subscriptions)
        .respond(StatusCode::OK))
}

/// Active subscriptions of the caller renewing within the next week
#[tracing::instrument(name = "List upcoming renewals", skip(pool))]
#[get("/upcoming")]
async fn upcoming(user: AuthenticatedUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let now = Utc::now();
    let until = now + Duration::days(UPCOMING_WINDOW_DAYS);

    let subscriptions =
        SubscriptionRepo::fetch_upcoming(pool.get_ref(), user.id(), now, until).await?;

    Ok(Reply::new("Upcoming renewals fetched successfully")
        .total(subscriptions.len())
        .data(subscriptions)
        .respond(StatusCode::OK))
}

#[tracing::instrument(name = "Fetch a subscription", skip(pool))]
#[get("/{id}")]
async fn detail(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let subscription = SubscriptionRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .filter(|s| s.user_id == user.id())
        .ok_or_else(|| RestError::NotFound("Subscription not found".into()))?;

    Ok(Reply::new("Subscription fetched successfully")
        .data(subscription)
        .respond(StatusCode::OK))
}

#[tracing::instrument(name = "Cancel a subscription", skip(pool))]
#[put("/{id}/cancel")]
async fn cancel(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let subscription = SubscriptionRepo::cancel(pool.get_ref(), id, user.id())
        .await?
        .ok_or_else(|| RestError::NotFound("Subscription not found".into()))?;

    Ok(Reply::new("Subscription cancelled successfully")
        .data(subscription)
        .respond(StatusCode::OK))
}

#[tracing::instrument(name = "Delete a subscription", skip(pool))]
#[delete("/{id}")]
async fn remove(
    user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    if !SubscriptionRepo::delete(pool.get_ref(), id, user.id()).await? {
        return Err(RestError::NotFound("Subscription not found".into()));
    }

    Ok(acknowledge("Subscription deleted successfully"))
}

/// Subscriptions API endpoints
pub fn scope() -> impl HttpServiceFactory {
    // Literal paths go before `/{id}`
    web::scope("/subscriptions")
        .service(create)
        .service(upcoming)
        .service(list_for_user)
        .service(detail)
        .service(cancel)
        .service(remove)
}
