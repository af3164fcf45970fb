use actix_web::dev::HttpServiceFactory;
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};

use anyhow::Context;

use sqlx::PgPool;

use crate::client::EmailClient;
use crate::crypto::SigningKey;
use crate::error::{RestError, RestResult};
use crate::workflow::{
    ReminderPayload, ReminderPlanner, ReplayContext, WorkflowInvocation, WorkflowOutcome,
};

/// Header carrying the base64url HMAC of a callback body
pub const SIGNATURE_HEADER: &str = "Workflow-Signature";

/// The reminder planner as wired into the running application
pub type Reminders = ReminderPlanner<PgPool, EmailClient>;

/// Key shared with the workflow service for signing callbacks
#[derive(Debug)]
pub struct WorkflowSigningKey(pub SigningKey);

fn verify_signature(req: &HttpRequest, body: &[u8], key: &WorkflowSigningKey) -> RestResult<()> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .context("Missing workflow signature")
        .and_then(|value| value.to_str().context("Malformed workflow signature"))
        .map_err(RestError::FailedToAuthenticate)?;

    key.0
        .verify(body, signature)
        .context("Workflow signature mismatch")
        .map_err(RestError::FailedToAuthenticate)
}

/// Callback invoked by the workflow service for each step of a reminder run
#[tracing::instrument(
    name = "Run reminder workflow",
    skip(req, body, planner, key),
    fields(workflow_run_id = tracing::field::Empty)
)]
#[post("/subscriptions/reminder")]
async fn reminder(
    req: HttpRequest,
    body: web::Bytes,
    planner: web::Data<Reminders>,
    key: web::Data<WorkflowSigningKey>,
) -> RestResult<impl Responder> {
    verify_signature(&req, &body, &key)?;

    let invocation: WorkflowInvocation<ReminderPayload> = serde_json::from_slice(&body)
        .map_err(|e| RestError::ParseError(format!("Invalid workflow invocation: {}", e)))?;
    tracing::Span::current().record(
        "workflow_run_id",
        tracing::field::display(&invocation.workflow_run_id),
    );

    let ctx = ReplayContext::new(planner.clock(), invocation.steps);
    let result = planner
        .run(&ctx, &invocation.payload.subscription_id)
        .await;

    let outcome = WorkflowOutcome::settle(result).map_err(|e| {
        tracing::error!(error.cause_chain = ?e, "Reminder workflow step failed");
        RestError::Other(e.into())
    })?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Workflow callback endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/workflows").service(reminder)
}
