use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use sqlx::PgPool;

use tracing_actix_web::TracingLogger;

use crate::auth::TokenExpiry;
use crate::client::WorkflowClient;
use crate::controller::workflows::{Reminders, WorkflowSigningKey};
use crate::controller::{auth, subscriptions, users, workflows};
use crate::crypto::SigningKey;
use crate::error::RestError;
use crate::workflow::ReminderWorkflowUrl;

/// Everything the request handlers share
pub struct AppState {
    pub pool: PgPool,
    /// Signs and verifies user access tokens
    pub signing_key: SigningKey,
    pub token_expiry: TokenExpiry,
    pub workflow_client: WorkflowClient,
    /// Verifies callbacks from the workflow service
    pub workflow_signing_key: WorkflowSigningKey,
    pub reminder_url: ReminderWorkflowUrl,
    pub reminders: Reminders,
}

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| RestError::ParseError(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    // Malformed ids cannot match a record
    web::PathConfig::default()
        .error_handler(|_err, _req| RestError::NotFound("Resource not found".into()).into())
}

/// Run the application on a specified TCP listener
pub fn run(listener: TcpListener, state: AppState) -> anyhow::Result<Server> {
    // Wrap application data
    let pool = web::Data::new(state.pool);
    let signing_key = web::Data::new(state.signing_key);
    let token_expiry = web::Data::new(state.token_expiry);
    let workflow_client = web::Data::new(state.workflow_client);
    let workflow_signing_key = web::Data::new(state.workflow_signing_key);
    let reminder_url = web::Data::new(state.reminder_url);
    let reminders = web::Data::new(state.reminders);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(pool.clone())
            .app_data(signing_key.clone())
            .app_data(token_expiry.clone())
            .app_data(workflow_client.clone())
            .app_data(workflow_signing_key.clone())
            .app_data(reminder_url.clone())
            .app_data(reminders.clone())
            .service(health_check)
            .service(
                web::scope("/api/v1")
                    .service(auth::scope())
                    .service(users::scope())
                    .service(subscriptions::scope())
                    .service(workflows::scope()),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
