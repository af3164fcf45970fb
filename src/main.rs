use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use sqlx::postgres::PgPoolOptions;

use subtrack::app::{self, AppState};
use subtrack::auth::TokenExpiry;
use subtrack::client::{EmailClient, WorkflowClient};
use subtrack::controller::workflows::WorkflowSigningKey;
use subtrack::crypto::SigningKey;
use subtrack::settings::Settings;
use subtrack::telemetry;
use subtrack::workflow::{ReminderPlanner, ReminderWorkflowUrl, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.database.with_db());
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let email_client = EmailClient::new(
        settings.email.sender()?,
        settings.email.api_timeout(),
        settings.email.api_base_url()?,
        settings.email.api_auth_token(),
    )?;
    let workflow_client = WorkflowClient::new(
        settings.workflow.api_timeout(),
        settings.workflow.api_base_url()?,
        settings.workflow.api_auth_token(),
    )?;

    let state = AppState {
        pool: pool.clone(),
        signing_key: SigningKey::new(settings.app.secret_key())?,
        token_expiry: TokenExpiry(settings.app.token_expiry()),
        workflow_client,
        workflow_signing_key: WorkflowSigningKey(SigningKey::new(
            settings.workflow.signing_key(),
        )?),
        reminder_url: ReminderWorkflowUrl::new(&settings.app.base_url()?)?,
        reminders: ReminderPlanner::new(
            pool,
            email_client,
            Arc::new(SystemClock),
            settings.reminders.time_zone,
        ),
    };

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = ?listener.local_addr()?, "Starting server");

    app::run(listener, state)?
        .await
        .context("Failed to run app")
}
