use std::time::Duration;

use anyhow::Context;

use reqwest::Client;

use serde::{Deserialize, Serialize};

use secrecy::Secret;

use url::Url;

const RETRIES_HEADER: &str = "Workflow-Retries";

/// Client for the durable workflow service
#[derive(Debug)]
pub struct WorkflowClient {
    client: Client,

    api_trigger_url: Url,
    api_auth_token: Secret<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerResponse {
    workflow_run_id: String,
}

impl WorkflowClient {
    pub fn new(
        api_timeout: Duration,
        api_base_url: Url,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_trigger_url = api_base_url
            .join("v2/trigger/")
            .context("Failed to create trigger endpoint URL")?;

        Ok(Self {
            client,
            api_trigger_url,
            api_auth_token,
        })
    }

    /// Start a new run of the workflow served at `callback_url`.
    /// Returns the run id assigned by the service.
    #[tracing::instrument(name = "Trigger a workflow run", skip(self, payload))]
    pub async fn trigger<P>(
        &self,
        callback_url: &Url,
        payload: &P,
        retries: u32,
    ) -> reqwest::Result<String>
    where
        P: Serialize + ?Sized,
    {
        use secrecy::ExposeSecret;

        let url = format!("{}{}", self.api_trigger_url, callback_url);

        let response: TriggerResponse = self
            .client
            .post(url)
            .bearer_auth(self.api_auth_token.expose_secret())
            .header(RETRIES_HEADER, retries.to_string())
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(workflow_run_id = %response.workflow_run_id, "Workflow run started");
        Ok(response.workflow_run_id)
    }
}
