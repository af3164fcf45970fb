use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;

use reqwest::Client;

use serde::Serialize;

use secrecy::Secret;

use url::Url;

use crate::domain::EmailAddress;

const EMAIL_TOKEN_HEADER: &str = "X-Postmark-Server-Token";
const MESSAGE_STREAM: &str = "outbound";

/// Client for the transactional email API
#[derive(Debug)]
pub struct EmailClient {
    client: Client,
    sender: EmailAddress,

    api_send_email_url: Url,
    api_auth_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        sender: EmailAddress,
        api_timeout: Duration,
        api_base_url: Url,
        api_auth_token: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_send_email_url = api_base_url
            .join("email")
            .context("Failed to create send email endpoint URL")?;

        Ok(Self {
            client,
            sender,
            api_send_email_url,
            api_auth_token,
        })
    }

    #[tracing::instrument(
        name = "Send an email via API",
        skip(self, email),
        fields(subject = %email.subject, tag = ?email.tag)
    )]
    pub async fn send(&self, email: &Email) -> reqwest::Result<()> {
        use secrecy::ExposeSecret;

        self.client
            .post(self.api_send_email_url.clone())
            .header(EMAIL_TOKEN_HEADER, self.api_auth_token.expose_secret())
            .json(&SendEmailRequest::new(&self.sender, email))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// An outgoing message; `tag` and `metadata` let the provider group and
/// trace deliveries
#[derive(Debug, Clone)]
pub struct Email {
    pub recipient: EmailAddress,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub tag: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Email {
    pub fn new(
        recipient: EmailAddress,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
            tag: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: &'a BTreeMap<String, String>,
}

impl<'a> SendEmailRequest<'a> {
    fn new(sender: &'a EmailAddress, email: &'a Email) -> Self {
        Self {
            from: sender.as_ref(),
            to: email.recipient.as_ref(),
            subject: &email.subject,
            html_body: &email.html_body,
            text_body: &email.text_body,
            message_stream: MESSAGE_STREAM,
            tag: email.tag.as_deref(),
            metadata: &email.metadata,
        }
    }
}
