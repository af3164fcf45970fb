use actix_web::http::header::{self, HeaderMap};

use anyhow::Context;

const BEARER_AUTH_PREFIX: &str = "Bearer ";

/// Raw bearer token pulled from a request, not yet verified
#[derive(Debug)]
pub struct BearerToken(String);

impl BearerToken {
    /// Extract the bearer token from the headers of a request
    pub fn from_headers(headers: &HeaderMap) -> anyhow::Result<Self> {
        let header_value = headers
            .get(header::AUTHORIZATION)
            .context("Missing authorization in header")?
            .to_str()?;

        if header_value.starts_with(BEARER_AUTH_PREFIX) {
            Self::from_bearer(header_value)
        } else {
            anyhow::bail!("Missing or unknown Authorization scheme")
        }
    }

    /// Extract the token from a string formatted as 'Bearer <token>'
    pub fn from_bearer(header_value: &str) -> anyhow::Result<Self> {
        let token = header_value
            .strip_prefix(BEARER_AUTH_PREFIX)
            .context("Authorization scheme not bearer")?
            .trim();

        if token.is_empty() {
            anyhow::bail!("Missing bearer token");
        }
        Ok(Self(token.to_string()))
    }
}

impl AsRef<str> for BearerToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
