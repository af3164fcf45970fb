use chrono::Duration;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use super::{SigningKey, Token, TokenResult};

/// Claims carried by a user's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(rename = "userId")]
    user_id: Uuid,
}

impl AccessToken {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Sign the claims into a token valid for `expires_in`
    pub fn sign(&self, key: &SigningKey, expires_in: Duration) -> TokenResult<Token> {
        Token::builder(self)
            .expires_in(expires_in)
            .sign(key.as_ref())
    }

    pub fn verify(key: &SigningKey, token: &str) -> TokenResult<Self> {
        token.parse::<Token>()?.verify(key.as_ref())
    }
}
