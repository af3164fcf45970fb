use std::fmt;
use std::str::FromStr;

use hmac::Mac;

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Duration, TimeZone, Utc};

use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine as _,
};

lazy_static::lazy_static! {
    // Url-safe, unpadded base64 engine shared by tokens and payload signatures
    pub(crate) static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
}

/// Various errors that can occur when handling tokens
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is expired")]
    Expired,
    #[error("Failed to decode or encode token")]
    DecodeEncodeError,
}

impl From<std::str::Utf8Error> for TokenError {
    fn from(_e: std::str::Utf8Error) -> Self {
        Self::DecodeEncodeError
    }
}

impl From<serde_json::Error> for TokenError {
    fn from(_e: serde_json::Error) -> Self {
        Self::DecodeEncodeError
    }
}

impl From<base64::DecodeError> for TokenError {
    fn from(_e: base64::DecodeError) -> Self {
        Self::DecodeEncodeError
    }
}

pub type TokenResult<T> = Result<T, TokenError>;

/// A serialized, HMAC-signed token of the form `<base64 message>.<base64 signature>`
#[derive(Debug, Clone, PartialEq)]
pub struct Token(String);

impl Token {
    pub fn builder<T: Serialize>(payload: T) -> TokenBuilder<T> {
        TokenBuilder::new(payload)
    }

    /// Verify the signature and expiry, returning the decoded payload
    pub fn verify<T, K>(&self, key: &K) -> TokenResult<T>
    where
        T: for<'de> Deserialize<'de>,
        K: Mac + Clone,
    {
        self.verify_at(key, Utc::now())
    }

    /// Verify the token as of a given instant
    pub fn verify_at<T, K>(&self, key: &K, now: DateTime<Utc>) -> TokenResult<T>
    where
        T: for<'de> Deserialize<'de>,
        K: Mac + Clone,
    {
        let (msg, sig) = self.0.split_once('.').ok_or(TokenError::DecodeEncodeError)?;
        let msg = BASE64_ENGINE.decode(msg)?;
        let sig = BASE64_ENGINE.decode(sig)?;

        key.clone()
            .chain_update(&msg)
            .verify_slice(&sig)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let msg: TokenMessage<T> = serde_json::from_str(std::str::from_utf8(&msg)?)?;
        if msg.is_expired(now) {
            return Err(TokenError::Expired);
        }
        Ok(msg.data)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::DecodeEncodeError);
        }
        Ok(Self(token.to_string()))
    }
}

impl Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug)]
pub struct TokenBuilder<T> {
    expiration: Option<DateTime<Utc>>,
    payload: T,
}

impl<T: Serialize> TokenBuilder<T> {
    pub fn new(payload: T) -> Self {
        Self {
            expiration: None,
            payload,
        }
    }

    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expiration = Some(Utc::now() + duration);
        self
    }

    pub fn expires_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.expiration = Some(timestamp);
        self
    }

    pub fn sign<K>(self, key: &K) -> TokenResult<Token>
    where
        K: Mac + Clone,
    {
        let msg = serde_json::to_string(&TokenMessage {
            exp: self.expiration.map(|date| date.timestamp()),
            data: self.payload,
        })?;
        let sig = key
            .clone()
            .chain_update(msg.as_bytes())
            .finalize()
            .into_bytes();

        Ok(Token(format!(
            "{}.{}",
            BASE64_ENGINE.encode(msg),
            BASE64_ENGINE.encode(sig)
        )))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenMessage<T> {
    exp: Option<i64>,
    data: T,
}

impl<T> TokenMessage<T> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            None => false,
            // An unrepresentable timestamp never validates
            Some(exp) => Utc
                .timestamp_opt(exp, 0)
                .earliest()
                .map_or(true, |exp| now >= exp),
        }
    }
}
