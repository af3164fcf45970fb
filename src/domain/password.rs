use std::str::FromStr;

use secrecy::{ExposeSecret, Secret};

use crate::error::{Error, Result};

const MIN_LEN: usize = 6;

/// A plaintext password supplied by a user at sign-up
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl FromStr for Password {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::parsing("User-Password is required"));
        }
        if value.chars().count() < MIN_LEN {
            return Err(Error::parsing("User-Password must be at least 6 characters"));
        }
        Ok(Self(Secret::new(value.to_string())))
    }
}

impl ExposeSecret<String> for Password {
    fn expose_secret(&self) -> &String {
        self.0.expose_secret()
    }
}

impl From<Password> for Secret<String> {
    fn from(value: Password) -> Self {
        value.0
    }
}
