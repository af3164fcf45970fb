use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 100;

/// Name of a tracked subscription, e.g. "Netflix Premium"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionName(String);

impl AsRef<str> for SubscriptionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SubscriptionName {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        let len = value.graphemes(true).count();

        if len == 0 {
            return Err(Error::parsing("Subscription name is required"));
        }
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(Error::parsing(format!(
                "Subscription name must be between {} and {} characters",
                MIN_LEN, MAX_LEN
            )));
        }
        Ok(Self(value.to_string()))
    }
}

/// Free-form payment method label, e.g. "Credit Card"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod(String);

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::parsing("Payment method is required"));
        }
        Ok(Self(value.to_string()))
    }
}
