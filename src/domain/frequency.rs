use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How often a subscription renews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Length of one renewal period in days
    pub fn period_days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }

    /// Renewal date one period after `start`
    pub fn renewal_after(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::days(self.period_days())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::parsing(format!("{} is not a valid frequency", other))),
        }
    }
}

impl AsRef<str> for Frequency {
    fn as_ref(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}
