use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    News,
    Entertainment,
    Lifestyle,
    Technology,
    Finance,
    Politics,
    Other,
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "sports" => Ok(Self::Sports),
            "news" => Ok(Self::News),
            "entertainment" => Ok(Self::Entertainment),
            "lifestyle" => Ok(Self::Lifestyle),
            "technology" => Ok(Self::Technology),
            "finance" => Ok(Self::Finance),
            "politics" => Ok(Self::Politics),
            "other" => Ok(Self::Other),
            other => Err(Error::parsing(format!("{} is not a valid category", other))),
        }
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        match self {
            Self::Sports => "sports",
            Self::News => "news",
            Self::Entertainment => "entertainment",
            Self::Lifestyle => "lifestyle",
            Self::Technology => "technology",
            Self::Finance => "finance",
            Self::Politics => "politics",
            Self::Other => "other",
        }
    }
}
