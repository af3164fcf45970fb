use std::collections::HashSet;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 50;

/// Display name of a registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserName {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        lazy_static::lazy_static! {
            static ref INVALID_CHARS: HashSet<char> = vec!['/', '(', ')', '"', '<', '>', '\\', '{', '}']
                .into_iter()
                .collect();
        }

        let value = value.trim();
        let len = value.graphemes(true).count();

        if len == 0 {
            return Err(Error::parsing("User-Name is required"));
        }
        if len < MIN_LEN {
            return Err(Error::parsing("User-Name too short"));
        }
        if len > MAX_LEN {
            return Err(Error::parsing("User-Name too long"));
        }
        if value.chars().any(|c| INVALID_CHARS.contains(&c)) {
            return Err(Error::parsing("User-Name contains invalid characters"));
        }
        Ok(Self(value.to_string()))
    }
}

impl Serialize for UserName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
