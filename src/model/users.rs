use chrono::{DateTime, Utc};

use secrecy::Secret;

use serde::Serialize;

use uuid::Uuid;

use crate::domain::{EmailAddress, UserName};

#[derive(Debug)]
pub struct NewUser {
    pub name: UserName,
    pub email: EmailAddress,
    pub password_hash: Secret<String>,
}

/// Stored user record, without credentials
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: Secret<String>,
}
