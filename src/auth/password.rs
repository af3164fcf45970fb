use anyhow::Context;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use secrecy::Secret;

use sqlx::PgPool;

use uuid::Uuid;

use crate::domain::{EmailAddress, Password};
use crate::error::{RestError, RestResult};
use crate::repo::UsersRepo;
use crate::telemetry::spawn_blocking_with_tracing;

/// Hash a new user's password off the async executor
#[tracing::instrument("Hash password", skip(password))]
pub async fn hash_password(password: Password) -> RestResult<Secret<String>> {
    let password: Secret<String> = password.into();

    spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("Failed to spawn blocking task")?
}

fn compute_password_hash(password: Secret<String>) -> RestResult<Secret<String>> {
    use argon2::password_hash::rand_core::OsRng;
    use secrecy::ExposeSecret;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(Secret::new(password_hash))
}

/// Check an email/password pair against the stored hash, returning the user id
#[tracing::instrument("Validate credentials", skip(pool, password))]
pub async fn validate_credentials(
    pool: &PgPool,
    email: &EmailAddress,
    password: Secret<String>,
) -> RestResult<Uuid> {
    let user = UsersRepo::fetch_credentials_by_email(pool, email)
        .await?
        .context("No user stored for email")
        .map_err(RestError::FailedToAuthenticate)?;

    spawn_blocking_with_tracing(move || verify_password_hash(password, user.password_hash))
        .await
        .context("Failed to spawn blocking task")??;

    Ok(user.id)
}

#[tracing::instrument("Verify password hash", skip(password, password_hash))]
fn verify_password_hash(password: Secret<String>, password_hash: Secret<String>) -> RestResult<()> {
    use secrecy::ExposeSecret;

    let password_hash = PasswordHash::new(password_hash.expose_secret())
        .map_err(|e| anyhow::anyhow!("Failed to parse stored password hash: {}", e))?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to verify password hash: {}", e))
        .map_err(RestError::FailedToAuthenticate)?;

    Ok(())
}
