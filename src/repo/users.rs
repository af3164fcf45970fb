use secrecy::Secret;

use sqlx::PgExecutor;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::model::{NewUser, User, UserCredentials};

/// Repository for the users table
pub struct UsersRepo;

impl UsersRepo {
    #[tracing::instrument("Insert a new user record", skip(executor, new_user))]
    pub async fn insert<'conn>(
        executor: impl PgExecutor<'conn>,
        new_user: &NewUser,
    ) -> sqlx::Result<User> {
        use secrecy::ExposeSecret;

        sqlx::query_as::<_, User>(
            "insert into users(name, email, password_hash) values ($1, $2, $3) \
             returning id, name, email, created_at, updated_at",
        )
        .bind(new_user.name.as_ref())
        .bind(new_user.email.as_ref())
        .bind(new_user.password_hash.expose_secret())
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument("Check whether an email is registered", skip(executor))]
    pub async fn exists_by_email<'conn>(
        executor: impl PgExecutor<'conn>,
        email: &EmailAddress,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar("select exists(select 1 from users where email=$1)")
            .bind(email.as_ref())
            .fetch_one(executor)
            .await
    }

    #[tracing::instrument("Fetch user credentials", skip(executor))]
    pub async fn fetch_credentials_by_email<'conn>(
        executor: impl PgExecutor<'conn>,
        email: &EmailAddress,
    ) -> sqlx::Result<Option<UserCredentials>> {
        let row: Option<(Uuid, String)> =
            sqlx::query_as("select id, password_hash from users where email=$1")
                .bind(email.as_ref())
                .fetch_optional(executor)
                .await?;

        Ok(row.map(|(id, password_hash)| UserCredentials {
            id,
            password_hash: Secret::new(password_hash),
        }))
    }

    #[tracing::instrument("Fetch a user by id", skip(executor))]
    pub async fn fetch_by_id<'conn>(
        executor: impl PgExecutor<'conn>,
        id: Uuid,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "select id, name, email, created_at, updated_at from users where id=$1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    #[tracing::instrument("Fetch all users", skip(executor))]
    pub async fn fetch_all<'conn>(executor: impl PgExecutor<'conn>) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            "select id, name, email, created_at, updated_at from users order by created_at",
        )
        .fetch_all(executor)
        .await
    }
}
