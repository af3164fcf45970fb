use std::future::Future;
use std::pin::Pin;

use actix_web::{dev, web, FromRequest, HttpRequest};

use sqlx::PgPool;

use uuid::Uuid;

use crate::auth::BearerToken;
use crate::crypto::{AccessToken, SigningKey};
use crate::error::RestError;
use crate::model::User;
use crate::repo::UsersRepo;

/// Extractor that only succeeds for requests carrying a valid bearer token
/// of an existing user
#[derive(Debug)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = RestError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // NOTE: Must be registered with the application at startup
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .ok_or_else(|| RestError::InternalError("PgPool not registered".into()))?;
            let signing_key = req
                .app_data::<web::Data<SigningKey>>()
                .ok_or_else(|| RestError::InternalError("SigningKey not registered".into()))?;

            let token = BearerToken::from_headers(req.headers())
                .map_err(RestError::FailedToAuthenticate)?;
            let claims = AccessToken::verify(signing_key, token.as_ref()).map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                RestError::Unauthorized("Invalid or expired token".into())
            })?;

            let user = UsersRepo::fetch_by_id(pool.get_ref(), claims.user_id())
                .await?
                .ok_or_else(|| RestError::Forbidden("User no longer exists".into()))?;

            Ok(AuthenticatedUser(user))
        })
    }
}
