use actix_web::dev::HttpServiceFactory;
use actix_web::http::StatusCode;
use actix_web::{get, web, Responder};

use sqlx::PgPool;

use uuid::Uuid;

use super::Reply;
use crate::auth::AuthenticatedUser;
use crate::error::{RestError, RestResult};
use crate::repo::UsersRepo;

#[tracing::instrument(name = "List users", skip(pool))]
#[get("")]
async fn list(_user: AuthenticatedUser, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let users = UsersRepo::fetch_all(pool.get_ref()).await?;

    Ok(Reply::new("Users fetched successfully")
        .data(users)
        .respond(StatusCode::OK))
}

#[tracing::instrument(name = "Fetch a user", skip(pool))]
#[get("/{id}")]
async fn detail(
    _user: AuthenticatedUser,
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid,)>,
) -> RestResult<impl Responder> {
    let (id,) = path.into_inner();

    let user = UsersRepo::fetch_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| RestError::NotFound("User not found".into()))?;

    Ok(Reply::new("User fetched successfully")
        .data(user)
        .respond(StatusCode::OK))
}

/// Users API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/users").service(list).service(detail)
}
