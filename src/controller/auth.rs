use actix_web::dev::HttpServiceFactory;
use actix_web::http::StatusCode;
use actix_web::{post, web, Responder};

use secrecy::Secret;

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use super::{acknowledge, Reply};
use crate::auth::{hash_password, validate_credentials, TokenExpiry};
use crate::crypto::{AccessToken, SigningKey, Token};
use crate::domain::{EmailAddress, Password, UserName};
use crate::error::{Error, RestError, RestResult};
use crate::model::{NewUser, User};
use crate::repo::UsersRepo;

#[derive(Debug, Deserialize)]
pub struct SignUpBody {
    name: String,
    email: String,
    password: Secret<String>,
}

/// Parsed sign-up request, password still in plaintext
struct SignUp {
    name: UserName,
    email: EmailAddress,
    password: Password,
}

impl TryFrom<SignUpBody> for SignUp {
    type Error = Error;

    fn try_from(body: SignUpBody) -> Result<Self, Self::Error> {
        use secrecy::ExposeSecret;

        Ok(Self {
            name: body.name.parse()?,
            email: body.email.parse()?,
            password: body.password.expose_secret().parse()?,
        })
    }
}

#[derive(Deserialize)]
pub struct SignInBody {
    email: String,
    password: Secret<String>,
}

impl std::fmt::Debug for SignInBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInBody")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct Session {
    token: Token,
    user: User,
}

fn issue_token(user: &User, key: &SigningKey, expiry: TokenExpiry) -> RestResult<Token> {
    AccessToken::new(user.id)
        .sign(key, expiry.0)
        .map_err(|e| Error::TokenSigning(e).into())
}

/// Register a new user and hand back a session token
#[tracing::instrument(
    name = "Sign up a new user",
    skip(body, pool, signing_key, expiry),
    fields(email = %body.email)
)]
#[post("/sign-up")]
async fn sign_up(
    body: web::Json<SignUpBody>,
    pool: web::Data<PgPool>,
    signing_key: web::Data<SigningKey>,
    expiry: web::Data<TokenExpiry>,
) -> RestResult<impl Responder> {
    let sign_up: SignUp = body.into_inner().try_into()?;

    if UsersRepo::exists_by_email(pool.get_ref(), &sign_up.email).await? {
        return Err(RestError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(sign_up.password).await?;
    let new_user = NewUser {
        name: sign_up.name,
        email: sign_up.email,
        password_hash,
    };

    let user = {
        let mut tx = pool.begin().await?;
        let user = UsersRepo::insert(&mut *tx, &new_user).await?;
        tx.commit().await?;
        user
    };

    let token = issue_token(&user, &signing_key, *expiry.get_ref())?;
    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Reply::new("User created successfully")
        .data(Session { token, user })
        .respond(StatusCode::CREATED))
}

/// Exchange email and password for a session token
#[tracing::instrument(
    name = "Sign in a user",
    skip(body, pool, signing_key, expiry),
    fields(email = %body.email)
)]
#[post("/sign-in")]
async fn sign_in(
    body: web::Json<SignInBody>,
    pool: web::Data<PgPool>,
    signing_key: web::Data<SigningKey>,
    expiry: web::Data<TokenExpiry>,
) -> RestResult<impl Responder> {
    let SignInBody { email, password } = body.into_inner();
    let email: EmailAddress = email.parse()?;

    let user_id = validate_credentials(pool.get_ref(), &email, password).await?;
    let user = UsersRepo::fetch_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| RestError::Unauthorized("User not found".into()))?;

    let token = issue_token(&user, &signing_key, *expiry.get_ref())?;

    Ok(Reply::new("User signed in successfully")
        .data(Session { token, user })
        .respond(StatusCode::OK))
}

/// Tokens are stateless; signing out only needs acknowledging
#[tracing::instrument(name = "Sign out a user")]
#[post("/sign-out")]
async fn sign_out() -> impl Responder {
    acknowledge("User signed out successfully")
}

/// Authentication API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/auth")
        .service(sign_up)
        .service(sign_in)
        .service(sign_out)
}
