use crate::crypto::TokenError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Parsing errors
    #[error("{0}")]
    ParsingError(String),
    // Token errors
    #[error("Failed to sign token")]
    TokenSigning(TokenError),
    #[error("Failed to verify token")]
    TokenVerification(TokenError),
    // REST client errors
    #[error("Failed to send email: {0}")]
    SendEmailError(reqwest::Error),
    #[error("Failed to trigger workflow: {0}")]
    TriggerWorkflowError(reqwest::Error),
    // Database errors
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),
}

impl Error {
    pub(crate) fn parsing(msg: impl Into<String>) -> Self {
        Self::ParsingError(msg.into())
    }
}

pub type RestResult<T> = std::result::Result<T, RestError>;

/// Errors surfaced by the REST layer, rendered as `{"success": false, "message": ...}`
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("{0}")]
    ParseError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Unauthorized Access: {0}")]
    FailedToAuthenticate(anyhow::Error),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody<'a> {
    success: bool,
    message: &'a str,
}

impl RestError {
    fn message(&self) -> String {
        match self {
            Self::FailedToAuthenticate(_) => "Unauthorized".into(),
            Self::InternalError(_) | Self::Other(_) => "Internal Server Error".into(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for RestError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_error) = e.as_database_error() {
            if db_error.is_unique_violation() {
                return Self::Conflict("Resource already exists".into());
            }
        }
        tracing::error!(error.cause_chain = ?e, "Database error");
        Self::InternalError("Database error".into())
    }
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        match e {
            Error::ParsingError(msg) => Self::ParseError(msg),
            Error::TokenVerification(_) => Self::Unauthorized("Failed to verify token".into()),
            Error::TokenSigning(_) => Self::InternalError("Failed to sign token".into()),
            Error::SendEmailError(e) => {
                tracing::error!(error.cause_chain = ?e, "Email API error");
                Self::InternalError("Failed to send email".into())
            }
            Error::TriggerWorkflowError(e) => {
                tracing::error!(error.cause_chain = ?e, "Workflow API error");
                Self::InternalError("Failed to trigger workflow".into())
            }
            Error::DatabaseError(e) => e.into(),
        }
    }
}

impl actix_web::ResponseError for RestError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::FailedToAuthenticate(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let message = self.message();
        actix_web::HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            message: &message,
        })
    }
}
