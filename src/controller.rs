use actix_web::http::StatusCode;
use actix_web::HttpResponse;

use serde::Serialize;

pub mod auth;
pub mod subscriptions;
pub mod users;
pub mod workflows;

/// Success envelope shared by the REST endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reply<T> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_subscriptions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> Reply<T> {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_subscriptions: None,
            data: None,
        }
    }

    fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    fn total(mut self, total: usize) -> Self {
        self.total_subscriptions = Some(total);
        self
    }

    fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Reply without a payload
fn acknowledge(message: impl Into<String>) -> HttpResponse {
    Reply::<()>::new(message).respond(StatusCode::OK)
}
