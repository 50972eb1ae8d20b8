use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::PushError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoActiveSubscription,
    InvalidSubscription,
    SubscriptionExpired,
    TransportFailure,
    SerializationFault,
    StoreFailure,
}

/// Failure body; `success` lets the page render it the same way as a success body.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PushError> for ApiError {
    fn from(err: PushError) -> Self {
        match &err {
            PushError::NoActiveSubscription => {
                Self::not_found(err.to_string()).with_code(ErrorCode::NoActiveSubscription)
            }
            PushError::InvalidSubscription(_) => {
                Self::unprocessable(err.to_string()).with_code(ErrorCode::InvalidSubscription)
            }
            PushError::SubscriptionExpired => Self::new(StatusCode::GONE, err.to_string())
                .with_code(ErrorCode::SubscriptionExpired),
            PushError::TransportFailure(_) => Self::new(StatusCode::BAD_GATEWAY, err.to_string())
                .with_code(ErrorCode::TransportFailure),
            PushError::SerializationFault(e) => {
                tracing::error!("Serialization fault: {:?}", e);
                Self::internal(err.to_string()).with_code(ErrorCode::SerializationFault)
            }
            PushError::Store(e) => {
                tracing::error!("Subscription store error: {:?}", e);
                Self::internal(err.to_string()).with_code(ErrorCode::StoreFailure)
            }
        }
    }
}
