use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caja_core::{ServiceError, SessionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(service) => match service {
                ServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::InvalidConfig(_) | ServiceError::InvalidResponse(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ServiceError::Session(session) => match session {
                    SessionError::ActivityNotFound(_)
                    | SessionError::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
                    SessionError::PermissionDenied => StatusCode::FORBIDDEN,
                    SessionError::ActivityAlreadyExists(_)
                    | SessionError::AnotherActivityActive
                    | SessionError::ActivityNotActive
                    | SessionError::Activity(_) => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}
