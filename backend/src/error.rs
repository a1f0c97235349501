use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::{ErrorCode, ErrorResponse, LifecycleError, ValidationError};
use thiserror::Error;
use tracing::error;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Conflict(#[from] LifecycleError),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Invalid poll ID")]
    InvalidId,
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error("An internal error occurred")]
    Internal,
}

impl ApiError {
    /// Maps a storage failure, naming the missing record for 404s.
    pub fn from_store(e: StoreError, missing: &'static str) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound(missing),
            StoreError::Lifecycle(e) => ApiError::Conflict(e),
            StoreError::LockFailed | StoreError::Database(_) => {
                error!("Storage failure: {}", e);
                ApiError::Internal
            }
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Conflict(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::InvalidId => Status::BadRequest,
            ApiError::MalformedBody(_) => Status::BadRequest,
            ApiError::Internal => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId | ApiError::MalformedBody(_) => ErrorCode::InvalidInput,
            ApiError::Conflict(_) => ErrorCode::Conflict,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Internal => ErrorCode::SystemError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let body = Json(ErrorResponse::new(self.code(), self.to_string()));

        rocket::Response::build_from(body.respond_to(req)?)
            .status(status)
            .ok()
    }
}
