use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::debug;

use crate::{
    branch::InvalidBranch,
    database::{StoreError, log_store_error},
    envelope::Envelope,
    models::ValidationError,
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    InvalidBranch(#[from] InvalidBranch),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Could not get ObjectID")]
    MalformedId,

    #[error("Not implemented")]
    NotImplemented,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = match &self {
            AppError::InvalidBranch(e) => Envelope::fail("message", e.to_string()),
            AppError::Validation(e) => {
                debug!("Rejected candidate: {e}");
                Envelope::fail(e.field(), e.to_string())
            }
            AppError::MalformedPayload => Envelope::fail("body", self.to_string()),
            AppError::MalformedId | AppError::NotImplemented => Envelope::error(self.to_string()),
            AppError::Store(e) => {
                log_store_error(e);
                Envelope::error(e.to_string())
            }
        };

        envelope.into_response()
    }
}
