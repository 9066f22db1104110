//! # Envelope
//!
//! Every response body is wrapped in a [JSend](https://github.com/omniti-labs/jsend) envelope.
//!
//! - `success`: the operation completed, `data` holds the payload (or `null`)
//! - `fail`: the caller sent something it can fix, `data` maps field -> message
//! - `error`: the server could not complete the request, `message` says why
//!
//! Fail and error envelopes still go out as `200 OK`. Clients branch on `status`.
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success { data: Value },
    Fail { data: Value },
    Error { message: String },
}

impl Envelope {
    pub fn success<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Envelope::Success { data },
            Err(e) => {
                error!("Failed to serialize response payload: {e}");
                Envelope::error("Could not serialize response")
            }
        }
    }

    pub fn empty() -> Self {
        Envelope::Success { data: Value::Null }
    }

    pub fn fail(field: &str, message: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert(field.to_string(), Value::String(message.into()));

        Envelope::Fail {
            data: Value::Object(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            message: message.into(),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
