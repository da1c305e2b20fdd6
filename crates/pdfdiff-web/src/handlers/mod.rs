pub mod compare;
pub mod index;

use axum::http::StatusCode;

use pdfdiff_core::DocumentSide;
use pdfdiff_ingest::IngestError;

/// A failed comparison request, rendered as HTML or JSON by the handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub side: Option<DocumentSide>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            side: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            side: None,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            side: e.side(),
            message: e.to_string(),
        }
    }
}
