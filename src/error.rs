use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid enhancement parameters: {0}")]
    InvalidParams(String),

    #[error("Image folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EnhanceError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl EnhanceError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            EnhanceError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE"),
            EnhanceError::InvalidParams(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMS"),
            EnhanceError::FolderNotFound(_) => (StatusCode::NOT_FOUND, "FOLDER_NOT_FOUND"),
            EnhanceError::Decode { .. } => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            EnhanceError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR"),
            EnhanceError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            EnhanceError::Model(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_ERROR"),
            EnhanceError::Training(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TRAINING_ERROR"),
            EnhanceError::ImageTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            EnhanceError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            EnhanceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            EnhanceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for EnhanceError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
