use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Failures of the durable key/value medium behind the session.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read session record '{key}' at {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session record '{key}' at {path}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete session record '{key}' at {path}: {source}")]
    Delete {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create session directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced by `SessionManager::login` and `SessionManager::logout`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Identity is missing required field '{field}'")]
    InvalidIdentity { field: &'static str },

    #[error("Failed to serialize identity: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Construction-time defects in a route table. These are configuration bugs,
/// never runtime branches.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Route trees '{first}' and '{second}' overlap at prefix '{prefix}'")]
    Overlap {
        first: String,
        second: String,
        prefix: String,
    },

    #[error("Screen '{screen}' lies outside its tree '{tree}'")]
    ScreenOutsideTree { tree: String, screen: String },

    #[error("Screen '{screen}' of the common tree is shadowed by tree '{owner}'")]
    ShadowedCommonScreen { screen: String, owner: String },

    #[error("Route tree '{tree}' is declared more than once")]
    DuplicateTree { tree: String },

    #[error("Screen '{screen}' is declared more than once")]
    DuplicateScreen { screen: String },

    #[error("Invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// ApiError
///
/// Maps library errors onto HTTP responses for the session endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Session(SessionError::InvalidIdentity { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_IDENTITY")
            }
            ApiError::Session(SessionError::Serialization(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_FAILED")
            }
            ApiError::Session(SessionError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_STORE_FAILED")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Session operation failed");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
