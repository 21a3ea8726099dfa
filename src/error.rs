//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("invalid primary key: model {model} column {column}")]
    InvalidPrimaryKey { model: String, column: String },
    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },
    #[error("invalid hook pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("config load: {0}")]
    Load(String),
}

/// The closed set of request-level failures an action can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unknown,
    RecordNotFound,
    InvalidRelationship,
    InvalidFilter,
    InvalidSort,
    InvalidPagination,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unknown => "unknown",
            ErrorKind::RecordNotFound => "record-not-found",
            ErrorKind::InvalidRelationship => "invalid-relationship",
            ErrorKind::InvalidFilter => "invalid-filter",
            ErrorKind::InvalidSort => "invalid-sort",
            ErrorKind::InvalidPagination => "invalid-pagination",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Failure from the taxonomy in [`ErrorKind`]. Store failures never use this variant.
    #[error("{kind}: {message}")]
    Request { kind: ErrorKind, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ApiError::Request {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn record_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RecordNotFound, message)
    }

    pub fn invalid_relationship(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRelationship, message)
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFilter, message)
    }

    pub fn invalid_sort(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSort, message)
    }

    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPagination, message)
    }

    /// Taxonomy kind, or `None` for configuration and store failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Request { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::RecordNotFound)
    }
}

/// Body sent for taxonomy errors: `{ "type": ..., "message": ... }`.
#[derive(Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

/// Body sent for opaque store and configuration failures.
#[derive(Serialize)]
pub struct OpaqueErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Request { kind, message } => {
                let status = if kind == ErrorKind::RecordNotFound {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, Json(ErrorBody { kind, message })).into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(OpaqueErrorBody {
                        error: other.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::record_not_found("Invalid id").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_kinds_map_to_500() {
        for err in [
            ApiError::invalid_sort("x"),
            ApiError::invalid_filter("x"),
            ApiError::invalid_pagination("x"),
            ApiError::invalid_relationship("x"),
            ApiError::Store("boom".into()),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let body = serde_json::to_value(ErrorBody {
            kind: ErrorKind::InvalidRelationship,
            message: "relationship foo not found!".into(),
        })
        .unwrap();
        assert_eq!(body["type"], "invalid-relationship");
    }

    #[test]
    fn store_errors_have_no_kind() {
        assert_eq!(ApiError::Store("x".into()).kind(), None);
        assert!(ApiError::record_not_found("x").is_not_found());
    }
}
