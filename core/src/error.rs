//! Error taxonomy for the challenges service proxy.
//!
//! # Design
//! Every proxy operation returns `Result<_, ApiError>`. Status codes are
//! classified once, in `status::classify`, so each variant here means the
//! same thing regardless of which backend produced it. Transport failures
//! (`Connectivity`) are kept apart from server-side failures (`Server`).

use thiserror::Error;

use crate::backend::Operation;

/// Errors returned by `ServiceProxy` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange never completed: DNS failure, refused or reset
    /// connection, or the per-call deadline elapsed.
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// 401: invalid credentials, or an invalid or expired token.
    #[error("authentication rejected by the service")]
    Auth,

    /// A token-scoped operation was called without a logged-in session.
    #[error("no active session; log in first")]
    NotLoggedIn,

    /// 404: the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// 204 on a route where "no content" means "nothing matched".
    #[error("the service reported no matching items")]
    EmptyResult,

    /// 4xx other than 401/404 on a write operation.
    #[error("request rejected with HTTP {status}: {body}")]
    Validation { status: u16, body: String },

    /// 500.
    #[error("internal server error: {0}")]
    Server(String),

    /// The configured backend has no route for this operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        operation: Operation,
        backend: String,
    },

    /// Any status the operation's policy does not account for.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A success body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// True for failures that invalidate the held token.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_names_operation_and_backend() {
        let err = ApiError::Unsupported {
            operation: Operation::SaveSession,
            backend: "http-client".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "save session is not supported by the http-client backend"
        );
    }

    #[test]
    fn unexpected_status_includes_code() {
        let err = ApiError::UnexpectedStatus {
            status: 418,
            body: "teapot".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected HTTP 418: teapot");
    }
}
