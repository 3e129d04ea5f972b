//! Status-code classification shared by every backend operation.
//!
//! Each operation declares a `StatusPolicy`; `classify` turns a response into
//! either an `Outcome` or the matching `ApiError`. The policies differ only in
//! how they treat 204 and whether other 4xx codes count as validation errors.

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Meaning of a 204 response for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoContent {
    /// 204 is a success with no payload.
    Accept,
    /// 204 means "nothing matched" and surfaces as `ApiError::EmptyResult`.
    EmptyResult,
    /// 204 is not part of the route's contract.
    Unexpected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    pub no_content: NoContent,
    /// Write operations report 4xx (other than 401/404) as `Validation`.
    pub write: bool,
}

impl StatusPolicy {
    pub const fn read(no_content: NoContent) -> Self {
        Self {
            no_content,
            write: false,
        }
    }

    pub const fn write(no_content: NoContent) -> Self {
        Self {
            no_content,
            write: true,
        }
    }
}

/// A response the policy classified as successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Body(String),
    NoContent,
}

/// Classify `response` under `policy`.
pub fn classify(response: &HttpResponse, policy: StatusPolicy) -> Result<Outcome, ApiError> {
    match response.status {
        204 => match policy.no_content {
            NoContent::Accept => Ok(Outcome::NoContent),
            NoContent::EmptyResult => Err(ApiError::EmptyResult),
            NoContent::Unexpected => Err(unexpected(response)),
        },
        200..=299 => Ok(Outcome::Body(response.body.clone())),
        401 => Err(ApiError::Auth),
        404 => Err(ApiError::NotFound),
        500 => Err(ApiError::Server(response.body.clone())),
        400..=499 if policy.write => Err(ApiError::Validation {
            status: response.status,
            body: response.body.clone(),
        }),
        _ => Err(unexpected(response)),
    }
}

fn unexpected(response: &HttpResponse) -> ApiError {
    ApiError::UnexpectedStatus {
        status: response.status,
        body: response.body.clone(),
    }
}
