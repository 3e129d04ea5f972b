//! Synchronous client core for the challenges and sessions service.
//!
//! # Overview
//! Front ends (desktop, server-rendered web, console) talk to the service
//! only through the `ServiceProxy` trait. `HttpServiceProxy` implements it
//! for any of the service's backend variants, which disagree on base URL,
//! path prefixes, token passing and the set of operations they offer.
//!
//! # Design
//! - `BackendProfile` describes one variant as data; unsupported operations
//!   fail with `ApiError::Unsupported` instead of returning placeholders.
//! - `ChallengeBackend` splits each operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`), so routing and
//!   status handling are testable without I/O.
//! - `status::classify` is the only place status codes become errors, driven
//!   by a per-operation `StatusPolicy`.
//! - `Transport` performs the single blocking round-trip; `UreqTransport`
//!   applies a configurable per-call deadline.
//! - `SessionHolder` is caller-owned and passed by reference; there is no
//!   global token.

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod profile;
pub mod proxy;
pub mod session;
pub mod status;
pub mod transport;
pub mod types;

pub use backend::{ChallengeBackend, Operation};
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use profile::{BackendKind, BackendProfile, ChallengeRef, Route, SessionsAddressing, TokenUse};
pub use proxy::{HttpServiceProxy, ServiceProxy};
pub use session::SessionHolder;
pub use transport::{Transport, UreqTransport};
pub use types::{Challenge, Credentials, Session, Token};
