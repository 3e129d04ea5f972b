//! Route tables for the backend variants of the challenges service.
//!
//! # Design
//! The deployed variants of the service disagree on path prefixes, on how
//! the token travels and on which operations exist at all. A
//! `BackendProfile` captures one variant as data: a base URL, one optional
//! `Route` per `Operation`, and the addressing mode for "sessions of a
//! challenge". An operation without a route fails with
//! `ApiError::Unsupported` before anything is sent.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::backend::Operation;

/// How a route carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenUse {
    /// The route takes no token.
    None,
    /// Required; appended as a query parameter with this name.
    Query(&'static str),
    /// Appended as a query parameter only when a token is held.
    OptionalQuery(&'static str),
    /// Required; sent as `Authorization: Bearer <token>` and never part of the URL.
    Bearer,
}

/// One operation's route. `path` is a template relative to the base URL
/// with `{id}`, `{sport}` or `{challenge}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub token: TokenUse,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            token: TokenUse::None,
        }
    }

    pub fn with_token(mut self, token: TokenUse) -> Self {
        self.token = token;
        self
    }
}

/// How "sessions of a challenge" identifies the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionsAddressing {
    ById,
    ByName,
}

/// Reference to a challenge when listing its sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeRef {
    Id(i64),
    Name(String),
}

impl From<i64> for ChallengeRef {
    fn from(id: i64) -> Self {
        ChallengeRef::Id(id)
    }
}

impl From<&str> for ChallengeRef {
    fn from(name: &str) -> Self {
        ChallengeRef::Name(name.to_string())
    }
}

/// The built-in backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Plain HTTP variant: token passed as a query parameter, no session upload.
    HttpClient,
    /// Template-based variant: bearer token for "my challenges", session upload,
    /// no sport search or session lookups.
    RestTemplate,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::HttpClient => "http-client",
            BackendKind::RestTemplate => "rest-template",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "http-client" => Ok(BackendKind::HttpClient),
            "rest" | "rest-template" => Ok(BackendKind::RestTemplate),
            other => Err(format!(
                "unknown backend {other:?}, expected \"http-client\" or \"rest-template\""
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendProfile {
    pub name: String,
    pub base_url: String,
    pub sessions_addressing: SessionsAddressing,
    routes: HashMap<Operation, Route>,
}

impl BackendProfile {
    /// Profile with no routes. Every operation is unsupported until added.
    pub fn new(name: impl Into<String>, base_url: &str) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sessions_addressing: SessionsAddressing::ById,
            routes: HashMap::new(),
        }
    }

    pub fn route(mut self, operation: Operation, route: Route) -> Self {
        self.routes.insert(operation, route);
        self
    }

    pub fn addressing(mut self, addressing: SessionsAddressing) -> Self {
        self.sessions_addressing = addressing;
        self
    }

    pub fn route_for(&self, operation: Operation) -> Option<&Route> {
        self.routes.get(&operation)
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.routes.contains_key(&operation)
    }

    pub fn from_kind(kind: BackendKind, base_url: &str) -> Self {
        match kind {
            BackendKind::HttpClient => Self::http_client(base_url),
            BackendKind::RestTemplate => Self::rest_template(base_url),
        }
    }

    pub fn http_client(base_url: &str) -> Self {
        Self::new(BackendKind::HttpClient.as_str(), base_url)
            .route(Operation::Login, Route::new("/autorizacion/login"))
            .route(Operation::Logout, Route::new("/autorizacion/logout"))
            .route(Operation::ListAllChallenges, Route::new("/strava/retos"))
            .route(
                Operation::ListMyChallenges,
                Route::new("/strava/reto/retosAceptados").with_token(TokenUse::Query("Token")),
            )
            .route(Operation::GetChallenge, Route::new("/auctions/retos/{id}"))
            .route(Operation::ListChallengesBySport, Route::new("/auctions/retos/{sport}"))
            .route(
                Operation::ListAllSessions,
                Route::new("/strava/sesion/usuario").with_token(TokenUse::Query("token")),
            )
            .route(Operation::GetSession, Route::new("/strava/sesion/{id}"))
            .route(
                Operation::ListSessionsForChallenge,
                Route::new("/strava/retos/{challenge}/sesiones"),
            )
    }

    pub fn rest_template(base_url: &str) -> Self {
        Self::new(BackendKind::RestTemplate.as_str(), base_url)
            .route(Operation::Login, Route::new("/autorizacion/login"))
            .route(Operation::Logout, Route::new("/autorizacion/logout"))
            .route(Operation::ListAllChallenges, Route::new("/strava/retos"))
            .route(
                Operation::ListMyChallenges,
                Route::new("/strava/reto/retosAceptados").with_token(TokenUse::Bearer),
            )
            .route(Operation::GetChallenge, Route::new("/strava/reto/{id}"))
            .route(
                Operation::ListSessionsForChallenge,
                Route::new("/strava/retos/{challenge}/sesiones"),
            )
            .route(
                Operation::SaveSession,
                Route::new("/strava/retos/{id}/sesiones")
                    .with_token(TokenUse::OptionalQuery("token")),
            )
    }
}
