//! Request builder and response parser for one backend variant.
//!
//! # Design
//! `ChallengeBackend` holds only a `BackendProfile` and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The proxy runs the actual round-trip in between, so every
//! route and status mapping here is deterministic and testable without I/O.
//!
//! Token-scoped builders take `Option<&Token>`: the route's `TokenUse`
//! decides whether a missing token is an error (`ApiError::NotLoggedIn`).

use std::fmt;

use crate::codec;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::profile::{BackendProfile, ChallengeRef, Route, SessionsAddressing, TokenUse};
use crate::status::{classify, NoContent, Outcome, StatusPolicy};
use crate::types::{Challenge, Credentials, Session, Token};

/// The operations of the service proxy contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Logout,
    ListAllChallenges,
    ListMyChallenges,
    GetChallenge,
    ListChallengesBySport,
    ListAllSessions,
    GetSession,
    ListSessionsForChallenge,
    SaveSession,
}

impl Operation {
    pub fn method(&self) -> HttpMethod {
        match self {
            Operation::Login | Operation::Logout | Operation::SaveSession => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }

    /// Status handling for the operation's route.
    pub fn policy(&self) -> StatusPolicy {
        match self {
            Operation::Login
            | Operation::ListAllChallenges
            | Operation::GetChallenge
            | Operation::GetSession => StatusPolicy::read(NoContent::Unexpected),
            Operation::Logout | Operation::ListMyChallenges => {
                StatusPolicy::read(NoContent::Accept)
            }
            Operation::ListChallengesBySport
            | Operation::ListAllSessions
            | Operation::ListSessionsForChallenge => StatusPolicy::read(NoContent::EmptyResult),
            Operation::SaveSession => StatusPolicy::write(NoContent::Accept),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Login => "login",
            Operation::Logout => "logout",
            Operation::ListAllChallenges => "list all challenges",
            Operation::ListMyChallenges => "list my challenges",
            Operation::GetChallenge => "get challenge",
            Operation::ListChallengesBySport => "list challenges by sport",
            Operation::ListAllSessions => "list all sessions",
            Operation::GetSession => "get session",
            Operation::ListSessionsForChallenge => "list sessions for challenge",
            Operation::SaveSession => "save session",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous, stateless request builder and response parser for one
/// backend variant.
#[derive(Debug, Clone)]
pub struct ChallengeBackend {
    profile: BackendProfile,
}

impl ChallengeBackend {
    pub fn new(profile: BackendProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &BackendProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = codec::encode(credentials)?;
        self.request(Operation::Login, &[], None, Some(body))
    }

    /// The logout route takes the raw token as its body.
    pub fn build_logout(&self, token: &Token) -> Result<HttpRequest, ApiError> {
        self.request(Operation::Logout, &[], None, Some(token.as_str().to_string()))
    }

    pub fn build_list_all_challenges(&self) -> Result<HttpRequest, ApiError> {
        self.request(Operation::ListAllChallenges, &[], None, None)
    }

    pub fn build_list_my_challenges(&self, token: Option<&Token>) -> Result<HttpRequest, ApiError> {
        self.request(Operation::ListMyChallenges, &[], token, None)
    }

    pub fn build_get_challenge(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.request(Operation::GetChallenge, &[("id", &id.to_string())], None, None)
    }

    pub fn build_list_challenges_by_sport(&self, sport: &str) -> Result<HttpRequest, ApiError> {
        self.request(Operation::ListChallengesBySport, &[("sport", sport)], None, None)
    }

    pub fn build_list_all_sessions(&self, token: Option<&Token>) -> Result<HttpRequest, ApiError> {
        self.request(Operation::ListAllSessions, &[], token, None)
    }

    pub fn build_get_session(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.request(Operation::GetSession, &[("id", &id.to_string())], None, None)
    }

    pub fn build_list_sessions_for_challenge(
        &self,
        challenge: &ChallengeRef,
    ) -> Result<HttpRequest, ApiError> {
        let key = match (self.profile.sessions_addressing, challenge) {
            (SessionsAddressing::ById, ChallengeRef::Id(id)) => id.to_string(),
            (SessionsAddressing::ByName, ChallengeRef::Name(name)) => name.clone(),
            _ => {
                tracing::debug!(
                    backend = %self.profile.name,
                    addressing = ?self.profile.sessions_addressing,
                    "challenge reference does not match backend addressing"
                );
                return Err(self.unsupported(Operation::ListSessionsForChallenge));
            }
        };
        self.request(Operation::ListSessionsForChallenge, &[("challenge", &key)], None, None)
    }

    pub fn build_save_session(
        &self,
        challenge_id: i64,
        session: &Session,
        token: Option<&Token>,
    ) -> Result<HttpRequest, ApiError> {
        // Fail before encoding when the variant has no upload route.
        self.route(Operation::SaveSession)?;
        let body = codec::encode(session)?;
        self.request(
            Operation::SaveSession,
            &[("id", &challenge_id.to_string())],
            token,
            Some(body),
        )
    }

    /// The token is the raw response body.
    pub fn parse_login(&self, response: HttpResponse) -> Result<Token, ApiError> {
        match classify(&response, Operation::Login.policy())? {
            Outcome::Body(body) => Ok(Token::new(body)),
            Outcome::NoContent => Err(ApiError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            }),
        }
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        classify(&response, Operation::Logout.policy())?;
        Ok(())
    }

    pub fn parse_list_all_challenges(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Challenge>, ApiError> {
        codec::decode_list(classify(&response, Operation::ListAllChallenges.policy())?)
    }

    /// 204, a blank body and `[]` all produce an empty list.
    pub fn parse_list_my_challenges(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Challenge>, ApiError> {
        let outcome = match classify(&response, Operation::ListMyChallenges.policy())? {
            Outcome::Body(body) if body.trim().is_empty() => Outcome::NoContent,
            outcome => outcome,
        };
        codec::decode_list(outcome)
    }

    pub fn parse_get_challenge(&self, response: HttpResponse) -> Result<Challenge, ApiError> {
        codec::decode_one(classify(&response, Operation::GetChallenge.policy())?)
    }

    pub fn parse_list_challenges_by_sport(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Challenge>, ApiError> {
        codec::decode_list(classify(&response, Operation::ListChallengesBySport.policy())?)
    }

    pub fn parse_list_all_sessions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Session>, ApiError> {
        codec::decode_list(classify(&response, Operation::ListAllSessions.policy())?)
    }

    pub fn parse_get_session(&self, response: HttpResponse) -> Result<Session, ApiError> {
        codec::decode_one(classify(&response, Operation::GetSession.policy())?)
    }

    pub fn parse_list_sessions_for_challenge(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Session>, ApiError> {
        codec::decode_list(classify(&response, Operation::ListSessionsForChallenge.policy())?)
    }

    pub fn parse_save_session(&self, response: HttpResponse) -> Result<(), ApiError> {
        classify(&response, Operation::SaveSession.policy())?;
        Ok(())
    }

    fn route(&self, operation: Operation) -> Result<&Route, ApiError> {
        self.profile
            .route_for(operation)
            .ok_or_else(|| self.unsupported(operation))
    }

    fn unsupported(&self, operation: Operation) -> ApiError {
        ApiError::Unsupported {
            operation,
            backend: self.profile.name.clone(),
        }
    }

    /// Resolve the operation's route, substitute percent-encoded parameters
    /// and attach the token the way the route expects it.
    fn request(
        &self,
        operation: Operation,
        params: &[(&str, &str)],
        token: Option<&Token>,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let route = self.route(operation)?;

        let mut path = route.path.clone();
        for (key, value) in params {
            path = path.replace(&format!("{{{key}}}"), &urlencoding::encode(value));
        }
        let mut url = format!("{}{path}", self.profile.base_url);

        let mut headers = Vec::new();
        match (route.token, token) {
            (TokenUse::None, _) | (TokenUse::OptionalQuery(_), None) => {}
            (TokenUse::Query(name) | TokenUse::OptionalQuery(name), Some(token)) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                url.push(separator);
                url.push_str(name);
                url.push('=');
                url.push_str(&urlencoding::encode(token.as_str()));
            }
            (TokenUse::Bearer, Some(token)) => {
                headers.push((
                    "authorization".to_string(),
                    format!("Bearer {}", token.as_str()),
                ));
            }
            (TokenUse::Query(_) | TokenUse::Bearer, None) => return Err(ApiError::NotLoggedIn),
        }

        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method: operation.method(),
            path: url,
            headers,
            body,
        })
    }
}
