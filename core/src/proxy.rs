//! The service proxy contract and its HTTP implementation.
//!
//! # Design
//! `ServiceProxy` is the single capability set that desktop, web and console
//! front ends consume. `HttpServiceProxy` implements it on top of one
//! `ChallengeBackend` (route table) and one `Transport`: each operation is
//! exactly one `build_*`, one `execute`, one `parse_*`. Nothing is retried
//! and nothing is cached.
//!
//! The token lives in a caller-owned `SessionHolder`. Login writes it, logout
//! clears it once the call resolves, and an `Auth` failure on a
//! token-scoped call clears it so a stale token is never reused. Both clears
//! compare against the token the request carried, so a call that resolves
//! after a fresh login leaves the fresh token alone.

use crate::backend::{ChallengeBackend, Operation};
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::profile::{BackendProfile, ChallengeRef};
use crate::session::SessionHolder;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Challenge, Credentials, Session, Token};

pub trait ServiceProxy {
    /// Name of the backend variant this proxy talks to.
    fn backend_name(&self) -> &str;

    /// Authenticate and store the issued token in `session`.
    fn login(&self, credentials: &Credentials, session: &SessionHolder) -> Result<Token, ApiError>;

    /// Invalidate the held token. That token is cleared from `session`
    /// whatever the outcome.
    fn logout(&self, session: &SessionHolder) -> Result<(), ApiError>;

    fn list_all_challenges(&self) -> Result<Vec<Challenge>, ApiError>;

    /// Challenges accepted by the logged-in user. "No content" and an empty
    /// array both yield an empty list.
    fn list_my_challenges(&self, session: &SessionHolder) -> Result<Vec<Challenge>, ApiError>;

    fn get_challenge(&self, id: i64) -> Result<Challenge, ApiError>;

    fn list_challenges_by_sport(&self, sport: &str) -> Result<Vec<Challenge>, ApiError>;

    fn list_all_sessions(&self, session: &SessionHolder) -> Result<Vec<Session>, ApiError>;

    fn get_session(&self, id: i64) -> Result<Session, ApiError>;

    fn list_sessions_for_challenge(
        &self,
        challenge: &ChallengeRef,
    ) -> Result<Vec<Session>, ApiError>;

    fn save_session(
        &self,
        challenge_id: i64,
        record: &Session,
        session: &SessionHolder,
    ) -> Result<(), ApiError>;
}

/// `ServiceProxy` over HTTP for one configured backend variant.
#[derive(Debug, Clone)]
pub struct HttpServiceProxy<T = UreqTransport> {
    backend: ChallengeBackend,
    transport: T,
}

impl HttpServiceProxy<UreqTransport> {
    /// Proxy for the configured variant, base URL and per-call deadline.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.profile(), UreqTransport::new(config.request_timeout))
    }
}

impl<T: Transport> HttpServiceProxy<T> {
    pub fn new(profile: BackendProfile, transport: T) -> Self {
        Self {
            backend: ChallengeBackend::new(profile),
            transport,
        }
    }

    pub fn backend(&self) -> &ChallengeBackend {
        &self.backend
    }

    fn exchange(
        &self,
        operation: Operation,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        // Query strings may carry the token.
        let route = request.path.split('?').next().unwrap_or_default().to_string();
        tracing::debug!(
            backend = %self.backend.name(),
            %operation,
            method = request.method.as_str(),
            %route,
            "sending request"
        );

        match self.transport.execute(request) {
            Ok(response) => {
                tracing::debug!(%operation, %route, status = response.status, "received response");
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(%operation, %route, error = %err, "exchange failed");
                Err(err)
            }
        }
    }

    /// Drop `sent` from the holder when the service rejected it. A token
    /// stored by a later login stays in place.
    fn guard<R>(
        &self,
        session: &SessionHolder,
        sent: Option<&Token>,
        result: Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        if let (Err(err), Some(sent)) = (&result, sent) {
            if err.is_auth() && session.clear_if(sent) {
                tracing::warn!(backend = %self.backend.name(), "token rejected, session cleared");
            }
        }
        result
    }
}

impl<T: Transport> ServiceProxy for HttpServiceProxy<T> {
    fn backend_name(&self) -> &str {
        self.backend.name()
    }

    fn login(&self, credentials: &Credentials, session: &SessionHolder) -> Result<Token, ApiError> {
        let held = session.current();
        let request = self.backend.build_login(credentials)?;
        let response = self.exchange(Operation::Login, request)?;
        let token = self.guard(session, held.as_ref(), self.backend.parse_login(response))?;
        session.set(token.clone());
        tracing::info!(backend = %self.backend.name(), "logged in");
        Ok(token)
    }

    fn logout(&self, session: &SessionHolder) -> Result<(), ApiError> {
        let token = session.current().ok_or(ApiError::NotLoggedIn)?;
        let result = self
            .backend
            .build_logout(&token)
            .and_then(|request| self.exchange(Operation::Logout, request))
            .and_then(|response| self.backend.parse_logout(response));
        session.clear_if(&token);
        match &result {
            Ok(()) => tracing::info!(backend = %self.backend.name(), "logged out"),
            Err(err) => tracing::warn!(error = %err, "logout failed, session cleared locally"),
        }
        result
    }

    fn list_all_challenges(&self) -> Result<Vec<Challenge>, ApiError> {
        let request = self.backend.build_list_all_challenges()?;
        let response = self.exchange(Operation::ListAllChallenges, request)?;
        let challenges = self.backend.parse_list_all_challenges(response)?;
        for challenge in challenges.iter().filter(|c| c.id.is_none()) {
            tracing::warn!(name = %challenge.name, "challenge without id");
        }
        Ok(challenges)
    }

    fn list_my_challenges(&self, session: &SessionHolder) -> Result<Vec<Challenge>, ApiError> {
        let token = session.current();
        let request = self.backend.build_list_my_challenges(token.as_ref())?;
        let result = self
            .exchange(Operation::ListMyChallenges, request)
            .and_then(|response| self.backend.parse_list_my_challenges(response));
        self.guard(session, token.as_ref(), result)
    }

    fn get_challenge(&self, id: i64) -> Result<Challenge, ApiError> {
        let request = self.backend.build_get_challenge(id)?;
        let response = self.exchange(Operation::GetChallenge, request)?;
        self.backend.parse_get_challenge(response)
    }

    fn list_challenges_by_sport(&self, sport: &str) -> Result<Vec<Challenge>, ApiError> {
        let request = self.backend.build_list_challenges_by_sport(sport)?;
        let response = self.exchange(Operation::ListChallengesBySport, request)?;
        self.backend.parse_list_challenges_by_sport(response)
    }

    fn list_all_sessions(&self, session: &SessionHolder) -> Result<Vec<Session>, ApiError> {
        let token = session.current();
        let request = self.backend.build_list_all_sessions(token.as_ref())?;
        let result = self
            .exchange(Operation::ListAllSessions, request)
            .and_then(|response| self.backend.parse_list_all_sessions(response));
        self.guard(session, token.as_ref(), result)
    }

    fn get_session(&self, id: i64) -> Result<Session, ApiError> {
        let request = self.backend.build_get_session(id)?;
        let response = self.exchange(Operation::GetSession, request)?;
        self.backend.parse_get_session(response)
    }

    fn list_sessions_for_challenge(
        &self,
        challenge: &ChallengeRef,
    ) -> Result<Vec<Session>, ApiError> {
        let request = self.backend.build_list_sessions_for_challenge(challenge)?;
        let response = self.exchange(Operation::ListSessionsForChallenge, request)?;
        self.backend.parse_list_sessions_for_challenge(response)
    }

    fn save_session(
        &self,
        challenge_id: i64,
        record: &Session,
        session: &SessionHolder,
    ) -> Result<(), ApiError> {
        let token = session.current();
        let request = self
            .backend
            .build_save_session(challenge_id, record, token.as_ref())?;
        let result = self
            .exchange(Operation::SaveSession, request)
            .and_then(|response| self.backend.parse_save_session(response));
        if result.is_ok() {
            tracing::info!(challenge_id, session_id = record.id, "session saved");
        }
        self.guard(session, token.as_ref(), result)
    }
}
