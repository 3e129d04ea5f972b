//! Domain records exchanged with the challenges service.
//!
//! # Design
//! Field names follow the current wire contract (`name`, `sport`,
//! `startTime`, ...). Older backend variants still emit the Spanish names,
//! accepted here through serde aliases. Nullable fields go through
//! `codec::empty_as_none` so `""` and `null` both decode to `None`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::{empty_as_none, null_as_default};

/// Login payload. Built per attempt and never stored.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque session token issued by a successful login.
///
/// The client never inspects it; only the service decides whether it is
/// still valid.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// A challenge ("reto") listed by the service.
///
/// Some backends return entries without an id; callers must tolerate
/// `id == None`. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Challenge {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub id: Option<i64>,
    #[serde(default, alias = "nombre", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, alias = "deporte", deserialize_with = "null_as_default")]
    pub sport: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recorded training session under a challenge.
///
/// Times are epoch milliseconds. The session carries no reference to its
/// challenge; the association comes from the call that fetched it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    #[serde(
        default,
        alias = "titulo",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        alias = "deporte",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub sport: Option<String>,
    #[serde(
        default,
        alias = "distancia",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance: Option<f64>,
    #[serde(
        default,
        alias = "horaInicio",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<i64>,
    #[serde(
        default,
        alias = "horaFin",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<i64>,
    #[serde(
        default,
        alias = "duracion",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("runner@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("runner@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn token_debug_hides_value() {
        let token = Token::new("abc123");
        assert_eq!(format!("{token:?}"), "Token(<redacted>)");
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn credentials_serialize_to_wire_names() {
        let json = serde_json::to_value(Credentials::new("a@b.c", "pw")).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.c", "password": "pw"}));
    }

    #[test]
    fn challenge_decodes_exact_fields() {
        let challenge: Challenge =
            serde_json::from_str(r#"{"id":7,"name":"Marathon","sport":"running"}"#).unwrap();
        assert_eq!(challenge.id, Some(7));
        assert_eq!(challenge.name, "Marathon");
        assert_eq!(challenge.sport, "running");
        assert!(challenge.extra.is_empty());
    }

    #[test]
    fn challenge_tolerates_missing_id_and_legacy_names() {
        let challenge: Challenge =
            serde_json::from_str(r#"{"id":null,"nombre":"Vuelta","deporte":"ciclismo"}"#).unwrap();
        assert_eq!(challenge.id, None);
        assert_eq!(challenge.name, "Vuelta");
        assert_eq!(challenge.sport, "ciclismo");
    }

    #[test]
    fn challenge_keeps_service_specific_fields() {
        let challenge: Challenge = serde_json::from_str(
            r#"{"id":3,"name":"Ultra","sport":"running","objetivoDistancia":100.0}"#,
        )
        .unwrap();
        assert_eq!(challenge.extra["objetivoDistancia"], 100.0);
        let back = serde_json::to_value(&challenge).unwrap();
        assert_eq!(back["objetivoDistancia"], 100.0);
    }

    #[test]
    fn session_uses_camel_case_wire_names() {
        let session = Session {
            id: 1,
            start_time: Some(1_700_000_000_000),
            ..Session::default()
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "startTime": 1_700_000_000_000_i64}));
    }

    #[test]
    fn session_empty_strings_decode_to_none() {
        let body = r#"{
            "id": 4, "title": "", "sport": "running", "distance": "",
            "startTime": null, "extraField": true
        }"#;
        let session: Session = serde_json::from_str(body).unwrap();
        assert_eq!(session.id, 4);
        assert_eq!(session.title, None);
        assert_eq!(session.sport.as_deref(), Some("running"));
        assert_eq!(session.distance, None);
        assert_eq!(session.start_time, None);
    }

    #[test]
    fn session_accepts_legacy_names() {
        let body = r#"{
            "id": 9, "titulo": "Tirada larga", "deporte": "running", "distancia": 21.1,
            "horaInicio": 1000, "horaFin": 2000, "duracion": 1.5
        }"#;
        let session: Session = serde_json::from_str(body).unwrap();
        assert_eq!(session.title.as_deref(), Some("Tirada larga"));
        assert_eq!(session.distance, Some(21.1));
        assert_eq!(session.start_time, Some(1000));
        assert_eq!(session.end_time, Some(2000));
        assert_eq!(session.duration, Some(1.5));
    }
}
