//! In-memory stand-in for the challenges service.
//!
//! Serves the union of the route tables used by the client's backend
//! variants, with the status conventions each route documents (raw token on
//! login, 204 for "nothing here" on list routes, 401 for unknown tokens).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "runner@example.com";
pub const DEMO_PASSWORD: &str = "secret";
/// A user who has not accepted any challenge.
pub const IDLE_EMAIL: &str = "idle@example.com";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: i64,
    pub name: String,
    pub sport: String,
    #[serde(rename = "objetivoDistancia")]
    pub target_distance: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub id: i64,
    pub title: Option<String>,
    pub sport: Option<String>,
    pub distance: Option<f64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub duration: Option<f64>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

struct User {
    password: String,
    accepted: Vec<i64>,
}

struct StoredSession {
    challenge_id: i64,
    owner: String,
    session: Session,
}

pub struct Store {
    users: HashMap<String, User>,
    /// token -> email
    tokens: HashMap<String, String>,
    challenges: BTreeMap<i64, Challenge>,
    sessions: BTreeMap<i64, StoredSession>,
    next_session_id: i64,
}

impl Store {
    /// Two users, three challenges, two recorded sessions.
    pub fn seeded() -> Self {
        let mut users = HashMap::new();
        users.insert(
            DEMO_EMAIL.to_string(),
            User {
                password: DEMO_PASSWORD.to_string(),
                accepted: vec![1, 3],
            },
        );
        users.insert(
            IDLE_EMAIL.to_string(),
            User {
                password: DEMO_PASSWORD.to_string(),
                accepted: Vec::new(),
            },
        );

        let challenges = [
            (1, "Marathon", "running", 42.2),
            (2, "Vuelta", "cycling", 300.0),
            (3, "Sierra Ultra", "trail running", 80.0),
        ]
        .into_iter()
        .map(|(id, name, sport, target_distance)| {
            (
                id,
                Challenge {
                    id,
                    name: name.to_string(),
                    sport: sport.to_string(),
                    target_distance,
                },
            )
        })
        .collect();

        let mut store = Self {
            users,
            tokens: HashMap::new(),
            challenges,
            sessions: BTreeMap::new(),
            next_session_id: 1,
        };
        for (challenge_id, title, distance) in [(1, "Long run", 30.0), (1, "Tempo", 12.5)] {
            store.insert_session(
                challenge_id,
                DEMO_EMAIL,
                Session {
                    title: Some(title.to_string()),
                    sport: Some("running".to_string()),
                    distance: Some(distance),
                    start_time: Some(1_700_000_000_000),
                    end_time: Some(1_700_003_600_000),
                    duration: Some(60.0),
                    ..Session::default()
                },
            );
        }
        store
    }

    fn insert_session(&mut self, challenge_id: i64, owner: &str, mut session: Session) -> Session {
        session.id = self.next_session_id;
        self.next_session_id += 1;
        self.sessions.insert(
            session.id,
            StoredSession {
                challenge_id,
                owner: owner.to_string(),
                session: session.clone(),
            },
        );
        session
    }

    fn user_for(&self, token: Option<&str>) -> Option<&str> {
        token.and_then(|t| self.tokens.get(t)).map(String::as_str)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Token as query parameter (`Token` or `token`) on the legacy routes.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "Token")]
    upper: Option<String>,
    token: Option<String>,
}

impl TokenQuery {
    fn resolve(self, headers: &HeaderMap) -> Option<String> {
        self.upper.or(self.token).or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        })
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/autorizacion/login", post(login))
        .route("/autorizacion/logout", post(logout))
        .route("/strava/retos", get(list_challenges))
        .route("/strava/retos/{id}/sesiones", get(sessions_of_challenge).post(save_session))
        .route("/strava/reto/retosAceptados", get(accepted_challenges))
        .route("/strava/reto/{id}", get(get_challenge))
        .route("/auctions/retos/{key}", get(challenge_by_id_or_sport))
        .route("/strava/sesion/usuario", get(sessions_of_user))
        .route("/strava/sesion/{id}", get(get_session))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut store = db.write().await;
    let valid = store
        .users
        .get(&input.email)
        .is_some_and(|user| user.password == input.password);
    if !valid {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), input.email);
    tracing::info!("login accepted");
    (StatusCode::OK, token).into_response()
}

async fn logout(State(db): State<Db>, body: String) -> StatusCode {
    match db.write().await.tokens.remove(body.trim()) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::UNAUTHORIZED,
    }
}

async fn list_challenges(State(db): State<Db>) -> Json<Vec<Challenge>> {
    Json(db.read().await.challenges.values().cloned().collect())
}

async fn accepted_challenges(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> Response {
    let store = db.read().await;
    let token = query.resolve(&headers);
    let Some(email) = store.user_for(token.as_deref()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let accepted: Vec<Challenge> = store.users[email]
        .accepted
        .iter()
        .filter_map(|id| store.challenges.get(id).cloned())
        .collect();
    list_or_no_content(accepted)
}

async fn get_challenge(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Challenge>, StatusCode> {
    db.read()
        .await
        .challenges
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Numeric keys look up one challenge; anything else is a sport name.
async fn challenge_by_id_or_sport(State(db): State<Db>, Path(key): Path<String>) -> Response {
    let store = db.read().await;
    if let Ok(id) = key.parse::<i64>() {
        return match store.challenges.get(&id) {
            Some(challenge) => Json(challenge.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        };
    }
    let matching: Vec<Challenge> = store
        .challenges
        .values()
        .filter(|c| c.sport.eq_ignore_ascii_case(&key))
        .cloned()
        .collect();
    list_or_no_content(matching)
}

async fn sessions_of_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
) -> Response {
    let store = db.read().await;
    let token = query.resolve(&headers);
    let Some(email) = store.user_for(token.as_deref()) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let sessions: Vec<Session> = store
        .sessions
        .values()
        .filter(|s| s.owner == email)
        .map(|s| s.session.clone())
        .collect();
    list_or_no_content(sessions)
}

async fn get_session(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Session>, StatusCode> {
    db.read()
        .await
        .sessions
        .get(&id)
        .map(|s| Json(s.session.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn sessions_of_challenge(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let store = db.read().await;
    if !store.challenges.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let sessions: Vec<Session> = store
        .sessions
        .values()
        .filter(|s| s.challenge_id == id)
        .map(|s| s.session.clone())
        .collect();
    list_or_no_content(sessions)
}

async fn save_session(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
    Json(input): Json<Session>,
) -> Response {
    let mut store = db.write().await;
    let token = query.resolve(&headers);
    let Some(email) = store.user_for(token.as_deref()).map(str::to_string) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if !store.challenges.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if input.distance.is_some_and(|d| d < 0.0) {
        return (StatusCode::BAD_REQUEST, "distance must not be negative").into_response();
    }
    let saved = store.insert_session(id, &email, input);
    (StatusCode::CREATED, Json(saved)).into_response()
}

fn list_or_no_content<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}
