//! End-to-end runs of both backend variants against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every supported
//! proxy operation over real HTTP with `UreqTransport`. Validates that route
//! tables, token passing and status handling line up with an actual server.

use std::time::Duration;

use challenge_core::{
    ApiError, BackendProfile, ChallengeRef, Credentials, HttpServiceProxy, ServiceProxy, Session,
    SessionHolder, UreqTransport,
};

/// Start a fresh mock server and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn transport() -> UreqTransport {
    UreqTransport::new(Some(Duration::from_secs(5)))
}

fn demo_credentials() -> Credentials {
    Credentials::new(mock_server::DEMO_EMAIL, mock_server::DEMO_PASSWORD)
}

#[test]
fn http_client_variant_lifecycle() {
    let base = start_server();
    let proxy = HttpServiceProxy::new(BackendProfile::http_client(&base), transport());
    let session = SessionHolder::new();

    // Step 1: token-scoped calls need a login.
    let err = proxy.list_my_challenges(&session).unwrap_err();
    assert!(matches!(err, ApiError::NotLoggedIn));

    // Step 2: bad credentials are rejected.
    let err = proxy
        .login(&Credentials::new(mock_server::DEMO_EMAIL, "wrong"), &session)
        .unwrap_err();
    assert!(matches!(err, ApiError::Auth));
    assert!(!session.is_active());

    // Step 3: login.
    let token = proxy.login(&demo_credentials(), &session).unwrap();
    assert_eq!(session.current(), Some(token));

    // Step 4: browse challenges.
    let all = proxy.list_all_challenges().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|c| c.extra.contains_key("objetivoDistancia")));

    let mine = proxy.list_my_challenges(&session).unwrap();
    assert_eq!(mine.iter().map(|c| c.id).collect::<Vec<_>>(), vec![Some(1), Some(3)]);

    let marathon = proxy.get_challenge(1).unwrap();
    assert_eq!(marathon.name, "Marathon");
    assert!(matches!(proxy.get_challenge(999), Err(ApiError::NotFound)));

    // Step 5: sport search with a space in the name.
    let trail = proxy.list_challenges_by_sport("trail running").unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].name, "Sierra Ultra");
    assert!(matches!(
        proxy.list_challenges_by_sport("curling"),
        Err(ApiError::EmptyResult)
    ));

    // Step 6: sessions.
    let sessions = proxy.list_sessions_for_challenge(&ChallengeRef::Id(1)).unwrap();
    assert_eq!(sessions.len(), 2);
    let first = proxy.get_session(sessions[0].id).unwrap();
    assert_eq!(first, sessions[0]);
    assert_eq!(proxy.list_all_sessions(&session).unwrap().len(), 2);
    assert!(matches!(
        proxy.list_sessions_for_challenge(&ChallengeRef::Id(2)),
        Err(ApiError::EmptyResult)
    ));

    // Step 7: this variant cannot upload sessions.
    let err = proxy.save_session(1, &Session::default(), &session).unwrap_err();
    assert!(matches!(err, ApiError::Unsupported { .. }));

    // Step 8: logout, then the old token is gone locally and remotely.
    proxy.logout(&session).unwrap();
    assert!(!session.is_active());
    assert!(matches!(proxy.logout(&session), Err(ApiError::NotLoggedIn)));
}

#[test]
fn rest_template_variant_lifecycle() {
    let base = start_server();
    let proxy = HttpServiceProxy::new(BackendProfile::rest_template(&base), transport());
    let session = SessionHolder::new();

    // Step 1: login.
    proxy.login(&demo_credentials(), &session).unwrap();

    // Step 2: accepted challenges travel with a bearer token.
    let mine = proxy.list_my_challenges(&session).unwrap();
    assert_eq!(mine.len(), 2);

    let marathon = proxy.get_challenge(1).unwrap();
    assert_eq!(marathon.sport, "running");

    // Step 3: upload a session and read it back through the challenge.
    let record = Session {
        id: 0,
        title: Some("Climb".to_string()),
        sport: Some("cycling".to_string()),
        distance: Some(55.0),
        start_time: Some(1_700_100_000_000),
        end_time: Some(1_700_107_200_000),
        duration: Some(120.0),
    };
    proxy.save_session(2, &record, &session).unwrap();

    let sessions = proxy.list_sessions_for_challenge(&ChallengeRef::Id(2)).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].title, record.title);
    assert_eq!(sessions[0].distance, record.distance);

    // Step 4: the server rejects a negative distance.
    let bad = Session {
        distance: Some(-1.0),
        ..Session::default()
    };
    let err = proxy.save_session(2, &bad, &session).unwrap_err();
    assert!(matches!(err, ApiError::Validation { status: 400, .. }));

    // Step 5: unknown challenge.
    let err = proxy.save_session(42, &record, &session).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 6: unsupported operations never reach the server.
    assert!(matches!(
        proxy.get_session(1),
        Err(ApiError::Unsupported { .. })
    ));

    // Step 7: logout; a stale token is then refused and cleared.
    let stale = session.current().unwrap();
    proxy.logout(&session).unwrap();
    session.set(stale);
    let err = proxy.list_my_challenges(&session).unwrap_err();
    assert!(matches!(err, ApiError::Auth));
    assert!(!session.is_active());
}

#[test]
fn idle_user_has_empty_challenge_list() {
    let base = start_server();
    let proxy = HttpServiceProxy::new(BackendProfile::http_client(&base), transport());
    let session = SessionHolder::new();

    proxy
        .login(
            &Credentials::new(mock_server::IDLE_EMAIL, mock_server::DEMO_PASSWORD),
            &session,
        )
        .unwrap();

    // The server answers 204; the caller sees an empty list.
    assert!(proxy.list_my_challenges(&session).unwrap().is_empty());
}

#[test]
fn unreachable_server_is_connectivity_error() {
    // Bind and drop a listener to get a port nothing is serving.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let proxy = HttpServiceProxy::new(
        BackendProfile::http_client(&format!("http://{addr}")),
        transport(),
    );

    let err = proxy.list_all_challenges().unwrap_err();
    assert!(matches!(err, ApiError::Connectivity(_)));
}
