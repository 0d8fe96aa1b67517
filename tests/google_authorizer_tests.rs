use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use oauth2::AuthorizationCode;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;
use tubeport::auth::{Authorizer, GoogleAuthorizer};
use tubeport::config::{ClientSecret, OauthConfig, YoutubeConfig};
use tubeport::credential::Credential;
use tubeport::error::OauthError;
use url::Url;

#[derive(Clone, Default)]
struct CaptureState {
    forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

async fn token_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    let form: HashMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();
    state.headers.lock().unwrap().push(headers);
    state.forms.lock().unwrap().push(form.clone());

    if form.get("grant_type").map(String::as_str) == Some("refresh_token") {
        return match form.get("refresh_token").map(String::as_str) {
            Some("refresh-from-code") => (
                StatusCode::OK,
                Json(json!({
                    "access_token": "access-from-refresh",
                    "token_type": "Bearer",
                    "expires_in": 3599
                })),
            ),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_grant",
                    "error_description": "Token has been expired or revoked."
                })),
            ),
        };
    }

    match form.get("code").map(String::as_str) {
        Some("good-code") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "access-from-code",
                "token_type": "Bearer",
                "expires_in": 3599,
                "refresh_token": "refresh-from-code",
                "scope": "https://www.googleapis.com/auth/youtube.force-ssl"
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })),
        ),
    }
}

fn authorizer_against(base: &Url) -> GoogleAuthorizer {
    let secret = ClientSecret::from_json(&format!(
        r#"{{"installed":{{
            "client_id":"client-123",
            "client_secret":"secret-456",
            "auth_uri":"https://accounts.test/o/oauth2/auth",
            "token_uri":"{base}token",
            "redirect_uris":["http://localhost"]
        }}}}"#
    ))
    .expect("client secret parses");
    let oauth = OauthConfig::default().resolve().expect("default oauth config");
    let http_client = tubeport::http::build_http_client(&YoutubeConfig::default()).expect("client");
    GoogleAuthorizer::new(&secret, &oauth, http_client).expect("authorizer")
}

#[tokio::test]
async fn consent_url_requests_offline_access_with_pkce() {
    let base = Url::parse("http://127.0.0.1:9/").expect("valid url");
    let authorizer = authorizer_against(&base);

    let pending = authorizer.authorize();
    assert!(pending.url.as_str().starts_with("https://accounts.test/o/oauth2/auth?"));

    let query: HashMap<String, String> = pending.url.query_pairs().into_owned().collect();
    assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
    assert_eq!(query.get("client_id").map(String::as_str), Some("client-123"));
    assert_eq!(
        query.get("redirect_uri").map(String::as_str),
        Some("http://localhost:8080/oauth/callback")
    );
    assert_eq!(
        query.get("scope").map(String::as_str),
        Some("https://www.googleapis.com/auth/youtube.force-ssl")
    );
    assert_eq!(query.get("access_type").map(String::as_str), Some("offline"));
    assert_eq!(query.get("code_challenge_method").map(String::as_str), Some("S256"));
    assert!(query.contains_key("code_challenge"));
    assert_eq!(
        query.get("state").map(String::as_str),
        Some(pending.state.secret().as_str())
    );
    assert!(pending.pkce_verifier.is_some());
}

#[tokio::test]
async fn every_attempt_gets_a_fresh_state() {
    let base = Url::parse("http://127.0.0.1:9/").expect("valid url");
    let authorizer = authorizer_against(&base);

    let first = authorizer.authorize();
    let second = authorizer.authorize();
    assert_ne!(first.state.secret(), second.state.secret());
    assert!(!first.state.secret().is_empty());
}

#[tokio::test]
async fn exchange_posts_code_and_verifier_to_token_endpoint() {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/token", post(token_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;
    let authorizer = authorizer_against(&base);

    let pending = authorizer.authorize();
    let verifier = pending
        .pkce_verifier
        .as_ref()
        .map(|v| v.secret().clone())
        .expect("pkce verifier");

    let credential = authorizer
        .exchange_code(
            AuthorizationCode::new("good-code".to_string()),
            pending.pkce_verifier,
        )
        .await
        .expect("exchange succeeds");

    assert_eq!(credential.access_token, "access-from-code");
    assert_eq!(credential.token_type, "Bearer");
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh-from-code"));
    let expiry = credential.expiry.expect("expiry derived from expires_in");
    let remaining = expiry - chrono::Utc::now();
    assert!(remaining > chrono::Duration::seconds(3500));
    assert!(remaining <= chrono::Duration::seconds(3600));

    let forms = state.forms.lock().unwrap();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form.get("grant_type").map(String::as_str), Some("authorization_code"));
    assert_eq!(form.get("code").map(String::as_str), Some("good-code"));
    assert_eq!(form.get("code_verifier"), Some(&verifier));
    assert_eq!(
        form.get("redirect_uri").map(String::as_str),
        Some("http://localhost:8080/oauth/callback")
    );
}

#[tokio::test]
async fn rejected_code_maps_to_server_response_error() {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/token", post(token_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;
    let authorizer = authorizer_against(&base);

    let err = tokio::time::timeout(
        Duration::from_secs(10),
        authorizer.exchange_code(AuthorizationCode::new("stale-code".to_string()), None),
    )
    .await
    .expect("exchange finishes")
    .expect_err("stale code must fail");

    match err {
        OauthError::ServerResponse { error, description } => {
            assert_eq!(error, "invalid_grant");
            assert_eq!(description.as_deref(), Some("Bad Request"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.forms.lock().unwrap().len(), 1);
}

fn expired_credential(refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: "stale-access".to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expiry: Some(chrono::Utc::now() - chrono::Duration::minutes(5)),
    }
}

#[tokio::test]
async fn refresh_keeps_the_existing_refresh_token() {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/token", post(token_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;
    let authorizer = authorizer_against(&base);

    let refreshed = authorizer
        .refresh(&expired_credential(Some("refresh-from-code")))
        .await
        .expect("refresh succeeds");

    assert_eq!(refreshed.access_token, "access-from-refresh");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh-from-code"));
    assert!(!refreshed.is_expired());

    let forms = state.forms.lock().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(
        forms[0].get("grant_type").map(String::as_str),
        Some("refresh_token")
    );
    assert_eq!(
        forms[0].get("refresh_token").map(String::as_str),
        Some("refresh-from-code")
    );
}

#[tokio::test]
async fn revoked_refresh_token_is_a_server_response_error() {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/token", post(token_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;
    let authorizer = authorizer_against(&base);

    let err = authorizer
        .refresh(&expired_credential(Some("revoked")))
        .await
        .expect_err("revoked token");
    assert!(matches!(err, OauthError::ServerResponse { ref error, .. } if error == "invalid_grant"));
}

#[tokio::test]
async fn refresh_without_refresh_token_makes_no_request() {
    let state = CaptureState::default();
    let app = Router::new()
        .route("/token", post(token_handler))
        .with_state(state.clone());
    let base = spawn_test_server(app).await;
    let authorizer = authorizer_against(&base);

    let err = authorizer
        .refresh(&expired_credential(None))
        .await
        .expect_err("nothing to refresh with");
    assert!(matches!(err, OauthError::MissingRefreshToken));
    assert!(state.forms.lock().unwrap().is_empty());
}
