//! Integration tests for the HTTP auth gateway.
//!
//! Each test spins up a fake auth API with Axum on a random port and drives
//! the real request/response contract through `HttpGateway` and `AuthFlow`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use fleet_session::auth::AuthFlow;
use fleet_session::error::{AuthError, Error};
use fleet_session::gateway::{AdminSignup, AuthGateway, DriverSignup, HttpGateway, ProfileUpdate, Unit};
use fleet_session::session::{SessionService, UserType};
use fleet_session::store::keys;
use fleet_session::store::{KeyValueStore, MemoryStore};

const DOMAIN: &str = "borgnotransportes.com.br";

/// Requests seen by the fake API: (path, authorization header, body).
type Seen = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

fn record(seen: &Seen, path: &str, headers: &HeaderMap, body: &Value) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    seen.lock().unwrap().push((path.to_string(), auth, body.clone()));
}

fn auth_ok(token: &str, user_type: &str, id: &str, name: &str, email: &str) -> Json<Value> {
    Json(json!({
        "token": token,
        "userType": user_type,
        "user": { "id": id, "name": name, "email": email },
    }))
}

/// Profile for the bearer token, or 401 when the request carries none.
fn profile_for(headers: &HeaderMap, body: &Value) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authenticated" })),
        ));
    };
    let mut profile = if auth == "Bearer jwt-admin" {
        json!({ "id": "10", "name": "Ana", "email": "ana@borgnotransportes.com.br", "role": "admin", "company": "Borgno" })
    } else {
        json!({ "id": "11", "name": "João", "email": "joao@example.com", "role": "driver", "license": "12345678900" })
    };
    if let Some(changes) = body.as_object() {
        for (field, value) in changes {
            profile[field] = value.clone();
        }
    }
    Ok(Json(profile))
}

/// Start the fake auth API, return (base url, request log).
async fn start_server() -> (String, Seen) {
    let seen: Seen = Arc::default();

    let login_seen = Arc::clone(&seen);
    let admin_seen = Arc::clone(&seen);
    let driver_seen = Arc::clone(&seen);
    let forgot_seen = Arc::clone(&seen);
    let fetch_seen = Arc::clone(&seen);
    let update_seen = Arc::clone(&seen);

    let app = Router::new()
        .route(
            "/auth/login",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&login_seen, "/auth/login", &headers, &body);
                match (body["email"].as_str(), body["password"].as_str()) {
                    (Some("ana@borgnotransportes.com.br"), Some("segredo")) => Ok(auth_ok(
                        "jwt-admin",
                        "admin",
                        "10",
                        "Ana",
                        "ana@borgnotransportes.com.br",
                    )),
                    (Some("joao@example.com"), Some("segredo")) => {
                        Ok(auth_ok("jwt-driver", "driver", "11", "João", "joao@example.com"))
                    }
                    (Some("broken@example.com"), _) => Ok(Json(json!({ "token": "x" }))),
                    _ => Err((StatusCode::UNAUTHORIZED, "")),
                }
            }),
        )
        .route(
            "/auth/register/admin",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&admin_seen, "/auth/register/admin", &headers, &body);
                auth_ok("jwt-new-admin", "admin", "12", "Ana", "ana@borgnotransportes.com.br")
            }),
        )
        .route(
            "/auth/register/driver",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&driver_seen, "/auth/register/driver", &headers, &body);
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "message": "Email already registered" })),
                )
            }),
        )
        .route(
            "/auth/forgot-password",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&forgot_seen, "/auth/forgot-password", &headers, &body);
                StatusCode::NO_CONTENT
            }),
        )
        .route(
            "/user/profile",
            get(move |headers: HeaderMap| async move {
                record(&fetch_seen, "GET /user/profile", &headers, &Value::Null);
                profile_for(&headers, &Value::Null)
            })
            .put(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&update_seen, "PUT /user/profile", &headers, &body);
                profile_for(&headers, &body)
            }),
        )
        .route(
            "/slow/auth/login",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}/"), seen)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn flow(base_url: &str) -> (AuthFlow, Arc<SessionService>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let gateway = HttpGateway::new(base_url, Duration::from_secs(2), store.clone()).unwrap();
    let session = Arc::new(SessionService::new(store.clone()));
    let flow = AuthFlow::new(
        Arc::new(gateway),
        Arc::clone(&session),
        Duration::from_secs(2),
        DOMAIN,
    );
    (flow, session, store)
}

#[tokio::test]
async fn login_round_trip() {
    let (url, seen) = start_server().await;
    let (flow, session, store) = flow(&url);

    let kind = flow.sign_in("joao@example.com", &secret("segredo")).await.unwrap();
    assert_eq!(kind, UserType::Driver);

    let state = session.snapshot().await;
    assert!(state.is_logged_in);
    assert_eq!(state.user_id.as_deref(), Some("11"));
    assert_eq!(
        store.get(keys::TOKEN).await.unwrap().as_deref(),
        Some("jwt-driver")
    );

    let seen = seen.lock().unwrap();
    let (path, auth, body) = &seen[0];
    assert_eq!(path, "/auth/login");
    assert!(auth.is_none(), "no token yet, no bearer header");
    assert_eq!(body["email"], "joao@example.com");
    assert_eq!(body["password"], "segredo");
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer() {
    let (url, seen) = start_server().await;
    let (flow, _, _) = flow(&url);

    flow.sign_in("joao@example.com", &secret("segredo")).await.unwrap();
    flow.forgot_password("joao@example.com").await.unwrap();

    let seen = seen.lock().unwrap();
    let (path, auth, _) = seen.last().unwrap();
    assert_eq!(path, "/auth/forgot-password");
    assert_eq!(auth.as_deref(), Some("Bearer jwt-driver"));
}

#[tokio::test]
async fn unauthorized_maps_to_invalid_credentials() {
    let (url, _) = start_server().await;
    let (flow, session, _) = flow(&url);

    let err = flow.sign_in("joao@example.com", &secret("errada")).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    assert!(!session.snapshot().await.is_logged_in);
}

#[tokio::test]
async fn api_message_is_surfaced() {
    let (url, seen) = start_server().await;
    let (flow, session, _) = flow(&url);

    let signup = DriverSignup {
        name: "João".into(),
        email: "joao@example.com".into(),
        password: secret("segredo"),
        phone: "(11) 91234-5678".into(),
        license: "12345678900".into(),
        license_due_date: Some("31/12/2025".into()),
        address: None,
    };
    let err = flow.register_driver(&signup, &secret("segredo")).await.unwrap_err();
    assert_eq!(err.to_string(), "Email already registered");
    assert!(!session.snapshot().await.is_logged_in);

    let seen = seen.lock().unwrap();
    let (_, _, body) = &seen[0];
    assert_eq!(body["licenseDueDate"], "31/12/2025");
    assert!(body["address"].is_null());
}

#[tokio::test]
async fn admin_registration_sends_branch() {
    let (url, seen) = start_server().await;
    let (flow, session, _) = flow(&url);

    let signup = AdminSignup {
        name: "Ana".into(),
        email: "ana@borgnotransportes.com.br".into(),
        password: secret("segredo"),
        unit: Unit::Branch("Campinas".into()),
        phone: "(11) 90000-0000".into(),
    };
    flow.register_admin(&signup, &secret("segredo")).await.unwrap();

    let state = session.snapshot().await;
    assert_eq!(state.user_profile, Some(UserType::Admin));
    assert!(state.has_completed_onboarding);
    assert_eq!(
        session.token().await.unwrap().unwrap().expose_secret(),
        "jwt-new-admin"
    );

    let seen = seen.lock().unwrap();
    let (path, _, body) = &seen[0];
    assert_eq!(path, "/auth/register/admin");
    assert_eq!(body["unit"], "branch");
    assert_eq!(body["branch"], "Campinas");
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let (url, _) = start_server().await;
    let store = Arc::new(MemoryStore::new());
    let gateway = HttpGateway::new(&url, Duration::from_secs(2), store).unwrap();

    let err = gateway
        .login("broken@example.com", &secret("whatever"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
}

#[tokio::test]
async fn slow_api_times_out() {
    let (url, _) = start_server().await;
    let store = Arc::new(MemoryStore::new());
    let gateway = HttpGateway::new(format!("{url}slow"), Duration::from_millis(200), store).unwrap();

    let err = gateway
        .login("joao@example.com", &secret("segredo"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Timeout(_)));
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let store = Arc::new(MemoryStore::new());
    let gateway = HttpGateway::new("http://127.0.0.1:1", Duration::from_secs(2), store).unwrap();

    let err = gateway.forgot_password("joao@example.com").await.unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));
}

#[tokio::test]
async fn profile_fetch_carries_bearer_token() {
    let (url, seen) = start_server().await;
    let (flow, _, _) = flow(&url);

    flow.sign_in("joao@example.com", &secret("segredo")).await.unwrap();
    let profile = flow.fetch_profile().await.unwrap();
    assert_eq!(profile.role, UserType::Driver);
    assert_eq!(profile.license.as_deref(), Some("12345678900"));

    let seen = seen.lock().unwrap();
    let (path, auth, _) = seen.last().unwrap();
    assert_eq!(path, "GET /user/profile");
    assert_eq!(auth.as_deref(), Some("Bearer jwt-driver"));
}

#[tokio::test]
async fn profile_without_session_is_rejected() {
    let (url, seen) = start_server().await;
    let (flow, _, _) = flow(&url);

    let err = flow.fetch_profile().await.unwrap_err();
    assert_eq!(err.to_string(), "Not authenticated");

    let seen = seen.lock().unwrap();
    let (_, auth, _) = seen.last().unwrap();
    assert!(auth.is_none());
}

#[tokio::test]
async fn profile_update_sends_only_changed_fields() {
    let (url, seen) = start_server().await;
    let (flow, _, _) = flow(&url);

    flow.sign_in("ana@borgnotransportes.com.br", &secret("segredo")).await.unwrap();
    let update = ProfileUpdate {
        phone: Some("(11) 95555-0000".into()),
        ..ProfileUpdate::default()
    };
    let profile = flow.update_profile(&update).await.unwrap();
    assert_eq!(profile.role, UserType::Admin);
    assert_eq!(profile.phone.as_deref(), Some("(11) 95555-0000"));
    assert_eq!(profile.company.as_deref(), Some("Borgno"));

    let seen = seen.lock().unwrap();
    let (path, auth, body) = seen.last().unwrap();
    assert_eq!(path, "PUT /user/profile");
    assert_eq!(auth.as_deref(), Some("Bearer jwt-admin"));
    assert_eq!(body, &json!({ "phone": "(11) 95555-0000" }));
}
