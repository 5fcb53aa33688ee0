//! Integration tests for API endpoints.
//!
//! The router is driven in-process with `oneshot` over an in-memory store,
//! so no file or network access is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api_lib::clients::{AddressLookup, Coordinates, PostalAddress};
use api_lib::config::ApiConfig;
use api_lib::routes::create_router;
use api_lib::state::AppState;
use auth_service_lib::service::Authenticator;
use common::{AppError, AppResult, JwtConfig};
use domain::ResetFlow;
use user_service_lib::repository::MemoryStore;
use user_service_lib::service::UserManager;

// =============================================================================
// Fake address lookup
// =============================================================================

/// Knows a single CEP; geocoding can be switched off to simulate an outage.
struct FakeAddressLookup {
    geocoder_up: bool,
}

#[async_trait]
impl AddressLookup for FakeAddressLookup {
    async fn postal_code(&self, cep: &str) -> AppResult<Option<PostalAddress>> {
        match cep {
            "01001000" => Ok(Some(PostalAddress {
                cep: "01001-000".into(),
                street: "Praça da Sé, Sé".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
            })),
            "99999999" => Err(AppError::service_unavailable("ViaCEP")),
            _ => Ok(None),
        }
    }

    async fn geocode(&self, _query: &str) -> AppResult<Option<Coordinates>> {
        if !self.geocoder_up {
            return Err(AppError::service_unavailable("Nominatim"));
        }
        Ok(Some(Coordinates {
            latitude: "-23.5503".into(),
            longitude: "-46.6339".into(),
        }))
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app_with(geocoder_up: bool) -> Router {
    let config = ApiConfig {
        jwt: JwtConfig {
            secret: "test-secret-key-for-testing-only-32chars".into(),
            expiration_hours: 1,
        },
        ..ApiConfig::default()
    };

    let users = Arc::new(UserManager::new(Arc::new(MemoryStore::default())));
    let auth = Arc::new(Authenticator::new(users.clone(), config.jwt.clone()));
    let lookup = Arc::new(FakeAddressLookup { geocoder_up });

    create_router(AppState::new(users, auth, lookup, config))
}

fn app() -> Router {
    app_with(true)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("user-id", id);
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn user_body(name: &str, cpf: &str, email: &str, creator: i64) -> Value {
    json!({
        "nome": name,
        "cpf": cpf,
        "telefone": "81 99999-0000",
        "cep": "01001-000",
        "endereco": "Praça da Sé, Sé",
        "numero": "1",
        "cidade": "São Paulo",
        "estado": "SP",
        "latitude": "-23.55",
        "longitude": "-46.63",
        "password": "secret",
        "email": email,
        "IdUserCreate": creator,
    })
}

async fn create(app: &Router, name: &str, cpf: &str, email: &str, creator: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/usuarios/new",
        None,
        Some(user_body(name, cpf, email, creator)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["newUsuario"]["id"].as_i64().unwrap()
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_returns_201_without_secrets() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios/new",
        None,
        Some(user_body("Ana", "111", "ana@example.com", 0)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["newUsuario"]["id"], 1);
    assert_eq!(body["newUsuario"]["IdUserCreate"], 1);
    assert_eq!(body["newUsuario"]["complemento"], "");
    assert!(body["newUsuario"].get("password").is_none());
    assert!(body["newUsuario"].get("resetCode").is_none());
}

#[tokio::test]
async fn create_rejects_missing_field_and_bad_email() {
    let app = app();

    let mut missing = user_body("Ana", "111", "ana@example.com", 0);
    missing.as_object_mut().unwrap().remove("cidade");
    let (status, body) = send(&app, Method::POST, "/usuarios/new", None, Some(missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/usuarios/new",
        None,
        Some(user_body("Ana", "111", "not-an-email", 0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_is_400_and_keeps_one_record() {
    let app = app();
    let first = create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios/new",
        None,
        Some(user_body("Other", "222", "ana@example.com", first)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, list) = send(&app, Method::GET, "/usuarios/list", Some("1"), None).await;
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn unknown_creator_is_rejected() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/usuarios/new",
        None,
        Some(user_body("Ana", "111", "ana@example.com", 42)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn list_requires_numeric_nonzero_identity() {
    let app = app();

    for header in [None, Some("abc"), Some("0")] {
        let (status, _) = send(&app, Method::GET, "/usuarios/list", header, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "header {:?}", header);
    }
}

#[tokio::test]
async fn list_is_scoped_filtered_and_paginated() {
    let app = app();
    let root = create(&app, "Root", "000", "root@example.com", 0).await;
    for i in 0..5 {
        create(
            &app,
            &format!("Child {i}"),
            &format!("10{i}"),
            &format!("child{i}@example.com"),
            root,
        )
        .await;
    }
    let other = create(&app, "Other", "900", "other@example.com", 0).await;
    create(&app, "Child of other", "901", "coo@example.com", other).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/usuarios/list?page=2&totalItemsByPage=2",
        Some("1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Root refers to itself, so it lists alongside its children
    assert_eq!(body["total"], 6);
    let names: Vec<_> = body["usuarios"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["nome"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Child 1", "Child 2"]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/usuarios/list?search=CHILD%203",
        Some("1"),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["usuarios"][0]["email"], "child3@example.com");

    let (_, body) = send(
        &app,
        Method::GET,
        "/usuarios/list?search=nobody&page=4",
        Some("1"),
        None,
    )
    .await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["usuarios"], json!([]));
}

#[tokio::test]
async fn list_pages_reconstruct_filtered_set() {
    let app = app();
    create(&app, "Root", "000", "root@example.com", 0).await;
    for i in 0..7 {
        create(
            &app,
            &format!("U{i}"),
            &format!("20{i}"),
            &format!("u{i}@example.com"),
            1,
        )
        .await;
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/usuarios/list?page={page}&totalItemsByPage=3"),
            Some("1"),
            None,
        )
        .await;
        for user in body["usuarios"].as_array().unwrap() {
            seen.push(user["id"].as_i64().unwrap());
        }
    }

    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn self_delete_cascades_one_level() {
    let app = app();
    let a = create(&app, "A", "1", "a@example.com", 0).await;
    let b = create(&app, "B", "2", "b@example.com", a).await;
    let c = create(&app, "C", "3", "c@example.com", b).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/usuarios/deletar/{a}"),
        None,
        Some(json!({ "password": "secret", "loggedUserId": a })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for gone in [a, b] {
        let (status, _) =
            send(&app, Method::GET, &format!("/usuarios/byId/{gone}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = send(&app, Method::GET, &format!("/usuarios/byId/{c}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_another_user_removes_only_that_user() {
    let app = app();
    let a = create(&app, "A", "1", "a@example.com", 0).await;
    let b = create(&app, "B", "2", "b@example.com", a).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/usuarios/deletar/{b}"),
        None,
        Some(json!({ "password": "secret", "loggedUserId": a })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/usuarios/byId/{a}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/usuarios/byId/{b}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_checks_actor_then_password_then_target() {
    let app = app();
    let a = create(&app, "A", "1", "a@example.com", 0).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/usuarios/deletar/1",
        None,
        Some(json!({ "password": "secret", "loggedUserId": 77 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/usuarios/deletar/1",
        None,
        Some(json!({ "password": "wrong", "loggedUserId": a })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/usuarios/deletar/abc",
        None,
        Some(json!({ "password": "secret", "loggedUserId": a })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing was removed along the way
    let (status, _) = send(&app, Method::GET, "/usuarios/byId/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_without_body_reports_unknown_actor() {
    let app = app();
    create(&app, "A", "1", "a@example.com", 0).await;

    let (status, body) = send(&app, Method::DELETE, "/usuarios/deletar/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/usuarios/byId/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Lookups and updates
// =============================================================================

#[tokio::test]
async fn lookups_by_path_and_query() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (status, body) = send(&app, Method::GET, "/usuarios/byId/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nome"], "Ana");

    let (status, _) = send(&app, Method::GET, "/usuarios/byId/xyz", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/usuarios/filterById?id=1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");

    let (status, _) = send(&app, Method::GET, "/usuarios/filterById?id=x", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/usuarios/filterById?id=9", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_and_set_creator() {
    let app = app();
    let a = create(&app, "Ana", "111", "ana@example.com", 0).await;
    let b = create(&app, "Bia", "222", "bia@example.com", 0).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/usuarios/update/{b}"),
        None,
        Some(json!({ "nome": "Beatriz" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"]["nome"], "Beatriz");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/usuarios/update/{b}"),
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/usuarios/updateUser/{b}"),
        None,
        Some(json!({ "IdUserCreate": a })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"]["IdUserCreate"], a);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/usuarios/updateUser/99",
        None,
        Some(json!({ "IdUserCreate": a })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_merges_fields_and_ignores_protected_ones() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;
    create(&app, "Bia", "222", "bia@example.com", 0).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/usuarios/editById/2",
        None,
        Some(json!({ "cidade": "Recife", "id": 50, "IdUserCreate": 1, "resetCode": "1111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);
    assert_eq!(body["cidade"], "Recife");
    assert_eq!(body["nome"], "Bia");
    assert_eq!(body["IdUserCreate"], 2);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/usuarios/editById/2",
        None,
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/usuarios/editById/2",
        None,
        Some(json!({ "email": "broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/usuarios/editById/7",
        None,
        Some(json!({ "cidade": "Recife" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Login and reset flow
// =============================================================================

#[tokio::test]
async fn login_returns_token_or_401() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["usuario"]["id"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn full_reset_flow() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let mut flow = ResetFlow::default();

    let (status, body) = send(
        &app,
        Method::POST,
        "/usuarios/forgot-password",
        None,
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let issued = body["resetCode"].as_str().unwrap().to_string();
    assert_eq!(issued.len(), 4);
    flow.request("ana@example.com", Some(issued.clone())).unwrap();

    // Wrong digits keep the client in TokenIssued
    let wrong = if issued == "0000" { "1111" } else { "0000" };
    assert!(flow.validate(wrong).is_err());
    assert!(matches!(flow, ResetFlow::TokenIssued { .. }));

    flow.validate(&issued).unwrap();
    let (email, code) = flow.submission().unwrap();
    let (email, code) = (email.to_string(), code.to_string());

    // Stale code is rejected server-side and changes nothing
    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": email, "resetCode": wrong, "newPassword": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": email, "resetCode": code, "newPassword": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    flow.finish(true).unwrap();
    assert!(flow.is_completed());

    // Code is single use
    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": email, "resetCode": code, "newPassword": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/usuarios/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn reset_endpoint_errors() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/usuarios/forgot-password",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": "ghost@example.com", "resetCode": "1234", "newPassword": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": "ana@example.com", "resetCode": "1234", "newPassword": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No code was ever issued
    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/reset-password",
        None,
        Some(json!({ "email": "ana@example.com", "resetCode": "", "newPassword": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn clean_reset_code_is_idempotent() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/usuarios/forgot-password",
        None,
        Some(json!({ "email": "ana@example.com" })),
    )
    .await;
    let code = body["resetCode"].as_str().unwrap().to_string();
    let wrong = if code == "0000" { "1111" } else { "0000" };

    let (status, _) = send(
        &app,
        Method::PUT,
        "/usuarios/clean-resetCode",
        None,
        Some(json!({ "email": "ana@example.com", "resetCode": wrong })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::PUT,
            "/usuarios/clean-resetCode",
            None,
            Some(json!({ "email": "ana@example.com", "resetCode": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

// =============================================================================
// Address, health, docs
// =============================================================================

#[tokio::test]
async fn address_lookup_with_and_without_geocoding() {
    let (status, body) = send(&app(), Method::GET, "/usuarios/address/01001-000", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cidade"], "São Paulo");
    assert_eq!(body["latitude"], "-23.5503");

    let (status, body) =
        send(&app_with(false), Method::GET, "/usuarios/address/01001000?numero=5", None, None)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "SP");
    assert!(body["latitude"].is_null());
    assert!(body["longitude"].is_null());
}

#[tokio::test]
async fn address_lookup_failures_are_404() {
    let app = app();

    for cep in ["12345678", "99999999", "123"] {
        let (status, _) =
            send(&app, Method::GET, &format!("/usuarios/address/{cep}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "cep {cep}");
    }
}

#[tokio::test]
async fn health_reports_store_records() {
    let app = app();
    create(&app, "Ana", "111", "ana@example.com", 0).await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["store"]["records"], 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/usuarios/list").is_some());
    assert!(body["paths"].get("/usuarios/login").is_some());
}

#[tokio::test]
async fn health_is_degraded_when_store_unreadable() {
    use user_service_lib::service::MockUserService;

    let mut users = MockUserService::new();
    users.expect_count_users().returning(|| {
        Err(AppError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )))
    });
    let users: Arc<dyn user_service_lib::service::UserService> = Arc::new(users);

    let config = ApiConfig::default();
    let auth = Arc::new(Authenticator::new(users.clone(), config.jwt.clone()));
    let lookup = Arc::new(FakeAddressLookup { geocoder_up: true });
    let app = create_router(AppState::new(users, auth, lookup, config));

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["store"]["status"], "unhealthy");
}
