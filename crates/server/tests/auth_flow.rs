use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::{json, Value};
use service::auth::service::hash_password;
use service::auth::repository::mock::MockAuthRepository;
use service::auth::repository::AuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::errors::ServiceError;
use service::report::PdfRenderer;
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, auth};

const SECRET: &str = "test-secret-0123456789";
const PASSWORD: &str = "Passw0rd!";

struct FakePdf;

#[async_trait::async_trait]
impl PdfRenderer for FakePdf {
    async fn render(&self, _html: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(b"%PDF-1.4".to_vec())
    }
}

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

struct TestApp {
    app: Router,
    repo: Arc<MockAuthRepository>,
}

/// Router over the mock auth repository and a mock database whose queries
/// all fail: anything that reaches SeaORM answers 500.
async fn build_app() -> TestApp {
    let repo = Arc::new(MockAuthRepository::default());
    let admin = repo.add_role("ADMINISTRADOR", &["usuarios.read", "usuarios.write", "edificios.read"]);
    let viewer = repo.add_role("CONSULTA", &["edificios.read"]);
    for (name, role) in [("admin", admin), ("lector", viewer)] {
        let user = repo.add_user(name, role);
        let hash = hash_password(PASSWORD).unwrap();
        repo.upsert_password(user.id, hash, "argon2".into()).await.unwrap();
    }

    let dyn_repo: Arc<dyn AuthRepository> = repo.clone();
    let svc = AuthService::new(
        dyn_repo,
        AuthConfig { jwt_secret: SECRET.into(), jwt_expires_secs: 3600, password_algorithm: "argon2".into() },
    );
    let state = auth::ServerState {
        db: MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("database unavailable".into())])
            .into_connection(),
        auth: Arc::new(svc),
        pdf: Arc::new(FakePdf),
        institution: Arc::from("Test"),
    };
    TestApp { app: routes::build_router(state, cors()), repo }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request("POST", "/auth/login", json!({"username": username, "password": password})))
        .await
        .unwrap()
}

async fn token_for(app: &Router, username: &str) -> String {
    let res = login(app, username, PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let t = build_app().await;
    let res = t.app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "ok");
}

#[tokio::test]
async fn login_sets_http_only_cookie() {
    let t = build_app().await;
    let res = login(&t.app, "admin", PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
    let body = body_json(res).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], "admin");
}

#[tokio::test]
async fn login_wrong_password_is_401() {
    let t = build_app().await;
    let res = login(&t.app, "admin", "equivocada").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["error"], "Unauthorized");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let t = build_app().await;
    let res = t.app.oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401() {
    let t = build_app().await;
    let res = t.app.oneshot(get_with_token("/edificios", "not-a-jwt")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    let t = build_app().await;
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": Uuid::new_v4().to_string(),
        "username": "admin",
        "role_id": Uuid::new_v4().to_string(),
        "iat": now - 7200,
        "exp": now - 3600,
    });
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    let res = t.app.oneshot(get_with_token("/auth/me", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_accepts_bearer_and_cookie() {
    let t = build_app().await;
    let token = token_for(&t.app, "lector").await;

    let res = t.app.clone().oneshot(get_with_token("/auth/me", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["role"], "CONSULTA");
    assert_eq!(body["permissions"], json!(["edificios.read"]));

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::COOKIE, format!("auth_token={token}"))
        .body(Body::empty())
        .unwrap();
    let res = t.app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_permission_is_403() {
    let t = build_app().await;
    let token = token_for(&t.app, "lector").await;
    let res = t.app.oneshot(get_with_token("/usuarios", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = body_json(res).await;
    assert_eq!(body["error"], "Forbidden");
    assert!(body["message"].as_str().unwrap().contains("usuarios.read"));
}

#[tokio::test]
async fn read_permission_does_not_grant_write() {
    let t = build_app().await;
    let token = token_for(&t.app, "lector").await;
    let req = Request::builder()
        .method("POST")
        .uri("/edificios")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let res = t.app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn permitted_request_reaches_the_database() {
    let t = build_app().await;
    let token = token_for(&t.app, "admin").await;
    let res = t.app.oneshot(get_with_token("/usuarios", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(res).await;
    assert_eq!(body["error"], "Internal Error");
    assert!(body["message"].as_str().unwrap().contains("database unavailable"));
}

#[tokio::test]
async fn deactivated_user_loses_access_immediately() {
    let t = build_app().await;
    let token = token_for(&t.app, "lector").await;
    let me = t.app.clone().oneshot(get_with_token("/auth/me", &token)).await.unwrap();
    let id = Uuid::parse_str(body_json(me).await["id"].as_str().unwrap()).unwrap();

    t.repo.set_user_active(id, false);
    let res = t.app.oneshot(get_with_token("/auth/me", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_then_login_with_new_one() {
    let t = build_app().await;
    let token = token_for(&t.app, "admin").await;
    let mut req = json_request(
        "POST",
        "/auth/cambiar-password",
        json!({"current_password": PASSWORD, "new_password": "NuevaClave1"}),
    );
    req.headers_mut().insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(login(&t.app, "admin", PASSWORD).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(login(&t.app, "admin", "NuevaClave1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let t = build_app().await;
    let res = t.app.oneshot(Request::builder().method("POST").uri("/auth/logout").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("auth_token="));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let t = build_app().await;
    let res = t.app.oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert!(body["paths"]["/edificios/{id}/valoracion"].is_object());
}
