use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::auth::domain::{AuthSession, ChangePasswordInput, CurrentUser, LoginInput};
use service::auth::repository::AuthRepository;
use service::auth::AuthService;
use service::report::PdfRenderer;
use tracing::{info, warn};

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub pdf: Arc<dyn PdfRenderer>,
    /// Header line of every PDF report.
    pub institution: Arc<str>,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub token: String,
    pub token_type: String,
    pub expires_at: i64,
    pub user: CurrentUser,
}

impl From<AuthSession> for LoginOutput {
    fn from(s: AuthSession) -> Self {
        Self { token: s.token, token_type: s.token_type, expires_at: s.expires_at, user: s.user }
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in"), (status = 401, description = "Unauthorized"))
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(session.into())))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    // Always emitted, even when the request carried no cookie
    let mut cookie = Cookie::new(AUTH_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}

#[utoipa::path(
    post, path = "/auth/cambiar-password", tag = "auth",
    request_body = crate::openapi::ChangePasswordRequest,
    responses((status = 204, description = "Password changed"), (status = 400, description = "Validation Error"), (status = 401, description = "Unauthorized"))
)]
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<StatusCode, JsonApiError> {
    state.auth.change_password(user.id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bearer header first, then the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let h = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("expected 'Authorization: Bearer <token>'")),
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// JWT guard: resolves the caller and stores it as a request extension.
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req)? else {
        warn!(%path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("authentication required"));
    };
    let user = state.auth.authenticate(&token).await.map_err(|e| {
        warn!(%path, err = %e, "token rejected");
        JsonApiError::from(e)
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Permission guard; the required code is the layer state.
pub async fn require_permission(State(permission): State<&'static str>, req: Request, next: Next) -> Result<Response, JsonApiError> {
    let Some(user) = req.extensions().get::<CurrentUser>() else {
        return Err(JsonApiError::unauthorized("authentication required"));
    };
    if !user.can(permission) {
        info!(user = %user.username, permission, path = %req.uri().path(), "permission_denied");
        return Err(JsonApiError::forbidden(format!("missing permission '{permission}'")));
    }
    Ok(next.run(req).await)
}
