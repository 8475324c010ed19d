use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, ChangePasswordInput, Claims, CurrentUser, LoginInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const PASSWORD_ALGORITHM: &str = "argon2";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expires_secs: u64,
    pub password_algorithm: String,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: c.jwt_secret.clone(),
            jwt_expires_secs: c.jwt_expires_secs,
            password_algorithm: PASSWORD_ALGORITHM.into(),
        }
    }
}

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig, hash_password}, repository::{AuthRepository, mock::MockAuthRepository}};
    /// use service::auth::domain::LoginInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let role = repo.add_role("ADMINISTRADOR", &["edificios.read"]);
    /// let user = repo.add_user("admin", role);
    /// let hash = hash_password("Passw0rd").unwrap();
    /// tokio_test::block_on(repo.upsert_password(user.id, hash, "argon2".into())).unwrap();
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: "0123456789abcdef".into(), jwt_expires_secs: 3600, password_algorithm: "argon2".into() });
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "admin".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "admin");
    /// assert!(session.user.can("edificios.read"));
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let username = input.username.trim().to_ascii_lowercase();
        let user = match self.repo.find_user_by_username(&username).await? {
            Some(u) => u,
            None => {
                warn!("login_unknown_user");
                return Err(AuthError::Unauthorized);
            }
        };

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "login_bad_password");
            return Err(AuthError::Unauthorized);
        }
        if !user.active {
            warn!(user_id = %user.id, "login_inactive_user");
            return Err(AuthError::Inactive);
        }
        let current = self.load_current(&user).await?;

        let (token, expires_at) = self.issue_token(&user)?;
        self.repo.record_login(user.id).await?;
        info!(user_id = %user.id, role = %current.role, "login_ok");
        Ok(AuthSession { token, token_type: "Bearer".into(), expires_at, user: current })
    }

    /// Sign an HS256 token for `user`; returns the token and its expiry.
    pub fn issue_token(&self, user: &AuthUser) -> Result<(String, i64), AuthError> {
        let iat = chrono::Utc::now().timestamp();
        let exp = iat + self.cfg.jwt_expires_secs as i64;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role_id: user.role_id.to_string(),
            iat,
            exp,
        };
        let token = encode(&JwtHeader::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok((token, exp))
    }

    /// Check signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &validation)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::Unauthorized
            })?;
        Ok(data.claims)
    }

    /// Resolve a bearer token to the caller, re-reading user and role state.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.verify_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;
        self.me(user_id).await
    }

    pub async fn me(&self, user_id: Uuid) -> Result<CurrentUser, AuthError> {
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::Unauthorized)?;
        if !user.active {
            return Err(AuthError::Inactive);
        }
        self.load_current(&user).await
    }

    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn change_password(&self, user_id: Uuid, input: ChangePasswordInput) -> Result<(), AuthError> {
        models::user::validate_password(&input.new_password).map_err(|e| AuthError::Validation(e.to_string()))?;
        let cred = self.repo.get_credentials(user_id).await?.ok_or(AuthError::NotFound)?;
        if !verify_password(&input.current_password, &cred.password_hash)? {
            return Err(AuthError::Unauthorized);
        }
        let hash = hash_password(&input.new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        self.repo.record_password_change(user_id).await?;
        info!("password_changed");
        Ok(())
    }

    async fn load_current(&self, user: &AuthUser) -> Result<CurrentUser, AuthError> {
        let role = self.repo.role_access(user.role_id).await?.ok_or(AuthError::Inactive)?;
        if !role.active {
            return Err(AuthError::Inactive);
        }
        Ok(CurrentUser {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role_id: role.role_id,
            role: role.name,
            permissions: role.permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    const SECRET: &str = "test-secret-0123456789";

    fn cfg() -> AuthConfig {
        AuthConfig { jwt_secret: SECRET.into(), jwt_expires_secs: 3600, password_algorithm: PASSWORD_ALGORITHM.into() }
    }

    async fn setup() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>, AuthUser) {
        let repo = Arc::new(MockAuthRepository::default());
        let role = repo.add_role("OPERADOR", &["edificios.read", "edificios.write"]);
        let user = repo.add_user("jperez", role);
        repo.upsert_password(user.id, hash_password("Secreto123").unwrap(), PASSWORD_ALGORITHM.into()).await.unwrap();
        let svc = AuthService::new(repo.clone(), cfg());
        (repo, svc, user)
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn login_issues_token_and_records_login() {
        let (repo, svc, user) = setup().await;
        let session = svc.login(login(" JPerez ", "Secreto123")).await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert!(session.user.can("edificios.write"));
        assert!(!session.user.can("usuarios.write"));
        assert_eq!(repo.login_count(user.id), 1);

        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.exp, session.expires_at);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let (_, svc, _) = setup().await;
        assert!(matches!(svc.login(login("jperez", "otra-clave")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(login("nadie", "Secreto123")).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn inactive_user_or_role_cannot_login() {
        let (repo, svc, user) = setup().await;
        repo.set_user_active(user.id, false);
        assert!(matches!(svc.login(login("jperez", "Secreto123")).await, Err(AuthError::Inactive)));

        repo.set_user_active(user.id, true);
        repo.set_role_active(user.role_id, false);
        assert!(matches!(svc.login(login("jperez", "Secreto123")).await, Err(AuthError::Inactive)));
    }

    #[tokio::test]
    async fn authenticate_rechecks_user_state() {
        let (repo, svc, user) = setup().await;
        let (token, _) = svc.issue_token(&user).unwrap();
        assert_eq!(svc.authenticate(&token).await.unwrap().username, "jperez");
        repo.set_user_active(user.id, false);
        assert!(matches!(svc.authenticate(&token).await, Err(AuthError::Inactive)));
    }

    #[tokio::test]
    async fn tampered_and_expired_tokens_are_rejected() {
        let (_, svc, user) = setup().await;
        let (token, _) = svc.issue_token(&user).unwrap();
        let other = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig { jwt_secret: "another-secret-abcdef".into(), ..cfg() });
        assert!(matches!(other.verify_token(&token), Err(AuthError::Unauthorized)));

        let now = chrono::Utc::now().timestamp();
        let stale = Claims { sub: user.id.to_string(), username: "jperez".into(), role_id: user.role_id.to_string(), iat: now - 7200, exp: now - 3600 };
        let expired = encode(&JwtHeader::default(), &stale, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
        assert!(matches!(svc.verify_token(&expired), Err(AuthError::Unauthorized)));
        assert!(matches!(svc.verify_token("not-a-jwt"), Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn change_password_requires_current_one() {
        let (_, svc, user) = setup().await;
        let bad = ChangePasswordInput { current_password: "equivocada".into(), new_password: "NuevaClave1".into() };
        assert!(matches!(svc.change_password(user.id, bad).await, Err(AuthError::Unauthorized)));

        let short = ChangePasswordInput { current_password: "Secreto123".into(), new_password: "corta".into() };
        assert!(matches!(svc.change_password(user.id, short).await, Err(AuthError::Validation(_))));

        let ok = ChangePasswordInput { current_password: "Secreto123".into(), new_password: "NuevaClave1".into() };
        svc.change_password(user.id, ok).await.unwrap();
        assert!(svc.login(login("jperez", "NuevaClave1")).await.is_ok());
        assert!(svc.login(login("jperez", "Secreto123")).await.is_err());
    }
}
