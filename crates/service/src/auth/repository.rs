use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, RoleAccess};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    async fn role_access(&self, role_id: Uuid) -> Result<Option<RoleAccess>, AuthError>;

    /// Stamp `last_login_at` and write the `LOGIN` audit row.
    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError>;
    /// Audit a password change made by `user_id` itself.
    async fn record_password_change(&self, user_id: Uuid) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        roles: Mutex<HashMap<Uuid, RoleAccess>>,
        logins: Mutex<Vec<Uuid>>,
    }

    impl MockAuthRepository {
        pub fn add_role(&self, name: &str, permissions: &[&str]) -> Uuid {
            let role = RoleAccess {
                role_id: Uuid::new_v4(),
                name: name.to_string(),
                active: true,
                permissions: permissions.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            };
            let id = role.role_id;
            self.roles.lock().unwrap().insert(id, role);
            id
        }

        pub fn add_user(&self, username: &str, role_id: Uuid) -> AuthUser {
            let user = AuthUser {
                id: Uuid::new_v4(),
                username: username.to_string(),
                full_name: username.to_uppercase(),
                email: None,
                role_id,
                active: true,
            };
            self.users.lock().unwrap().insert(user.id, user.clone());
            user
        }

        pub fn set_user_active(&self, id: Uuid, active: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&id) {
                u.active = active;
            }
        }

        pub fn set_role_active(&self, id: Uuid, active: bool) {
            if let Some(r) = self.roles.lock().unwrap().get_mut(&id) {
                r.active = active;
            }
        }

        pub fn login_count(&self, id: Uuid) -> usize {
            self.logins.lock().unwrap().iter().filter(|u| **u == id).count()
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.username == username).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn role_access(&self, role_id: Uuid) -> Result<Option<RoleAccess>, AuthError> {
            Ok(self.roles.lock().unwrap().get(&role_id).cloned())
        }

        async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError> {
            self.logins.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn record_password_change(&self, _user_id: Uuid) -> Result<(), AuthError> {
            Ok(())
        }
    }
}
