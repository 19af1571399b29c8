//! Flat credential table and the in-memory session store.
//!
//! Deliberately minimal: two fixed accounts, random opaque tokens, no
//! expiry. Hardening the login layer is out of scope for this service;
//! the table exists so the two role-gated panels have something to check.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// The fixed two-row user table. Passwords default to the well-known dev
/// values and can be overridden through `ADMIN_PASSWORD` / `USER_PASSWORD`.
#[derive(Debug, Clone)]
pub struct UserTable {
    admin_password: String,
    user_password: String,
}

impl UserTable {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            admin_password: cfg
                .get("ADMIN_PASSWORD")
                .unwrap_or_else(|| "botadmin1".to_string()),
            user_password: cfg
                .get("USER_PASSWORD")
                .unwrap_or_else(|| "user123".to_string()),
        }
    }

    /// Role for a username/password pair, or `None` when they don't match.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        match username {
            "admin" if password == self.admin_password => Some(Role::Admin),
            "user" if password == self.user_password => Some(Role::User),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

/// Token-to-session map. Tokens are UUID v4, opaque to the client.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn create(&self, username: &str, role: Role) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token.clone(),
                Session {
                    username: username.to_string(),
                    role,
                },
            );
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> UserTable {
        UserTable {
            admin_password: "botadmin1".into(),
            user_password: "user123".into(),
        }
    }

    #[test]
    fn authenticates_fixed_table() {
        let t = table();
        assert_eq!(t.authenticate("admin", "botadmin1"), Some(Role::Admin));
        assert_eq!(t.authenticate("user", "user123"), Some(Role::User));
        assert_eq!(t.authenticate("admin", "wrong"), None);
        assert_eq!(t.authenticate("nobody", "botadmin1"), None);
        assert_eq!(t.authenticate("user", "botadmin1"), None);
    }

    #[test]
    fn sessions_round_trip() {
        let store = SessionStore::default();
        let token = store.create("admin", Role::Admin);
        let session = store.get(&token).unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.role, Role::Admin);
        assert!(store.get("not-a-token").is_none());
    }

    #[test]
    fn tokens_are_unique() {
        let store = SessionStore::default();
        let a = store.create("user", Role::User);
        let b = store.create("user", Role::User);
        assert_ne!(a, b);
    }
}
