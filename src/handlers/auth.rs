//! Login and the two role-gated panels.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::session::{Role, Session};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Internal(e.to_string()))?;
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    match state.users.authenticate(&username, &password) {
        Some(role) => {
            let token = state.sessions.create(&username, role);
            info!("user '{}' logged in as {}", username, role.as_str());
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .build();
            Ok((
                jar.add(cookie),
                Json(LoginResponse {
                    message: format!("Welcome, {username}!"),
                    role: role.as_str(),
                }),
            ))
        }
        None => {
            warn!("failed login attempt for username: {}", username);
            Err(AppError::InvalidCredentials)
        }
    }
}

pub async fn admin_panel(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<MessageResponse>, AppError> {
    let session = require_role(&state, &jar, Role::Admin)?;
    info!("admin panel accessed by '{}'", session.username);
    Ok(Json(MessageResponse {
        message: "Welcome to the admin panel!".to_string(),
    }))
}

pub async fn user_panel(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<MessageResponse>, AppError> {
    let session = require_role(&state, &jar, Role::User)?;
    info!("user panel accessed by '{}'", session.username);
    Ok(Json(MessageResponse {
        message: "Welcome to the user panel!".to_string(),
    }))
}

/// Resolve the session cookie and check its role. No cookie or a stale
/// token is `Unauthorized`; a live session with the wrong role is
/// `AccessDenied`.
fn require_role(state: &AppState, jar: &CookieJar, required: Role) -> Result<Session, AppError> {
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|c| state.sessions.get(c.value()))
        .ok_or_else(|| {
            warn!("unauthorized access attempt");
            AppError::Unauthorized
        })?;
    if session.role != required {
        warn!(
            "access denied for user '{}' with role '{}'",
            session.username,
            session.role.as_str()
        );
        return Err(AppError::AccessDenied);
    }
    Ok(session)
}
