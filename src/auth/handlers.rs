use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{Session, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/register", post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".into()));
    }

    // Ensure email is not taken
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = User::create(&state.db, &payload.name, &payload.email, &hash, payload.role)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "Email already registered"))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_string();

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let session = Session::create(&state.db, user.id).await?;
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, session.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /login: an already-authenticated caller goes straight to the
/// dashboard.
pub async fn login_page(user: Option<CurrentUser>) -> Response {
    match user {
        Some(_) => Redirect::to("/dashboard").into_response(),
        None => Json(json!({
            "message": "Log in by POSTing email and password to /login"
        }))
        .into_response(),
    }
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    Session::delete(&state.db, user.session_id).await?;
    info!(user_id = %user.id, "user logged out");
    Ok(Json(json!({ "message": "Logged out" })))
}

/// GET /: landing for anonymous callers, dashboard redirect otherwise.
pub async fn home(user: Option<CurrentUser>) -> Response {
    match user {
        Some(_) => Redirect::to("/dashboard").into_response(),
        None => Json(json!({
            "message": "Event portal",
            "login": "/login",
            "register": "/register"
        }))
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn register_request_role_defaults_to_user() {
        let payload: RegisterRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"a@x.com","password":"pw1"}"#,
        )
        .unwrap();
        assert_eq!(payload.role, Role::User);

        let payload: RegisterRequest = serde_json::from_str(
            r#"{"name":"Root","email":"r@x.com","password":"pw","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(payload.role, Role::Admin);
    }

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            name: "Alice".into(),
            email: "test@example.com".to_string(),
            role: Role::User,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains(r#""role":"user""#));
    }
}
