use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{
        CreateUserRequest, EmailQuery, LoginRequest, TokenResponse, UpdateUserRequest,
        VerifyTokenRequest, VerifyTokenResponse,
    },
    repo_types::{NewUser, User, UserChanges},
};
use crate::{
    auth::{hash_password, verify_password, AuthUser},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/login", post(login))
        .route("/users/verify-token", post(verify_token))
        .route("/users/me", get(get_me))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub fn token_routes() -> Router<AppState> {
    Router::new().route("/verify-token", post(verify_token))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[instrument(skip(state, query))]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;

    if let Some(email) = present(query.email) {
        let email = normalize_email(&email);
        return match state.users.get_by_email(&email).await? {
            Some(user) => Ok(Json(user).into_response()),
            None => Err(AppError::NotFound("User not found".into())),
        };
    }

    let users = state.users.get_all().await?;
    Ok(Json(users).into_response())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<User>> {
    let Path(id) = path?;
    state
        .users
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<User>)> {
    let Json(payload) = payload?;

    let (Some(name), Some(email), Some(password)) = (
        present(payload.name),
        present(payload.email),
        present(payload.password),
    ) else {
        warn!("create user with missing fields");
        return Err(AppError::Validation(
            "name, email and password are required".into(),
        ));
    };

    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .users
        .create(NewUser {
            name: name.trim().to_string(),
            email,
            password_hash,
            image: present(payload.image),
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(payload) = payload?;

    let (Some(email), Some(password)) = (present(payload.email), present(payload.password)) else {
        return Err(AppError::Validation("email and password are required".into()));
    };
    let email = normalize_email(&email);

    let Some(user) = state.users.get_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::NotFound("User not found".into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Auth("Incorrect password".into()));
    }

    let token = state.jwt.sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn verify_token(
    State(state): State<AppState>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload?;
    let token = present(payload.token)
        .ok_or_else(|| AppError::Validation("token is required".into()))?;

    let response = match state.jwt.verify(&token) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyTokenResponse {
                valid: true,
                decoded: Some(claims),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "token rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(VerifyTokenResponse {
                    valid: false,
                    decoded: None,
                }),
            )
        }
    };
    Ok(response.into_response())
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<User>> {
    state
        .users
        .get_by_id(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<User>> {
    let Path(id) = path?;
    let Json(payload) = payload?;

    let rejects_empty = |field: &str, value: &Option<String>| match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::Validation(format!("{} must not be empty", field)))
        }
        _ => Ok(()),
    };
    rejects_empty("name", &payload.name)?;
    rejects_empty("email", &payload.email)?;
    rejects_empty("password", &payload.password)?;

    let email = payload.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
    }

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;

    let changes = UserChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        email,
        password_hash,
        image: present(payload.image),
    };

    match state.users.update(id, changes).await? {
        Some(user) => {
            info!(user_id = id, "user updated");
            Ok(Json(user))
        }
        None => Err(AppError::NotFound("User not found".into())),
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    if state.users.delete(id).await? {
        info!(user_id = id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("User not found".into()))
    }
}
