use serde::{Deserialize, Serialize};

use crate::auth::Claims;

/// Request body for `POST /users`. Fields are optional so that missing
/// values produce a 400 with a message instead of a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<Claims>,
}
