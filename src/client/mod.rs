//! Typed HTTP client for the stockroom API, plus the state holders the web
//! frontend builds on: a product cache, the product edit form and the
//! profile view.

mod edit_product;
mod products;
mod profile;

pub use edit_product::{EditProductForm, ImageFile};
pub use products::ProductsContext;
pub use profile::{AuthContext, AuthState, UserInfosView};

use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::{products::Product, uploads::UploadKind};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// User as returned by the API (the password hash is never sent).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// Full product payload sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub image: Option<String>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: 0.0,
            quantity: 0,
            image: None,
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            quantity: p.quantity,
            image: p.image.clone(),
        }
    }
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct VerifyBody {
    valid: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadBody {
    image_path: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Absolute URL for a stored image path such as `/uploads/users/x.png`.
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageBody>(&text)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, ClientError> {
        let resp = Self::check(rb.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let body = json!({ "name": name, "email": email, "password": password });
        Self::send_json(self.request(Method::POST, "/users").json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ClientError> {
        let body = json!({ "email": email, "password": password });
        let TokenBody { token } =
            Self::send_json(self.request(Method::POST, "/users/login").json(&body)).await?;
        Ok(token)
    }

    /// `Ok(false)` when the server rejects the token.
    pub async fn verify_token(&self, token: &str) -> Result<bool, ClientError> {
        let resp = self
            .request(Method::POST, "/verify-token")
            .json(&json!({ "token": token }))
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let VerifyBody { valid } = Self::check(resp).await?.json().await?;
        Ok(valid)
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        Self::send_json(self.request(Method::GET, "/users/me")).await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        Self::send_json(self.request(Method::GET, "/products")).await
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ClientError> {
        Self::send_json(self.request(Method::POST, "/products").json(draft)).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Product, ClientError> {
        Self::send_json(
            self.request(Method::PUT, &format!("/products/{}", id))
                .json(draft),
        )
        .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/products/{}", id))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Uploads an image and returns the stored image path.
    pub async fn upload_image(
        &self,
        kind: UploadKind,
        image: &ImageFile,
    ) -> Result<String, ClientError> {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = multipart::Form::new().part("image", part);
        let UploadBody { image_path } = Self::send_json(
            self.request(Method::POST, &format!("/uploads/{}", kind))
                .multipart(form),
        )
        .await?;
        Ok(image_path)
    }
}
