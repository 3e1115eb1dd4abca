use std::fmt;

use tracing::{debug, warn};

use super::{ApiClient, ClientError, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Loading,
    Ready(Option<UserProfile>),
}

/// Who is logged in, resolved from the bearer token via `GET /users/me`.
pub struct AuthContext {
    api: ApiClient,
    state: AuthState,
}

impl AuthContext {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: AuthState::Loading,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Rejected or stale tokens resolve to "no user"; transport errors propagate
    /// and leave the state as it was.
    pub async fn resolve(&mut self) -> Result<&AuthState, ClientError> {
        if self.api.token().is_none() {
            self.state = AuthState::Ready(None);
            return Ok(&self.state);
        }
        let user = match self.api.me().await {
            Ok(user) => Some(user),
            Err(ClientError::Api { status, message }) if status == 401 || status == 404 => {
                debug!(status, %message, "no authenticated user");
                None
            }
            Err(e) => {
                warn!(error = %e, "resolving current user failed");
                return Err(e);
            }
        };
        self.state = AuthState::Ready(user);
        Ok(&self.state)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&AuthState, ClientError> {
        let token = self.api.login(email, password).await?;
        self.api.set_token(Some(token));
        self.state = AuthState::Loading;
        self.resolve().await
    }

    pub fn logout(&mut self) {
        self.api.set_token(None);
        self.state = AuthState::Ready(None);
    }
}

/// What the profile panel shows for a given auth state.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInfosView {
    Loading,
    NotFound,
    Profile {
        image_url: Option<String>,
        name: String,
        email: String,
    },
}

impl UserInfosView {
    pub fn from_auth(state: &AuthState, api: &ApiClient) -> Self {
        match state {
            AuthState::Loading => UserInfosView::Loading,
            AuthState::Ready(None) => UserInfosView::NotFound,
            AuthState::Ready(Some(user)) => UserInfosView::Profile {
                image_url: user
                    .image
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|p| api.asset_url(p)),
                name: user.name.clone(),
                email: user.email.clone(),
            },
        }
    }
}

impl fmt::Display for UserInfosView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserInfosView::Loading => write!(f, "Loading..."),
            UserInfosView::NotFound => write!(f, "User not found."),
            UserInfosView::Profile {
                image_url,
                name,
                email,
            } => {
                if let Some(url) = image_url {
                    writeln!(f, "[image: {}]", url)?;
                }
                writeln!(f, "{}", name)?;
                write!(f, "{}", email)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana(image: Option<&str>) -> UserProfile {
        UserProfile {
            id: 1,
            name: "Ana".into(),
            email: "a@x.com".into(),
            image: image.map(String::from),
        }
    }

    #[test]
    fn loading_state_shows_spinner() {
        let api = ApiClient::new("http://localhost:3333");
        let view = UserInfosView::from_auth(&AuthState::Loading, &api);
        assert_eq!(view, UserInfosView::Loading);
        assert_eq!(view.to_string(), "Loading...");
    }

    #[test]
    fn missing_user_shows_not_found() {
        let api = ApiClient::new("http://localhost:3333");
        let view = UserInfosView::from_auth(&AuthState::Ready(None), &api);
        assert_eq!(view.to_string(), "User not found.");
    }

    #[test]
    fn profile_joins_image_with_base_url() {
        let api = ApiClient::new("http://localhost:3333");
        let state = AuthState::Ready(Some(ana(Some("/uploads/users/ana.png"))));
        let view = UserInfosView::from_auth(&state, &api);
        assert_eq!(
            view,
            UserInfosView::Profile {
                image_url: Some("http://localhost:3333/uploads/users/ana.png".into()),
                name: "Ana".into(),
                email: "a@x.com".into(),
            }
        );
        assert_eq!(
            view.to_string(),
            "[image: http://localhost:3333/uploads/users/ana.png]\nAna\na@x.com"
        );
    }

    #[test]
    fn profile_without_image() {
        let api = ApiClient::new("http://localhost:3333");
        let view = UserInfosView::from_auth(&AuthState::Ready(Some(ana(None))), &api);
        assert_eq!(view.to_string(), "Ana\na@x.com");
    }

    #[tokio::test]
    async fn resolve_without_token_is_logged_out() {
        let mut auth = AuthContext::new(ApiClient::new("http://127.0.0.1:9"));
        assert_eq!(auth.state(), &AuthState::Loading);
        let state = auth.resolve().await.unwrap();
        assert_eq!(state, &AuthState::Ready(None));
    }
}
