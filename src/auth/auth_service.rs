use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::auth::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::auth::jwt::is_token_usable;
use crate::error::Result;
use crate::http::HttpClient;
use crate::platform::{Platform, TOKEN_KEY};

#[derive(Clone)]
pub struct AuthService {
    http: HttpClient,
    platform: Arc<dyn Platform>,
}

impl AuthService {
    pub fn new(http: HttpClient, platform: Arc<dyn Platform>) -> Self {
        Self { http, platform }
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<AuthResponse> {
        payload.validate()?;
        let session: AuthResponse = self.http.post("/auth/register", payload).await?;
        self.persist(&session);
        tracing::info!("Registered {}", session.user.email);
        Ok(session)
    }

    pub async fn login(&self, payload: &LoginRequest) -> Result<AuthResponse> {
        payload.validate()?;
        let session: AuthResponse = self.http.post("/auth/login", payload).await?;
        self.persist(&session);
        tracing::info!("Signed in as {}", session.user.email);
        Ok(session)
    }

    /// Local only; the API has no logout endpoint.
    pub fn logout(&self) {
        self.platform.storage_remove(TOKEN_KEY);
        tracing::info!("Signed out");
    }

    pub fn current_token(&self) -> Option<String> {
        self.platform
            .storage_get(TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token()
            .is_some_and(|token| is_token_usable(&token, Utc::now()))
    }

    fn persist(&self, session: &AuthResponse) {
        self.platform.storage_set(TOKEN_KEY, &session.token);
    }
}
