use std::sync::{Arc, RwLock};
use std::time::Instant;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use super::http_envelope::{ApiEnvelope, ErrorBody};
use crate::{
    error::{ClientError, Result},
    platform::{Notice, Platform, TOKEN_KEY},
    state::Config,
};

/// Query parameters in the order they are sent.
pub type QueryPairs = Vec<(&'static str, String)>;

/// Runs after the server rejected the session and the token was removed.
pub type SessionEndHook = Arc<dyn Fn() + Send + Sync>;

/// Endpoints whose 401 means "wrong credentials", not "session over".
const AUTH_PREFIX: &str = "auth/";

/// Authenticated JSON client for the task API.
///
/// Reads the bearer token from platform storage before every request, tears
/// the session down on 401 and turns every other failure into an error
/// notification. Errors are always handed back to the caller afterwards.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Arc<str>,
    login_path: Arc<str>,
    platform: Arc<dyn Platform>,
    session_end_hooks: Arc<RwLock<Vec<SessionEndHook>>>,
}

impl HttpClient {
    pub fn new(config: &Config, platform: Arc<dyn Platform>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner,
            base_url: Arc::from(config.api_url.as_str()),
            login_path: Arc::from(config.login_path.as_str()),
            platform,
            session_end_hooks: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Registers `hook` to run whenever a 401 ends the session. Shared by
    /// every clone of this client.
    pub fn on_session_end(&self, hook: SessionEndHook) {
        if let Ok(mut hooks) = self.session_end_hooks.write() {
            hooks.push(hook);
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &QueryPairs) -> Result<T> {
        let builder = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, builder)
            .await
            .and_then(|envelope| self.required(path, envelope))
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, builder)
            .await
            .and_then(|envelope| self.required(path, envelope))
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, builder)
            .await
            .and_then(|envelope| self.required(path, envelope))
    }

    /// DELETE; any `data` in the envelope is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path);
        self.send::<serde_json::Value>(Method::DELETE, path, builder)
            .await
            .map(|_| ())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.inner.request(method, url);

        match self.platform.storage_get(TOKEN_KEY) {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        let started = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} {} failed after {:?}: {}", method, path, started.elapsed(), e);
                return Err(self.surface(ClientError::from(e)));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.surface(ClientError::from(e))),
        };

        tracing::debug!("{} {} -> {} in {:?}", method, path, status, started.elapsed());

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(ApiEnvelope {
                    success: true,
                    message: None,
                    data: None,
                });
            }
            let envelope: ApiEnvelope<T> = match serde_json::from_slice(&bytes) {
                Ok(envelope) => envelope,
                Err(e) => return Err(self.surface(ClientError::from(e))),
            };
            if !envelope.success {
                let message = envelope
                    .message
                    .unwrap_or_else(|| crate::error::FALLBACK_MESSAGE.to_string());
                return Err(self.surface(ClientError::Api(message)));
            }
            return Ok(envelope);
        }

        let (message, fields) = ErrorBody::parse(&bytes).into_parts();
        let error = ClientError::from_status(status.as_u16(), message, fields);

        if status == StatusCode::UNAUTHORIZED && !is_auth_path(path) {
            self.end_session();
            return Err(error);
        }

        Err(self.surface(error))
    }

    /// Clears the stored token and sends the user to the login screen.
    fn end_session(&self) {
        tracing::info!("Session rejected by server; signing out");
        self.platform.storage_remove(TOKEN_KEY);

        let hooks = self
            .session_end_hooks
            .read()
            .map(|hooks| hooks.clone())
            .unwrap_or_default();
        for hook in hooks {
            hook();
        }

        self.platform.navigate(&self.login_path);
    }

    fn required<T>(&self, path: &str, envelope: ApiEnvelope<T>) -> Result<T> {
        envelope.data.ok_or_else(|| {
            self.surface(ClientError::Decode(format!(
                "response to {} carried no data",
                path
            )))
        })
    }

    fn surface(&self, error: ClientError) -> ClientError {
        tracing::error!("API error: {}", error);
        self.platform.notify(Notice::error(error.user_message()));
        error
    }
}

fn is_auth_path(path: &str) -> bool {
    path.trim_start_matches('/').starts_with(AUTH_PREFIX)
}
