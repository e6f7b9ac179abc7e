use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::AuthService,
    error::Result,
    http::HttpClient,
    platform::Platform,
    store::Store,
    task::{TaskCaches, TaskQueries, TaskService},
    view::{RouteGuard, ThemePreference},
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STALE_TIME_SECS: u64 = 30;
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_PROTECTED_PREFIX: &str = "/dashboard";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub stale_time: Duration,
    pub login_path: String,
    pub protected_prefix: String,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            stale_time: Duration::from_secs(DEFAULT_STALE_TIME_SECS),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            protected_prefix: DEFAULT_PROTECTED_PREFIX.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let api_url =
            std::env::var("TASKS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let mut config = Self::new(api_url);
        config.request_timeout =
            Duration::from_secs(secs_from_env("TASKS_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        config.stale_time =
            Duration::from_secs(secs_from_env("TASKS_STALE_TIME_SECS", DEFAULT_STALE_TIME_SECS));
        if let Ok(path) = std::env::var("TASKS_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Ok(prefix) = std::env::var("TASKS_PROTECTED_PREFIX") {
            config.protected_prefix = prefix;
        }
        config
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }
}

fn secs_from_env(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} must be a number of seconds, got {:?}; using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Everything a front end needs, wired once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub platform: Arc<dyn Platform>,
    pub http: HttpClient,
    pub task_service: TaskService,
    pub auth_service: AuthService,
    pub task_queries: TaskQueries,
    pub store: Store,
    pub theme: ThemePreference,
    pub route_guard: RouteGuard,
}

impl AppState {
    pub fn new(config: Config, platform: Arc<dyn Platform>) -> Result<Self> {
        let config = Arc::new(config);
        let http = HttpClient::new(&config, platform.clone())?;

        let task_service = TaskService::new(http.clone());
        let auth_service = AuthService::new(http.clone(), platform.clone());
        let task_queries = TaskQueries::new(task_service.clone(), platform.clone(), config.stale_time);
        let store = Store::hydrate(platform.clone());
        let theme = ThemePreference::new(platform.clone());
        let route_guard = RouteGuard::new(&config.protected_prefix, &config.login_path);

        // A rejected session is a forced logout.
        let (hook_store, hook_caches) = (store.clone(), task_queries.caches());
        http.on_session_end(Arc::new(move || end_session(&hook_store, &hook_caches)));

        Ok(Self {
            config,
            platform,
            http,
            task_service,
            auth_service,
            task_queries,
            store,
            theme,
            route_guard,
        })
    }

    /// Signs out locally: token, user and cached server data are dropped;
    /// the theme survives.
    pub fn logout(&self) {
        end_session(&self.store, &self.task_queries.caches());
        tracing::info!("Signed out");
    }
}

fn end_session(store: &Store, caches: &TaskCaches) {
    store.logout();
    caches.reset();
}
