use chrono::{DateTime, Utc};

use crate::auth::is_token_usable;

pub const REGISTER_PATH: &str = "/register";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Per-navigation gate for pages that need a session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected_prefix: String,
    login_path: String,
}

impl RouteGuard {
    pub fn new(protected_prefix: &str, login_path: &str) -> Self {
        Self {
            protected_prefix: protected_prefix.to_string(),
            login_path: login_path.to_string(),
        }
    }

    pub fn check(&self, path: &str, token: Option<&str>, now: DateTime<Utc>) -> RouteDecision {
        let signed_in = token.is_some_and(|t| is_token_usable(t, now));

        if !signed_in && self.is_protected(path) {
            tracing::debug!("Redirecting {} to {}", path, self.login_path);
            return RouteDecision::Redirect(self.login_path.clone());
        }

        if signed_in && (path == self.login_path || path == REGISTER_PATH) {
            return RouteDecision::Redirect(self.protected_prefix.clone());
        }

        RouteDecision::Allow
    }

    fn is_protected(&self, path: &str) -> bool {
        match path.strip_prefix(self.protected_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}
