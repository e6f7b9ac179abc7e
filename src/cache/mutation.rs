use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::platform::{Notice, Platform};

/// Wraps a write so that cache invalidation runs on success and the user
/// hears about the outcome exactly once.
///
/// Failures that went through the HTTP adapter were already announced
/// there; only errors raised before a request was sent are announced here.
pub struct Mutation {
    platform: Arc<dyn Platform>,
    success_message: Option<String>,
}

impl Mutation {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            success_message: None,
        }
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub async fn run<T, W, S>(self, write: W, on_success: S) -> Result<T>
    where
        W: Future<Output = Result<T>>,
        S: FnOnce(&T),
    {
        match write.await {
            Ok(value) => {
                on_success(&value);
                if let Some(message) = self.success_message {
                    self.platform.notify(Notice::success(message));
                }
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("mutation failed: {}", e);
                if !e.was_surfaced() {
                    self.platform.notify(Notice::error(e.user_message()));
                }
                Err(e)
            }
        }
    }
}
