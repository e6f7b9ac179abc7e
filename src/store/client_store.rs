use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use super::store_actions::{Action, Phase};
use super::store_reducer::reduce;
use super::store_state::StoreState;
use crate::auth::AuthResponse;
use crate::error::Result;
use crate::platform::{Platform, THEME_KEY, TOKEN_KEY};
use crate::task::{CreateTaskRequest, PaginatedResponse, Task, TaskService, UpdateTaskRequest};
use crate::view::Theme;

/// Process-wide client state, created once at start-up and handed to
/// whoever needs it.
///
/// State changes only through [`Store::dispatch`]. The reducer stays pure;
/// persistence of the token and theme happens here.
#[derive(Clone)]
pub struct Store {
    state: Arc<watch::Sender<StoreState>>,
    platform: Arc<dyn Platform>,
}

impl Store {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self::with_state(platform, StoreState::default())
    }

    /// Starts from whatever token and theme the platform has persisted.
    pub fn hydrate(platform: Arc<dyn Platform>) -> Self {
        let mut state = StoreState::default();
        state.token = platform
            .storage_get(TOKEN_KEY)
            .filter(|token| !token.is_empty());
        state.theme = Theme::load(platform.as_ref());
        Self::with_state(platform, state)
    }

    fn with_state(platform: Arc<dyn Platform>, state: StoreState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self {
            state: Arc::new(tx),
            platform,
        }
    }

    pub fn dispatch(&self, action: Action) {
        match &action {
            Action::SetCredentials { token, .. } => self.platform.storage_set(TOKEN_KEY, token),
            Action::Logout => self.platform.storage_remove(TOKEN_KEY),
            Action::SetTheme(theme) => self.platform.storage_set(THEME_KEY, &theme.to_string()),
            _ => {}
        }

        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = reduce(current, action);
        });
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn select<R>(&self, selector: impl FnOnce(&StoreState) -> R) -> R {
        selector(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn changes(&self) -> WatchStream<StoreState> {
        WatchStream::new(self.subscribe())
    }

    pub fn sign_in(&self, session: &AuthResponse) {
        self.dispatch(Action::SetCredentials {
            token: session.token.clone(),
            user: Some(session.user.clone()),
        });
    }

    pub fn logout(&self) {
        self.dispatch(Action::Logout);
    }

    /// Loads the page described by the current filters.
    pub async fn fetch_tasks(&self, service: &TaskService) -> Result<PaginatedResponse<Task>> {
        let filter = self.select(|state| state.filters);
        self.track(Action::FetchTasks, service.list(&filter)).await
    }

    pub async fn fetch_task(&self, service: &TaskService, task_id: Uuid) -> Result<Task> {
        self.track(Action::FetchTask, service.get(task_id)).await
    }

    pub async fn create_task(
        &self,
        service: &TaskService,
        payload: &CreateTaskRequest,
    ) -> Result<Task> {
        self.track(Action::CreateTask, service.create(payload)).await
    }

    pub async fn update_task(
        &self,
        service: &TaskService,
        task_id: Uuid,
        payload: &UpdateTaskRequest,
    ) -> Result<Task> {
        self.track(Action::UpdateTask, service.update(task_id, payload))
            .await
    }

    pub async fn delete_task(&self, service: &TaskService, task_id: Uuid) -> Result<Uuid> {
        let request = async move { service.delete(task_id).await.map(|_| task_id) };
        self.track(Action::DeleteTask, request).await
    }

    /// Runs `request` between a pending and a fulfilled/rejected dispatch.
    async fn track<T, F>(&self, action: fn(Phase<T>) -> Action, request: F) -> Result<T>
    where
        T: Clone,
        F: Future<Output = Result<T>>,
    {
        self.dispatch(action(Phase::Pending));
        match request.await {
            Ok(value) => {
                self.dispatch(action(Phase::Fulfilled(value.clone())));
                Ok(value)
            }
            Err(e) => {
                self.dispatch(action(Phase::Rejected(e.user_message())));
                Err(e)
            }
        }
    }
}
