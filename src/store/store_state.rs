use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::task::{PaginatedResponse, Task, TaskFilter};
use crate::view::Theme;

/// Kinds of asynchronous work the store tracks a loading flag for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsyncKind {
    FetchTasks,
    FetchTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> From<&PaginatedResponse<T>> for Pagination {
    fn from(page: &PaginatedResponse<T>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub theme: Theme,
    pub token: Option<String>,
    pub user: Option<User>,
    pub tasks: Vec<Task>,
    pub pagination: Option<Pagination>,
    pub filters: TaskFilter,
    pub current_task: Option<Task>,
    pub pending: BTreeSet<AsyncKind>,
    pub error: Option<String>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            token: None,
            user: None,
            tasks: Vec::new(),
            pagination: None,
            filters: TaskFilter::first_page(),
            current_task: None,
            pending: BTreeSet::new(),
            error: None,
        }
    }
}

impl StoreState {
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, kind: AsyncKind) -> bool {
        self.pending.contains(&kind)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
