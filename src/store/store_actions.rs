use uuid::Uuid;

use crate::auth::User;
use crate::task::{PaginatedResponse, Task, TaskFilterPatch};
use crate::view::Theme;

/// Lifecycle of one asynchronous request.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Pending,
    Fulfilled(T),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetFilters(TaskFilterPatch),
    ClearCurrentTask,
    ClearError,
    SetCredentials { token: String, user: Option<User> },
    Logout,
    SetTheme(Theme),

    FetchTasks(Phase<PaginatedResponse<Task>>),
    FetchTask(Phase<Task>),
    CreateTask(Phase<Task>),
    UpdateTask(Phase<Task>),
    DeleteTask(Phase<Uuid>),
}
