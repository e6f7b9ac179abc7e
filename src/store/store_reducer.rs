//! State transitions of the client store.
//!
//! `reduce` is total: every action yields a new state and nothing here can
//! fail or touch the outside world.

use super::store_actions::{Action, Phase};
use super::store_state::{AsyncKind, Pagination, StoreState};

pub fn reduce(mut state: StoreState, action: Action) -> StoreState {
    match action {
        Action::SetFilters(patch) => {
            state.filters = state.filters.merge(&patch);
        }
        Action::ClearCurrentTask => {
            state.current_task = None;
        }
        Action::ClearError => {
            state.error = None;
        }
        Action::SetCredentials { token, user } => {
            state.token = Some(token);
            if user.is_some() {
                state.user = user;
            }
        }
        Action::Logout => {
            state = StoreState {
                theme: state.theme,
                ..StoreState::default()
            };
        }
        Action::SetTheme(theme) => {
            state.theme = theme;
        }

        Action::FetchTasks(phase) => {
            if let Some(page) = settle(&mut state, AsyncKind::FetchTasks, phase) {
                state.pagination = Some(Pagination::from(&page));
                state.tasks = page.data;
            }
        }
        Action::FetchTask(phase) => {
            if let Some(task) = settle(&mut state, AsyncKind::FetchTask, phase) {
                state.current_task = Some(task);
            }
        }
        Action::CreateTask(phase) => {
            if let Some(task) = settle(&mut state, AsyncKind::CreateTask, phase) {
                state.tasks.insert(0, task);
            }
        }
        Action::UpdateTask(phase) => {
            if let Some(task) = settle(&mut state, AsyncKind::UpdateTask, phase) {
                if let Some(row) = state.tasks.iter_mut().find(|row| row.id == task.id) {
                    *row = task.clone();
                }
                if state.current_task.as_ref().is_some_and(|t| t.id == task.id) {
                    state.current_task = Some(task);
                }
            }
        }
        Action::DeleteTask(phase) => {
            if let Some(task_id) = settle(&mut state, AsyncKind::DeleteTask, phase) {
                state.tasks.retain(|row| row.id != task_id);
                if state.current_task.as_ref().is_some_and(|t| t.id == task_id) {
                    state.current_task = None;
                }
            }
        }
    }
    state
}

/// Applies the bookkeeping shared by every phase and hands back the
/// payload of a fulfilled request.
fn settle<T>(state: &mut StoreState, kind: AsyncKind, phase: Phase<T>) -> Option<T> {
    match phase {
        Phase::Pending => {
            state.pending.insert(kind);
            state.error = None;
            None
        }
        Phase::Fulfilled(value) => {
            state.pending.remove(&kind);
            Some(value)
        }
        Phase::Rejected(message) => {
            state.pending.remove(&kind);
            state.error = Some(message);
            None
        }
    }
}
