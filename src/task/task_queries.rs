use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cache::{Mutation, QueryCache, QueryKey, QueryState};
use crate::error::Result;
use crate::platform::Platform;
use crate::task::task_dto::{CreateTaskRequest, PaginatedResponse, UpdateTaskRequest};
use crate::task::task_models::{Task, TaskFilter};
use crate::task::task_service::TaskService;

pub const TASK_LIST: &str = "tasks";
pub const TASK_DETAIL: &str = "task";

pub fn list_key(filter: &TaskFilter) -> QueryKey {
    QueryKey::new(TASK_LIST, filter.to_query_string())
}

pub fn detail_key(task_id: Uuid) -> QueryKey {
    QueryKey::new(TASK_DETAIL, task_id.to_string())
}

/// Cached reads and cache-aware writes for tasks.
///
/// After a write the server's copy of the record is applied to every cached
/// entry that holds it, and list entries are invalidated so that their
/// membership and totals come from a fresh `GET /tasks`.
#[derive(Clone)]
pub struct TaskQueries {
    service: TaskService,
    platform: Arc<dyn Platform>,
    lists: QueryCache<PaginatedResponse<Task>>,
    details: QueryCache<Task>,
}

impl TaskQueries {
    pub fn new(service: TaskService, platform: Arc<dyn Platform>, stale_time: Duration) -> Self {
        Self {
            service,
            platform,
            lists: QueryCache::new(stale_time),
            details: QueryCache::new(stale_time),
        }
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<PaginatedResponse<Task>> {
        let service = self.service.clone();
        let filter = *filter;
        self.lists
            .query(list_key(&filter), move || async move { service.list(&filter).await })
            .await
    }

    pub async fn get(&self, task_id: Uuid) -> Result<Task> {
        let service = self.service.clone();
        self.details
            .query(detail_key(task_id), move || async move { service.get(task_id).await })
            .await
    }

    pub async fn create(&self, payload: &CreateTaskRequest) -> Result<Task> {
        Mutation::new(self.platform.clone())
            .with_success_message("Task created")
            .run(self.service.create(payload), |task| {
                self.details.set_data(detail_key(task.id), task.clone());
                self.lists.invalidate_resource(TASK_LIST);
            })
            .await
    }

    pub async fn update(&self, task_id: Uuid, payload: &UpdateTaskRequest) -> Result<Task> {
        Mutation::new(self.platform.clone())
            .with_success_message("Task updated")
            .run(self.service.update(task_id, payload), |task| {
                self.apply_updated(task)
            })
            .await
    }

    pub async fn toggle_complete(&self, task: &Task) -> Result<Task> {
        let message = if task.completed {
            "Task marked as pending"
        } else {
            "Task completed"
        };
        Mutation::new(self.platform.clone())
            .with_success_message(message)
            .run(self.service.toggle_complete(task), |task| {
                self.apply_updated(task)
            })
            .await
    }

    pub async fn delete(&self, task_id: Uuid) -> Result<()> {
        Mutation::new(self.platform.clone())
            .with_success_message("Task deleted")
            .run(self.service.delete(task_id), |_| {
                self.details.remove(&detail_key(task_id));
                self.lists
                    .update_where(TASK_LIST, |page| page.data.retain(|t| t.id != task_id));
                self.lists.invalidate_resource(TASK_LIST);
            })
            .await
    }

    pub fn list_state(&self, filter: &TaskFilter) -> Option<QueryState<PaginatedResponse<Task>>> {
        self.lists.state(&list_key(filter))
    }

    pub fn detail_state(&self, task_id: Uuid) -> Option<QueryState<Task>> {
        self.details.state(&detail_key(task_id))
    }

    pub fn invalidate_lists(&self) {
        self.lists.invalidate_resource(TASK_LIST);
    }

    /// Forgets everything, e.g. when the session ends.
    pub fn reset(&self) {
        self.caches().reset();
    }

    /// Handles on the underlying caches, without the service behind them.
    pub fn caches(&self) -> TaskCaches {
        TaskCaches {
            lists: self.lists.clone(),
            details: self.details.clone(),
        }
    }

    fn apply_updated(&self, task: &Task) {
        self.details.set_data(detail_key(task.id), task.clone());
        self.lists.update_where(TASK_LIST, |page| {
            for row in page.data.iter_mut().filter(|row| row.id == task.id) {
                *row = task.clone();
            }
        });
        self.lists.invalidate_resource(TASK_LIST);
    }
}

/// The task caches alone; cheap to clone and safe to hold from inside the
/// HTTP layer.
#[derive(Clone)]
pub struct TaskCaches {
    lists: QueryCache<PaginatedResponse<Task>>,
    details: QueryCache<Task>,
}

impl TaskCaches {
    pub fn reset(&self) {
        self.lists.clear();
        self.details.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.details.is_empty()
    }
}
