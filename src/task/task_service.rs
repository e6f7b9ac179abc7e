use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::http::HttpClient;
use crate::task::task_dto::{CreateTaskRequest, PaginatedResponse, UpdateTaskRequest};
use crate::task::task_models::{Task, TaskFilter};

/// One function per task endpoint, one request per call.
#[derive(Clone)]
pub struct TaskService {
    http: HttpClient,
}

impl TaskService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<PaginatedResponse<Task>> {
        self.http.get("/tasks", &filter.to_query_pairs()).await
    }

    pub async fn get(&self, task_id: Uuid) -> Result<Task> {
        self.http.get(&format!("/tasks/{}", task_id), &Vec::new()).await
    }

    pub async fn create(&self, payload: &CreateTaskRequest) -> Result<Task> {
        payload.validate()?;
        self.http.post("/tasks", payload).await
    }

    pub async fn update(&self, task_id: Uuid, payload: &UpdateTaskRequest) -> Result<Task> {
        payload.validate()?;
        self.http.put(&format!("/tasks/{}", task_id), payload).await
    }

    pub async fn delete(&self, task_id: Uuid) -> Result<()> {
        self.http.delete(&format!("/tasks/{}", task_id)).await
    }

    pub async fn toggle_complete(&self, task: &Task) -> Result<Task> {
        self.update(task.id, &UpdateTaskRequest::completed(!task.completed))
            .await
    }
}
