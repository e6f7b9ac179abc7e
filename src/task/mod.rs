pub mod task_dto;
pub mod task_models;
pub mod task_queries;
pub mod task_service;

pub use task_dto::{CreateTaskRequest, PaginatedResponse, UpdateTaskRequest};
pub use task_models::{Task, TaskFilter, TaskFilterPatch, TaskPriority};
pub use task_queries::{detail_key, list_key, TaskCaches, TaskQueries, TASK_DETAIL, TASK_LIST};
pub use task_service::TaskService;
