use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{ClientError, FieldErrors, Result};
use crate::task::{
    CreateTaskRequest, PaginatedResponse, Task, TaskFilter, TaskFilterPatch, TaskPriority,
    TaskQueries, UpdateTaskRequest,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Creating,
    Editing(Task),
}

/// Values typed into the task form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            due_date: task.due_date,
        }
    }

    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn into_create(self) -> CreateTaskRequest {
        CreateTaskRequest {
            description: self.description(),
            title: self.title.trim().to_string(),
            priority: Some(self.priority),
            due_date: self.due_date,
        }
    }

    /// Every form field is sent; a blank description or due date clears it.
    fn into_update(self) -> UpdateTaskRequest {
        UpdateTaskRequest {
            description: Some(self.description()),
            title: Some(self.title.trim().to_string()),
            completed: None,
            priority: Some(self.priority),
            due_date: Some(self.due_date),
        }
    }
}

/// View model of the task list page.
///
/// Owns only ephemeral UI state (form, search text, active filter); all
/// reads and writes go through [`TaskQueries`]. A write that succeeded
/// reports success even when the reload after it fails; that failure is
/// kept in [`TaskBoard::load_error`].
pub struct TaskBoard {
    queries: TaskQueries,
    filter: TaskFilter,
    search: String,
    form: FormState,
    field_errors: FieldErrors,
    page: Option<PaginatedResponse<Task>>,
    load_error: Option<ClientError>,
}

impl TaskBoard {
    pub fn new(queries: TaskQueries) -> Self {
        Self {
            queries,
            filter: TaskFilter::first_page(),
            search: String::new(),
            form: FormState::Closed,
            field_errors: FieldErrors::new(),
            page: None,
            load_error: None,
        }
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn page(&self) -> Option<&PaginatedResponse<Task>> {
        self.page.as_ref()
    }

    /// Why the last reload failed, if it did. Rows show the last good page.
    pub fn load_error(&self) -> Option<&ClientError> {
        self.load_error.as_ref()
    }

    /// Current page, narrowed by the search box.
    pub fn rows(&self) -> Vec<&Task> {
        self.page
            .iter()
            .flat_map(|page| page.data.iter())
            .filter(|task| task.matches_search(&self.search))
            .collect()
    }

    pub fn summary(&self) -> String {
        match &self.page {
            Some(page) if page.total == 0 => "No tasks yet".to_string(),
            Some(page) => format!(
                "Page {} of {} ({} tasks)",
                page.page,
                page.total_pages().max(1),
                page.total
            ),
            None => "Loading…".to_string(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        match self.queries.list(&self.filter).await {
            Ok(page) => {
                self.page = Some(page);
                self.load_error = None;
                Ok(())
            }
            Err(e) => {
                self.load_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Reload after a write; a failure only lands in `load_error`.
    async fn refresh(&mut self) {
        if let Err(e) = self.load().await {
            tracing::debug!("reload after write failed: {}", e);
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Changing any criterion other than the page starts again at page 1.
    pub async fn update_filters(&mut self, patch: TaskFilterPatch) -> Result<()> {
        let mut patch = patch;
        if patch.page.is_none() {
            patch.page = Some(Some(TaskFilter::DEFAULT_PAGE));
        }
        self.filter = self.filter.merge(&patch);
        self.load().await
    }

    pub async fn next_page(&mut self) -> Result<()> {
        let has_next = self.page.as_ref().is_some_and(|page| page.has_next());
        if !has_next {
            return Ok(());
        }
        let page = self.filter.page_or_default() + 1;
        self.update_filters(TaskFilterPatch::default().page(Some(page)))
            .await
    }

    pub async fn prev_page(&mut self) -> Result<()> {
        let page = self.filter.page_or_default();
        if page <= 1 {
            return Ok(());
        }
        self.update_filters(TaskFilterPatch::default().page(Some(page - 1)))
            .await
    }

    pub fn open_create(&mut self) {
        self.field_errors.clear();
        self.form = FormState::Creating;
    }

    pub fn open_edit(&mut self, task: Task) {
        self.field_errors.clear();
        self.form = FormState::Editing(task);
    }

    pub fn close_form(&mut self) {
        self.field_errors.clear();
        self.form = FormState::Closed;
    }

    /// Saves the form. On failure the form stays open and field errors
    /// are kept for inline display.
    pub async fn submit(&mut self, values: TaskForm) -> Result<Task> {
        let result = match &self.form {
            FormState::Editing(task) => self.queries.update(task.id, &values.into_update()).await,
            FormState::Creating | FormState::Closed => {
                self.queries.create(&values.into_create()).await
            }
        };

        match result {
            Ok(task) => {
                self.close_form();
                self.refresh().await;
                Ok(task)
            }
            Err(e) => {
                self.field_errors = e.field_errors().cloned().unwrap_or_default();
                Err(e)
            }
        }
    }

    pub async fn toggle_complete(&mut self, task_id: Uuid) -> Result<Task> {
        let task = match self.find(task_id) {
            Some(task) => task.clone(),
            None => self.queries.get(task_id).await?,
        };
        let updated = self.queries.toggle_complete(&task).await?;
        self.refresh().await;
        Ok(updated)
    }

    pub async fn delete(&mut self, task_id: Uuid) -> Result<()> {
        self.queries.delete(task_id).await?;
        if matches!(&self.form, FormState::Editing(task) if task.id == task_id) {
            self.close_form();
        }
        self.refresh().await;
        Ok(())
    }

    fn find(&self, task_id: Uuid) -> Option<&Task> {
        self.page
            .as_ref()
            .and_then(|page| page.data.iter().find(|task| task.id == task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_conversion_trims_and_drops_blank_description() {
        let form = TaskForm {
            title: "  Write report ".into(),
            description: "   ".into(),
            priority: TaskPriority::High,
            due_date: None,
        };

        let create = form.clone().into_create();
        assert_eq!(create.title, "Write report");
        assert_eq!(create.description, None);
        assert_eq!(create.priority, Some(TaskPriority::High));

        let update = form.into_update();
        assert_eq!(update.title.as_deref(), Some("Write report"));
        assert_eq!(update.completed, None);
        assert_eq!(update.description, Some(None));
        assert_eq!(update.due_date, Some(None));
    }
}
