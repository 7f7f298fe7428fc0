use crate::application::state::TaskCollection;
use crate::domain::models::{Profile, ProfilePatch, Task, TaskDraft, TaskPatch};
use crate::infrastructure::error::ClientError;
use crate::infrastructure::operation_log::OperationLog;
use crate::infrastructure::record_mapper::{
    decode_profile_record, decode_task_record, decode_task_records,
};
use crate::infrastructure::task_api::TaskTrackerApi;
use std::sync::{Arc, Mutex, MutexGuard};

/// Orchestrates task and profile operations: validates caller input,
/// calls the façade, and mirrors the server's response into local state.
///
/// Local state changes only after the server confirms an operation; a
/// failed call leaves the collection exactly as it was. One operation is
/// in flight per user action, so a plain mutex around the collection is
/// enough.
pub struct TaskService<A: TaskTrackerApi> {
    api: Arc<A>,
    tasks: Mutex<TaskCollection>,
    profile: Mutex<Option<Profile>>,
    operation_log: OperationLog,
}

impl<A: TaskTrackerApi> TaskService<A> {
    pub fn new(api: Arc<A>, operation_log: OperationLog) -> Self {
        Self {
            api,
            tasks: Mutex::new(TaskCollection::new()),
            profile: Mutex::new(None),
            operation_log,
        }
    }

    /// Re-syncs the whole collection from the server's list.
    pub async fn refresh_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let result = self.refresh_tasks_inner().await;
        result.map_err(|error| self.operation_error("refresh_tasks", error))
    }

    async fn refresh_tasks_inner(&self) -> Result<Vec<Task>, ClientError> {
        let records = self.api.list_tasks().await?;
        let tasks = decode_task_records(&records)?;
        self.tasks_guard()?.replace_all(tasks.clone());
        self.operation_log
            .info("refresh_tasks", &format!("synced {} tasks", tasks.len()));
        Ok(tasks)
    }

    /// Validates the draft, creates the task, and appends the server's
    /// representation at the end of the collection.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, ClientError> {
        let result = self.create_task_inner(draft).await;
        result.map_err(|error| self.operation_error("create_task", error))
    }

    async fn create_task_inner(&self, draft: TaskDraft) -> Result<Task, ClientError> {
        draft.validate().map_err(ClientError::ValidationFailed)?;
        let record = self.api.create_task(&draft).await?;
        let task = decode_task_record(&record)?;
        self.tasks_guard()?.add_task(task.clone());
        self.operation_log
            .info("create_task", &format!("created {}", task.id));
        Ok(task)
    }

    /// Fetches a single task. A plain read never touches the collection.
    pub async fn get_task(&self, task_id: &str) -> Result<Task, ClientError> {
        let result = async {
            let record = self.api.get_task(task_id).await?;
            decode_task_record(&record)
        }
        .await;
        result.map_err(|error| self.operation_error("get_task", error))
    }

    /// Sends only the fields present in the patch and replaces the local
    /// entity in place with the server's authoritative copy.
    pub async fn update_task(&self, task_id: &str, patch: TaskPatch) -> Result<Task, ClientError> {
        let result = self.update_task_inner(task_id, patch).await;
        result.map_err(|error| self.operation_error("update_task", error))
    }

    async fn update_task_inner(&self, task_id: &str, patch: TaskPatch) -> Result<Task, ClientError> {
        patch.validate().map_err(ClientError::ValidationFailed)?;
        let record = self.api.update_task(task_id, &patch).await?;
        let task = decode_task_record(&record)?;
        self.tasks_guard()?.replace_task(task.clone());
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        let result = self.delete_task_inner(task_id).await;
        result.map_err(|error| self.operation_error("delete_task", error))
    }

    async fn delete_task_inner(&self, task_id: &str) -> Result<(), ClientError> {
        self.api.delete_task(task_id).await?;
        self.tasks_guard()?.remove_task(task_id);
        self.operation_log
            .info("delete_task", &format!("deleted {task_id}"));
        Ok(())
    }

    /// Flips `completed` through the regular update path; there is no
    /// separate toggle endpoint or error handling.
    pub async fn toggle_task_completed(&self, task_id: &str) -> Result<Task, ClientError> {
        let cached = self.tasks_guard()?.get(task_id).map(|task| task.completed);
        let current = match cached {
            Some(value) => value,
            None => self.get_task(task_id).await?.completed,
        };
        self.update_task(task_id, TaskPatch::completed(!current)).await
    }

    pub async fn fetch_profile(&self) -> Result<Profile, ClientError> {
        let result = async {
            let record = self.api.get_profile().await?;
            let profile = decode_profile_record(&record);
            *self.profile_guard()? = Some(profile.clone());
            Ok(profile)
        }
        .await;
        result.map_err(|error| self.operation_error("fetch_profile", error))
    }

    pub async fn update_profile(&self, patch: ProfilePatch) -> Result<Profile, ClientError> {
        let result = self.update_profile_inner(patch).await;
        result.map_err(|error| self.operation_error("update_profile", error))
    }

    async fn update_profile_inner(&self, patch: ProfilePatch) -> Result<Profile, ClientError> {
        patch.validate().map_err(ClientError::ValidationFailed)?;
        let record = self.api.update_profile(&patch).await?;
        let profile = decode_profile_record(&record);
        *self.profile_guard()? = Some(profile.clone());
        Ok(profile)
    }

    pub fn tasks_snapshot(&self) -> Result<Vec<Task>, ClientError> {
        Ok(self.tasks_guard()?.tasks().to_vec())
    }

    pub fn profile_snapshot(&self) -> Result<Option<Profile>, ClientError> {
        Ok(self.profile_guard()?.clone())
    }

    fn tasks_guard(&self) -> Result<MutexGuard<'_, TaskCollection>, ClientError> {
        self.tasks
            .lock()
            .map_err(|error| ClientError::State(format!("task collection lock poisoned: {error}")))
    }

    fn profile_guard(&self) -> Result<MutexGuard<'_, Option<Profile>>, ClientError> {
        self.profile
            .lock()
            .map_err(|error| ClientError::State(format!("profile lock poisoned: {error}")))
    }

    fn operation_error(&self, operation: &str, error: ClientError) -> ClientError {
        self.operation_log.error(operation, &error.to_string());
        error
    }
}
