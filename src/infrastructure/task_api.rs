use crate::domain::models::{ProfilePatch, TaskDraft, TaskPatch};
use crate::infrastructure::api_client::{ApiClient, TokenSource};
use crate::infrastructure::error::ClientError;
use crate::infrastructure::record_mapper::{ProfileRecord, TaskRecord};
use async_trait::async_trait;
use url::Url;

/// Typed operations over the task collection and the profile singleton.
/// Implementations pass the given fields through verbatim and hand back
/// the server's authoritative record so callers can resync local state.
#[async_trait]
pub trait TaskTrackerApi: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, ClientError>;

    async fn create_task(&self, draft: &TaskDraft) -> Result<TaskRecord, ClientError>;

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, ClientError>;

    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> Result<TaskRecord, ClientError>;

    async fn delete_task(&self, task_id: &str) -> Result<(), ClientError>;

    async fn get_profile(&self) -> Result<ProfileRecord, ClientError>;

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<ProfileRecord, ClientError>;
}

pub struct HttpTaskTrackerApi<T: TokenSource> {
    api: ApiClient<T>,
}

impl<T: TokenSource> HttpTaskTrackerApi<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }

    fn ensure_task_id(task_id: &str) -> Result<(), ClientError> {
        if task_id.trim().is_empty() {
            return Err(ClientError::ValidationFailed(
                "task id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn collection_endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidConfig("api base URL cannot be a base".to_string()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
            // Trailing slash: the collection routes are registered with one.
            parts.push("");
        }
        Ok(url)
    }

    fn item_endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidConfig("api base URL cannot be a base".to_string()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    fn tasks_endpoint(&self) -> Result<Url, ClientError> {
        Self::collection_endpoint(self.api.base_url(), &["api", "tasks"])
    }

    fn task_endpoint(&self, task_id: &str) -> Result<Url, ClientError> {
        Self::item_endpoint(self.api.base_url(), &["api", "tasks", task_id])
    }

    fn profile_endpoint(&self) -> Result<Url, ClientError> {
        Self::item_endpoint(self.api.base_url(), &["api", "auth", "me"])
    }

    fn profile_update_endpoint(&self) -> Result<Url, ClientError> {
        Self::item_endpoint(self.api.base_url(), &["api", "users", "me"])
    }
}

#[async_trait]
impl<T: TokenSource> TaskTrackerApi for HttpTaskTrackerApi<T> {
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, ClientError> {
        let endpoint = self.tasks_endpoint()?;
        self.api.get_json(endpoint).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<TaskRecord, ClientError> {
        let endpoint = self.tasks_endpoint()?;
        self.api.post_json(endpoint, draft).await
    }

    async fn get_task(&self, task_id: &str) -> Result<TaskRecord, ClientError> {
        Self::ensure_task_id(task_id)?;
        let endpoint = self.task_endpoint(task_id)?;
        self.api.get_json(endpoint).await
    }

    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> Result<TaskRecord, ClientError> {
        Self::ensure_task_id(task_id)?;
        let endpoint = self.task_endpoint(task_id)?;
        self.api.put_json(endpoint, patch).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        Self::ensure_task_id(task_id)?;
        let endpoint = self.task_endpoint(task_id)?;
        self.api.delete(endpoint).await
    }

    async fn get_profile(&self) -> Result<ProfileRecord, ClientError> {
        let endpoint = self.profile_endpoint()?;
        self.api.get_json(endpoint).await
    }

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<ProfileRecord, ClientError> {
        let endpoint = self.profile_update_endpoint()?;
        self.api.put_json(endpoint, patch).await
    }
}
