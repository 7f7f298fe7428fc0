use crate::application::session::SessionManager;
use crate::application::task_service::TaskService;
use crate::infrastructure::api_client::ApiClient;
use crate::infrastructure::auth_client::ReqwestAuthClient;
use crate::infrastructure::config::{ensure_default_configs, load_client_config};
use crate::infrastructure::error::ClientError;
use crate::infrastructure::operation_log::OperationLog;
use crate::infrastructure::session_store::KeyringSessionStore;
use crate::infrastructure::task_api::HttpTaskTrackerApi;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type DefaultSessionManager = SessionManager<KeyringSessionStore, ReqwestAuthClient>;
pub type DefaultTaskService = TaskService<HttpTaskTrackerApi<DefaultSessionManager>>;

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
}

/// The production wiring: keychain-held session, HTTP clients from the
/// workspace config, file-backed operation log.
pub struct TaskpadClient {
    pub session: Arc<DefaultSessionManager>,
    pub tasks: DefaultTaskService,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, ClientError> {
    let config_dir = workspace_root.join("config");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let _ = load_client_config(&config_dir)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
    })
}

pub fn initialize_client(workspace_root: &Path) -> Result<TaskpadClient, ClientError> {
    let bootstrap = bootstrap_workspace(workspace_root)?;
    let config = load_client_config(&bootstrap.config_dir)?;

    let session = Arc::new(SessionManager::new(
        Arc::new(KeyringSessionStore::default()),
        Arc::new(ReqwestAuthClient::new(config.auth_base_url.clone())),
    ));

    let api_client = ApiClient::new(
        config.api_base_url.clone(),
        Arc::clone(&session),
        config.request_timeout,
    )?;
    let tasks = TaskService::new(
        Arc::new(HttpTaskTrackerApi::new(api_client)),
        OperationLog::new(&bootstrap.logs_dir),
    );

    Ok(TaskpadClient { session, tasks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

    struct TempWorkspace {
        path: PathBuf,
    }

    impl TempWorkspace {
        fn new() -> Self {
            let sequence = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "taskpad-workspace-{}-{}-{}",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
                sequence
            ));
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempWorkspace {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn bootstrap_creates_directories_and_default_config() {
        let workspace = TempWorkspace::new();
        let result = bootstrap_workspace(workspace.path()).expect("bootstrap workspace");

        assert!(result.config_dir.join("app.json").exists());
        assert!(result.logs_dir.exists());

        // Running again against the same workspace must be a no-op.
        bootstrap_workspace(workspace.path()).expect("bootstrap is idempotent");
    }

    #[test]
    fn initialize_client_wires_the_default_stack() {
        let workspace = TempWorkspace::new();
        let client = initialize_client(workspace.path()).expect("initialize client");
        assert!(client.tasks.tasks_snapshot().expect("snapshot").is_empty());
        assert!(workspace.path().join("config").join("app.json").exists());
    }
}
