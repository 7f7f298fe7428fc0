pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{
    BootstrapResult, TaskpadClient, bootstrap_workspace, initialize_client,
};
pub use application::session::{EnsureSessionResult, SessionManager};
pub use application::state::TaskCollection;
pub use application::task_service::TaskService;
pub use domain::models::{Profile, ProfilePatch, Session, Task, TaskDraft, TaskPatch};
pub use infrastructure::api_client::{ApiClient, TokenSource};
pub use infrastructure::error::ClientError;
pub use infrastructure::task_api::{HttpTaskTrackerApi, TaskTrackerApi};
