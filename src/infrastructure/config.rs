use crate::infrastructure::error::ClientError;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const APP_JSON: &str = "app.json";
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:3000/api/auth";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub auth_base_url: Url,
    pub request_timeout: Duration,
}

fn default_app_config() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "appName": "Taskpad",
        "apiBaseUrl": DEFAULT_API_BASE_URL,
        "authBaseUrl": DEFAULT_AUTH_BASE_URL,
        "requestTimeoutSeconds": DEFAULT_REQUEST_TIMEOUT_SECONDS,
    })
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), ClientError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_app_config())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, ClientError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| ClientError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(ClientError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

fn read_base_url(app: &serde_json::Value, key: &str, fallback: &str) -> Result<Url, ClientError> {
    let raw = app
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback);
    Url::parse(raw).map_err(|error| ClientError::InvalidConfig(format!("invalid {key} '{raw}': {error}")))
}

pub fn load_client_config(config_dir: &Path) -> Result<ClientConfig, ClientError> {
    let app = read_config(&config_dir.join(APP_JSON))?;

    let api_base_url = read_base_url(&app, "apiBaseUrl", DEFAULT_API_BASE_URL)?;
    let auth_base_url = read_base_url(&app, "authBaseUrl", DEFAULT_AUTH_BASE_URL)?;

    let timeout_seconds = app
        .get("requestTimeoutSeconds")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
    if timeout_seconds == 0 {
        return Err(ClientError::InvalidConfig(
            "requestTimeoutSeconds must be > 0".to_string(),
        ));
    }

    Ok(ClientConfig {
        api_base_url,
        auth_base_url,
        request_timeout: Duration::from_secs(timeout_seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

    struct TempConfigDir {
        path: PathBuf,
    }

    impl TempConfigDir {
        fn new() -> Self {
            let sequence = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "taskpad-config-{}-{}-{}",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp directory");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempConfigDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn defaults_are_written_once_and_load_back() {
        let temp = TempConfigDir::new();
        ensure_default_configs(temp.path()).expect("write defaults");

        let config = load_client_config(temp.path()).expect("load config");
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.auth_base_url.as_str(), "http://localhost:3000/api/auth");
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        // Re-running must not clobber an existing file.
        fs::write(
            temp.path().join("app.json"),
            "{\"schema\": 1, \"apiBaseUrl\": \"https://tasks.example.com\"}\n",
        )
        .expect("overwrite config");
        ensure_default_configs(temp.path()).expect("idempotent defaults");
        let config = load_client_config(temp.path()).expect("reload config");
        assert_eq!(config.api_base_url.as_str(), "https://tasks.example.com/");
    }

    #[test]
    fn unsupported_schema_is_rejected() {
        let temp = TempConfigDir::new();
        fs::write(temp.path().join("app.json"), "{\"schema\": 2}\n").expect("write config");

        let result = load_client_config(temp.path());
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let temp = TempConfigDir::new();
        fs::write(
            temp.path().join("app.json"),
            "{\"schema\": 1, \"apiBaseUrl\": \"not a url\"}\n",
        )
        .expect("write config");

        let result = load_client_config(temp.path());
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = TempConfigDir::new();
        fs::write(
            temp.path().join("app.json"),
            "{\"schema\": 1, \"requestTimeoutSeconds\": 0}\n",
        )
        .expect("write config");

        let result = load_client_config(temp.path());
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }
}
