use crate::domain::models::Session;
use crate::infrastructure::error::ClientError;
use std::sync::Mutex;

pub trait SessionStore: Send + Sync {
    fn save_session(&self, session: &Session) -> Result<(), ClientError>;
    fn load_session(&self) -> Result<Option<Session>, ClientError>;
    fn delete_session(&self) -> Result<(), ClientError>;
}

/// Persists the session in the OS keychain as a JSON payload.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service_name: String,
    account_name: String,
}

impl KeyringSessionStore {
    pub fn new(service_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account_name: account_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, ClientError> {
        keyring::Entry::new(&self.service_name, &self.account_name)
            .map_err(|error| ClientError::Credential(error.to_string()))
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new("taskpad.session", "default")
    }
}

impl SessionStore for KeyringSessionStore {
    fn save_session(&self, session: &Session) -> Result<(), ClientError> {
        let payload =
            serde_json::to_string(session).map_err(|error| ClientError::Credential(error.to_string()))?;
        self.entry()?
            .set_password(&payload)
            .map_err(|error| ClientError::Credential(error.to_string()))
    }

    fn load_session(&self) -> Result<Option<Session>, ClientError> {
        let payload = match self.entry()?.get_password() {
            Ok(value) => value,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(error) => return Err(ClientError::Credential(error.to_string())),
        };

        let session = serde_json::from_str::<Session>(&payload)
            .map_err(|error| ClientError::Credential(error.to_string()))?;
        Ok(Some(session))
    }

    fn delete_session(&self) -> Result<(), ClientError> {
        match self.entry()?.delete_credential() {
            Ok(_) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(ClientError::Credential(error.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for InMemorySessionStore {
    fn save_session(&self, session: &Session) -> Result<(), ClientError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| ClientError::Credential(format!("in-memory lock poisoned: {error}")))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<Session>, ClientError> {
        let guard = self
            .session
            .lock()
            .map_err(|error| ClientError::Credential(format!("in-memory lock poisoned: {error}")))?;
        Ok(guard.clone())
    }

    fn delete_session(&self) -> Result<(), ClientError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| ClientError::Credential(format!("in-memory lock poisoned: {error}")))?;
        *guard = None;
        Ok(())
    }
}
