use crate::domain::models::{Session, validate_non_empty};
use crate::infrastructure::api_client::TokenSource;
use crate::infrastructure::auth_client::{
    AuthHttpClient, SessionPayload, SignInRequest, SignUpRequest,
};
use crate::infrastructure::error::ClientError;
use crate::infrastructure::session_store::SessionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const TOKEN_LEEWAY_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureSessionResult {
    /// The stored session is still valid.
    Active(Session),
    /// The provider reported a newer session, which is now stored.
    Refreshed(Session),
    SignInRequired,
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Owns the session lifecycle: sign-up/sign-in/sign-out against the auth
/// service and revalidation of the stored session before requests fire.
pub struct SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    session_store: Arc<S>,
    auth_client: Arc<C>,
    now_provider: NowProvider,
}

impl<S, C> SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    pub fn new(session_store: Arc<S>, auth_client: Arc<C>) -> Self {
        Self {
            session_store,
            auth_client,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn is_session_valid(&self, session: &Session) -> bool {
        session.is_valid_at((self.now_provider)(), TOKEN_LEEWAY_SECONDS)
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        validate_non_empty(name, "name").map_err(ClientError::ValidationFailed)?;
        validate_non_empty(email, "email").map_err(ClientError::ValidationFailed)?;
        validate_non_empty(password, "password").map_err(ClientError::ValidationFailed)?;

        let payload = self
            .auth_client
            .sign_up(SignUpRequest {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let session = session_from_payload(payload)?;
        self.session_store.save_session(&session)?;
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        validate_non_empty(email, "email").map_err(ClientError::ValidationFailed)?;
        validate_non_empty(password, "password").map_err(ClientError::ValidationFailed)?;

        let payload = self
            .auth_client
            .sign_in(SignInRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let session = session_from_payload(payload)?;
        self.session_store.save_session(&session)?;
        Ok(session)
    }

    /// The local session is cleared first; remote revocation is
    /// best-effort and its failure does not resurrect the session.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let stored = self.session_store.load_session()?;
        self.session_store.delete_session()?;
        if let Some(session) = stored {
            let _ = self.auth_client.sign_out(&session.token).await;
        }
        Ok(())
    }

    /// Resolves the session to use for the next request. A stored session
    /// past (or within the leeway of) its expiry is revalidated against
    /// the provider rather than being sent out stale.
    pub async fn ensure_session(&self) -> Result<EnsureSessionResult, ClientError> {
        let Some(stored) = self.session_store.load_session()? else {
            return Ok(EnsureSessionResult::SignInRequired);
        };

        if self.is_session_valid(&stored) {
            return Ok(EnsureSessionResult::Active(stored));
        }

        match self.auth_client.get_session(&stored.token).await {
            Ok(Some(payload)) => {
                let session = session_from_payload(payload)?;
                if !self.is_session_valid(&session) {
                    self.session_store.delete_session()?;
                    return Ok(EnsureSessionResult::SignInRequired);
                }
                self.session_store.save_session(&session)?;
                Ok(EnsureSessionResult::Refreshed(session))
            }
            Ok(None) => {
                self.session_store.delete_session()?;
                Ok(EnsureSessionResult::SignInRequired)
            }
            Err(ClientError::Unauthorized) => {
                self.session_store.delete_session()?;
                Ok(EnsureSessionResult::SignInRequired)
            }
            Err(error) => Err(error),
        }
    }

    pub fn current_session(&self) -> Result<Option<Session>, ClientError> {
        self.session_store.load_session()
    }
}

#[async_trait]
impl<S, C> TokenSource for SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    async fn bearer_token(&self) -> Result<Option<String>, ClientError> {
        match self.ensure_session().await? {
            EnsureSessionResult::Active(session) | EnsureSessionResult::Refreshed(session) => {
                Ok(Some(session.token))
            }
            EnsureSessionResult::SignInRequired => Ok(None),
        }
    }
}

fn session_from_payload(payload: SessionPayload) -> Result<Session, ClientError> {
    if payload.token.trim().is_empty() {
        return Err(ClientError::InvalidPayload(
            "auth service returned an empty session token".to_string(),
        ));
    }
    let expires_at = payload
        .expires_at
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|error| {
                    ClientError::InvalidPayload(format!("invalid session expiresAt '{raw}': {error}"))
                })
        })
        .transpose()?;

    Ok(Session {
        user_id: payload.user_id,
        email: payload.email,
        display_name: payload.display_name,
        token: payload.token,
        expires_at,
    })
}
