use crate::infrastructure::error::ClientError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Raw session material as the auth service reports it; the session
/// manager turns this into a domain `Session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPayload {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub expires_at: Option<String>,
}

#[async_trait]
pub trait AuthHttpClient: Send + Sync {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SessionPayload, ClientError>;

    async fn sign_in(&self, request: SignInRequest) -> Result<SessionPayload, ClientError>;

    /// Asks the provider for the session behind `token`. `None` means the
    /// provider no longer recognizes it.
    async fn get_session(&self, token: &str) -> Result<Option<SessionPayload>, ClientError>;

    async fn sign_out(&self, token: &str) -> Result<(), ClientError>;
}

/// HTTP client for the external auth service. The service speaks
/// camelCase JSON and reports failures as `{message}` bodies.
#[derive(Debug, Clone)]
pub struct ReqwestAuthClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, serde::Serialize)]
struct SignUpPayload<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, serde::Serialize)]
struct SignInPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct AuthUserPayload {
    id: String,
    email: String,
    name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SignedInPayload {
    token: String,
    user: AuthUserPayload,
    #[serde(rename = "expiresAt")]
    expires_at: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct SessionDetailsPayload {
    token: String,
    #[serde(rename = "expiresAt")]
    expires_at: Option<String>,
}

#[derive(Debug, serde::Deserialize, Default)]
struct SessionEnvelopePayload {
    session: Option<SessionDetailsPayload>,
    user: Option<AuthUserPayload>,
}

#[derive(Debug, serde::Deserialize)]
struct AuthErrorPayload {
    message: Option<String>,
}

impl ReqwestAuthClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidConfig("auth base URL cannot be a base".to_string()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }

    fn auth_http_error(status: reqwest::StatusCode, body: &str) -> ClientError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ClientError::Unauthorized;
        }
        let message = serde_json::from_str::<AuthErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.message)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown status")
                )
            });
        ClientError::ServerRejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<(reqwest::StatusCode, String), ClientError> {
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            ClientError::NetworkUnavailable(format!("failed reading auth response: {error}"))
        })?;
        Ok((status, body))
    }

    fn session_from_signed_in(body: &str) -> Result<SessionPayload, ClientError> {
        let parsed: SignedInPayload = serde_json::from_str(body)
            .map_err(|error| ClientError::InvalidPayload(format!("{error}; body={body}")))?;
        Ok(SessionPayload {
            token: parsed.token,
            user_id: parsed.user.id,
            email: parsed.user.email,
            display_name: parsed.user.name.unwrap_or_default(),
            expires_at: parsed.expires_at,
        })
    }
}

#[async_trait]
impl AuthHttpClient for ReqwestAuthClient {
    async fn sign_up(&self, request: SignUpRequest) -> Result<SessionPayload, ClientError> {
        let endpoint = self.endpoint(&["sign-up", "email"])?;
        let response = self
            .client
            .post(endpoint)
            .json(&SignUpPayload {
                name: &request.name,
                email: &request.email,
                password: &request.password,
            })
            .send()
            .await
            .map_err(|error| ClientError::NetworkUnavailable(format!("sign-up request failed: {error}")))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(Self::auth_http_error(status, &body));
        }
        Self::session_from_signed_in(&body)
    }

    async fn sign_in(&self, request: SignInRequest) -> Result<SessionPayload, ClientError> {
        let endpoint = self.endpoint(&["sign-in", "email"])?;
        let response = self
            .client
            .post(endpoint)
            .json(&SignInPayload {
                email: &request.email,
                password: &request.password,
            })
            .send()
            .await
            .map_err(|error| ClientError::NetworkUnavailable(format!("sign-in request failed: {error}")))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(Self::auth_http_error(status, &body));
        }
        Self::session_from_signed_in(&body)
    }

    async fn get_session(&self, token: &str) -> Result<Option<SessionPayload>, ClientError> {
        let endpoint = self.endpoint(&["get-session"])?;
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| {
                ClientError::NetworkUnavailable(format!("session lookup request failed: {error}"))
            })?;

        let (status, body) = Self::read_body(response).await?;
        // An unrecognized token is an absent session, not a hard failure.
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::auth_http_error(status, &body));
        }
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }

        let parsed: SessionEnvelopePayload = serde_json::from_str(&body)
            .map_err(|error| ClientError::InvalidPayload(format!("{error}; body={body}")))?;
        let (Some(session), Some(user)) = (parsed.session, parsed.user) else {
            return Ok(None);
        };
        Ok(Some(SessionPayload {
            token: session.token,
            user_id: user.id,
            email: user.email,
            display_name: user.name.unwrap_or_default(),
            expires_at: session.expires_at,
        }))
    }

    async fn sign_out(&self, token: &str) -> Result<(), ClientError> {
        let endpoint = self.endpoint(&["sign-out"])?;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| ClientError::NetworkUnavailable(format!("sign-out request failed: {error}")))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(Self::auth_http_error(status, &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_extend_the_auth_base_path() {
        let client = ReqwestAuthClient::new(
            Url::parse("http://localhost:3000/api/auth").expect("valid base url"),
        );
        let endpoint = client.endpoint(&["sign-in", "email"]).expect("build endpoint");
        assert_eq!(endpoint.as_str(), "http://localhost:3000/api/auth/sign-in/email");
    }

    #[test]
    fn signed_in_payload_decodes_token_and_user() {
        let body = r#"{"token":"tok-1","user":{"id":"u1","email":"ada@example.com","name":"Ada"}}"#;
        let payload = ReqwestAuthClient::session_from_signed_in(body).expect("decode payload");
        assert_eq!(payload.token, "tok-1");
        assert_eq!(payload.user_id, "u1");
        assert_eq!(payload.display_name, "Ada");
        assert_eq!(payload.expires_at, None);
    }

    #[test]
    fn signed_in_payload_without_token_is_invalid() {
        let body = r#"{"user":{"id":"u1","email":"ada@example.com"}}"#;
        let result = ReqwestAuthClient::session_from_signed_in(body);
        assert!(matches!(result, Err(ClientError::InvalidPayload(_))));
    }

    #[test]
    fn auth_errors_prefer_the_server_message() {
        let error = ReqwestAuthClient::auth_http_error(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"password too short"}"#,
        );
        match error {
            ClientError::ServerRejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "password too short");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn auth_errors_fall_back_to_status_and_reason() {
        let error =
            ReqwestAuthClient::auth_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        match error {
            ClientError::ServerRejected { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "HTTP 500 Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_maps_to_the_dedicated_variant() {
        let error = ReqwestAuthClient::auth_http_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(matches!(error, ClientError::Unauthorized));
    }
}
