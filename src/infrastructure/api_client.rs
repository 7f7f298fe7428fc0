use crate::infrastructure::error::ClientError;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Where the request client gets its credential. Passed in explicitly at
/// construction; there is no ambient session lookup.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// `None` means no usable session exists right now.
    async fn bearer_token(&self) -> Result<Option<String>, ClientError>;
}

/// Authenticated JSON-over-HTTP client for the resource API.
///
/// Every call awaits the current token first and fails with
/// `Unauthenticated` before any network I/O when none is available.
/// Responses are single-shot: no retries, the caller decides what to do
/// with a failure.
pub struct ApiClient<T: TokenSource> {
    http: Client,
    base_url: Url,
    token_source: Arc<T>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorPayload {
    detail: Option<String>,
}

impl<T: TokenSource> ApiClient<T> {
    pub fn new(
        base_url: Url,
        token_source: Arc<T>,
        request_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| ClientError::InvalidConfig(format!("failed to build http client: {error}")))?;
        Ok(Self {
            http,
            base_url,
            token_source,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_json<R: DeserializeOwned>(&self, url: Url) -> Result<R, ClientError> {
        let body = self.execute(Method::GET, url, None, &[]).await?;
        Self::decode_payload(body)
    }

    pub async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::POST, url, Some(payload), &[]).await?;
        Self::decode_payload(body)
    }

    pub async fn put_json<B, R>(&self, url: Url, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(body)?;
        let body = self.execute(Method::PUT, url, Some(payload), &[]).await?;
        Self::decode_payload(body)
    }

    pub async fn delete(&self, url: Url) -> Result<(), ClientError> {
        self.execute(Method::DELETE, url, None, &[]).await?;
        Ok(())
    }

    /// One round-trip. Returns the raw body, or `None` for a 204 / empty
    /// response, which is never JSON-parsed.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        extra_headers: &[(HeaderName, HeaderValue)],
    ) -> Result<Option<String>, ClientError> {
        let token = self
            .token_source
            .bearer_token()
            .await?
            .ok_or(ClientError::Unauthenticated)?;

        let headers = Self::build_headers(&token, extra_headers)?;
        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|error| ClientError::NetworkUnavailable(Self::transport_message(&error)))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await.map_err(|error| {
            ClientError::NetworkUnavailable(format!("failed reading response body: {error}"))
        })?;

        if !status.is_success() {
            return Err(Self::response_error(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(body))
    }

    /// Caller headers are merged first; the credential and content-type
    /// are inserted last so nothing can shadow them.
    fn build_headers(
        token: &str,
        extra_headers: &[(HeaderName, HeaderValue)],
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        for (name, value) in extra_headers {
            headers.insert(name.clone(), value.clone());
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|error| ClientError::Credential(format!("token is not header-safe: {error}")))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn response_error(status: StatusCode, body: &str) -> ClientError {
        if status == StatusCode::UNAUTHORIZED {
            return ClientError::Unauthorized;
        }
        let message = serde_json::from_str::<ApiErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.detail)
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

    fn transport_message(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("request deadline exceeded: {error}")
        } else {
            error.to_string()
        }
    }

    fn decode_payload<R: DeserializeOwned>(body: Option<String>) -> Result<R, ClientError> {
        let body = body
            .ok_or_else(|| ClientError::InvalidPayload("expected a response body".to_string()))?;
        serde_json::from_str(&body)
            .map_err(|error| ClientError::InvalidPayload(format!("{error}; body={body}")))
    }
}
