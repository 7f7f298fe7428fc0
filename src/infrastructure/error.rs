use thiserror::Error;

/// Every failure surfaced by the client maps onto one of these variants;
/// the rendered message is what a UI shows the user as-is.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in, please sign in first")]
    Unauthenticated,
    #[error("credentials invalid, please re-authenticate")]
    Unauthorized,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("server rejected request: {message}")]
    ServerRejected { status: u16, message: String },
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
    #[error("invalid response payload: {0}")]
    InvalidPayload(String),
    #[error("credential store error: {0}")]
    Credential(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal state error: {0}")]
    State(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_message_differs_from_other_server_failures() {
        let unauthorized = ClientError::Unauthorized.to_string();
        let rejected = ClientError::ServerRejected {
            status: 500,
            message: "HTTP 500 Internal Server Error".to_string(),
        }
        .to_string();
        assert_ne!(unauthorized, rejected);
        assert!(rejected.contains("500"));
    }

    #[test]
    fn network_failures_read_differently_from_server_rejections() {
        let network = ClientError::NetworkUnavailable("connection refused".to_string()).to_string();
        assert!(network.starts_with("network unavailable"));
        assert!(!network.contains("server rejected"));
    }
}
