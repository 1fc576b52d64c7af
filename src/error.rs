//! Error types for the library layer.
//!
//! None of these reach the embedded content. Delivery and platform errors
//! end up in diagnostic logs; bridge errors cause the offending message to
//! be dropped.

use thiserror::Error;

/// A single token delivery attempt failed.
///
/// Every variant is retryable; the retry chain does not distinguish them.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Request never produced a response (DNS, connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),
    /// Server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// 2xx response whose body is not the expected JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Failure talking to the platform notification service.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Notification permission was not granted.
    #[error("notification permission not granted")]
    PermissionDenied,
    /// Push tokens are only issued on physical devices.
    #[error("push notifications require a physical device")]
    NoPhysicalDevice,
    /// The service could not issue a token.
    #[error("token issuance failed: {0}")]
    TokenUnavailable(String),
    /// Any other service failure (channel setup, presentation policy).
    ///
    /// Produced by host [`NotificationService`](crate::platform::NotificationService)
    /// implementations. The pipeline and shell log it and carry on.
    #[error("notification service error: {0}")]
    Service(String),
}

/// Message exchange with the embedded content failed.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Inbound payload was not valid JSON or lacked a string `type`.
    #[error("malformed inbound message: {0}")]
    MalformedInbound(String),
    /// Outbound message could not be encoded.
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
    /// Content side of the bridge is gone.
    #[error("web content unavailable: {0}")]
    ContentUnavailable(String),
}
