//! Remote token registry client.
//!
//! Sends `POST {save_token_url}` with `{ token, deviceInfo }` and expects a
//! 2xx JSON body. Its `message`, when present, is reported back. A non-2xx
//! status or a body that is not JSON is a [`DeliveryError`]; retrying is the
//! caller's business.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::device::DeviceInfo;
use crate::error::DeliveryError;

/// Body of a token registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTokenRequest {
    /// Push token being registered.
    pub token: String,
    /// Host device snapshot.
    pub device_info: DeviceInfo,
    /// Session user id. Only sent when identity reporting is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Guest flag. Only sent when identity reporting is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
}

/// Successful registration response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTokenResponse {
    /// Server status message, if the body carried one.
    pub message: Option<String>,
}

impl SaveTokenResponse {
    /// Read a response from any JSON body.
    ///
    /// A string `message` is taken as is; any other non-null `message` is
    /// rendered as JSON text.
    pub fn from_value(body: &Value) -> Self {
        let message = match body.get("message") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { message }
    }
}

/// Server that stores push tokens.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Perform one registration attempt.
    async fn save_token(&self, request: &SaveTokenRequest)
        -> Result<SaveTokenResponse, DeliveryError>;
}

/// [`TokenRegistry`] over HTTP.
///
/// Reuses one `reqwest::Client` for connection pooling.
#[derive(Debug, Clone)]
pub struct HttpTokenRegistry {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenRegistry {
    /// Registry posting to `endpoint` with the default timeout and user agent.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(crate::constants::HTTP_REQUEST_TIMEOUT)
            .user_agent(crate::constants::user_agent())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Registry posting to `endpoint` with a caller-supplied client.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Registration endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenRegistry for HttpTokenRegistry {
    async fn save_token(
        &self,
        request: &SaveTokenRequest,
    ) -> Result<SaveTokenResponse, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DeliveryError::MalformedResponse(e.to_string()))?;
        Ok(SaveTokenResponse::from_value(&body))
    }
}
