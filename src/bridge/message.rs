//! Typed messages exchanged with the embedded content.
//!
//! Both directions carry JSON objects discriminated by a `type` field.
//! Inbound payloads are validated here; unknown kinds are dropped so a newer
//! page cannot break an older shell.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;
use crate::session::SessionIdentity;

/// Message from the embedded content to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// `{ type: 'SESSION_UPDATE', session }`
    SessionUpdate {
        /// Session as reported; guest when the payload has no usable user id.
        session: SessionIdentity,
    },
    /// `{ type: 'GET_PUSH_TOKEN' }`
    GetPushToken,
}

impl InboundMessage {
    /// Wire name of this message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "SESSION_UPDATE",
            Self::GetPushToken => "GET_PUSH_TOKEN",
        }
    }

    /// Parse one raw inbound payload.
    ///
    /// Returns `Ok(None)` for well-formed messages of an unknown kind.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedInbound`] if the payload is not a JSON
    /// object with a string `type` field.
    pub fn parse(raw: &str) -> Result<Option<Self>, BridgeError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| BridgeError::MalformedInbound(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::MalformedInbound("missing string `type`".to_string()))?;

        match kind {
            "SESSION_UPDATE" => {
                let session = value
                    .get("session")
                    .map(SessionIdentity::from_value)
                    .unwrap_or_default();
                Ok(Some(Self::SessionUpdate { session }))
            }
            "GET_PUSH_TOKEN" => Ok(Some(Self::GetPushToken)),
            other => {
                log::debug!("Ignoring inbound message of unknown type {other:?}");
                Ok(None)
            }
        }
    }
}

/// Message from the shell to the embedded content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// Reply to `GET_PUSH_TOKEN`. `token` is omitted when none is known.
    PushToken {
        /// Current push token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// A notification arrived while the app was running.
    NotificationReceived {
        /// Platform notification, forwarded verbatim.
        notification: Value,
    },
    /// The user interacted with a notification.
    NotificationResponse {
        /// Platform response, forwarded verbatim.
        response: Value,
    },
}

impl OutboundMessage {
    /// Encode as the JSON string posted into the content.
    pub fn encode(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}
