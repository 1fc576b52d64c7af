//! Fixed-delay retry chain for a single token delivery.
//!
//! One chain walks `Delivering → {Delivered | Retrying → Delivering | GaveUp}`
//! with an attempt counter and the runtime's sleep as its only state. Chains
//! are never cancelled by newer refreshes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::constants::{MAX_RETRIES, RETRY_DELAY};
use crate::registry::{SaveTokenRequest, TokenRegistry};

/// Retry policy for token delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failure.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

/// Terminal state of a delivery chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Server accepted the token.
    Delivered {
        /// Attempt index that succeeded (0 = first try).
        attempt: u32,
        /// Server's `message`, if it sent one.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Retries exhausted.
    GaveUp {
        /// Attempt index of the final failure.
        attempt: u32,
        /// Error of the final failure.
        last_error: String,
    },
}

impl DeliveryOutcome {
    /// Whether the token reached the server.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Run one delivery chain to completion, starting at `attempt`.
///
/// Failures are retried while `attempt < policy.max_retries`, sleeping
/// `policy.delay` before each retry. Giving up is logged, never returned as
/// an error.
pub async fn run_chain(
    registry: Arc<dyn TokenRegistry>,
    request: SaveTokenRequest,
    policy: RetryPolicy,
    mut attempt: u32,
) -> DeliveryOutcome {
    loop {
        match registry.save_token(&request).await {
            Ok(response) => {
                log::info!(
                    "Push token saved (attempt {}): {}",
                    attempt,
                    response.message.as_deref().unwrap_or("(no message)")
                );
                return DeliveryOutcome::Delivered {
                    attempt,
                    message: response.message,
                };
            }
            Err(e) if attempt < policy.max_retries => {
                log::warn!(
                    "Error sending token to server (attempt {}): {} - retrying in {:?}",
                    attempt,
                    e,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!(
                    "Error sending token to server (attempt {}): {} - giving up",
                    attempt,
                    e
                );
                return DeliveryOutcome::GaveUp {
                    attempt,
                    last_error: e.to_string(),
                };
            }
        }
    }
}
