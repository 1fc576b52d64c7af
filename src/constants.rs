//! Application-wide constants for sharepush.
//!
//! Defaults for everything the [`Config`](crate::config::Config) can
//! override live here, grouped by domain.
//!
//! # Categories
//!
//! - **Endpoints**: Remote content and token registration URLs
//! - **Delivery**: Retry policy for token registration
//! - **Refresh**: Periodic token re-check
//! - **Timeouts**: Network timeouts

use std::time::Duration;

// ============================================================================
// Endpoints
// ============================================================================

/// Remote page displayed full-screen by the shell.
pub const CONTENT_URL: &str = "https://share-push-web.vercel.app/";

/// Endpoint that stores the device's push token.
pub const SAVE_TOKEN_URL: &str = "https://share-push-web.vercel.app/api/pushes/saveToken";

/// Project the platform notification service issues tokens for.
pub const DEFAULT_PROJECT_ID: &str = "share-push-web";

// ============================================================================
// Delivery
// ============================================================================

/// Retries after the first failed delivery before the chain gives up.
pub const MAX_RETRIES: u32 = 3;

/// Fixed delay between delivery attempts. No backoff.
pub const RETRY_DELAY: Duration = Duration::from_millis(5000);

// ============================================================================
// Refresh
// ============================================================================

/// Interval between periodic token re-checks.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================================================
// Timeouts
// ============================================================================

/// HTTP client request timeout for token registration.
///
/// Applies to a single attempt; a timed out attempt goes through the
/// normal retry path.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent with every registration request.
pub fn user_agent() -> String {
    format!("sharepush/{}", env!("CARGO_PKG_VERSION"))
}
