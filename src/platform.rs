//! Platform notification service capability.
//!
//! The shell never talks to an OS notification API directly. Hosts hand it
//! an implementation of [`NotificationService`] covering permission state,
//! token issuance, foreground presentation, Android channels, and the two
//! notification event streams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::PlatformError;

/// Opaque push token issued by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PushToken(String);

impl PushToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PushToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PushToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for PushToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Notifications allowed.
    Granted,
    /// User refused.
    Denied,
    /// Never asked.
    Undetermined,
}

impl PermissionStatus {
    /// Whether notifications are allowed.
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// How notifications are presented while the app is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Show the alert banner.
    pub show_alert: bool,
    /// Play the notification sound.
    pub play_sound: bool,
    /// Update the app badge.
    pub set_badge: bool,
}

impl Presentation {
    /// Foreground policy of the shell: alert only, silent, no badge.
    pub const fn foreground() -> Self {
        Self {
            show_alert: true,
            play_sound: false,
            set_badge: false,
        }
    }
}

/// Android notification channel importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// No sound or visual interruption.
    Min,
    /// No sound.
    Low,
    /// Sound.
    Default,
    /// Sound and heads-up.
    High,
    /// Highest priority.
    Max,
}

/// Android notification channel definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidChannel {
    /// Channel id.
    pub id: String,
    /// User-visible channel name.
    pub name: String,
    /// Channel importance.
    pub importance: Importance,
    /// Vibration pattern in milliseconds (off/on alternating).
    pub vibration_pattern: Vec<u64>,
    /// LED color as `#AARRGGBB`.
    pub light_color: String,
}

impl AndroidChannel {
    /// The `default` channel every notification is posted to.
    pub fn default_channel() -> Self {
        Self {
            id: "default".to_string(),
            name: "default".to_string(),
            importance: Importance::Max,
            vibration_pattern: vec![0, 250, 250, 250],
            light_color: "#FF231F7C".to_string(),
        }
    }
}

/// Notification event raised by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A notification was received while the app was running.
    Received(Value),
    /// The user tapped or otherwise responded to a notification.
    Response(Value),
}

/// Host platform notification service.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Whether the app runs on real hardware (not an emulator/simulator).
    fn is_physical_device(&self) -> bool;

    /// Current permission state, without prompting.
    async fn permission_status(&self) -> Result<PermissionStatus, PlatformError>;

    /// Prompt for permission and return the resulting state.
    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError>;

    /// Issue a push token for `project_id`.
    async fn push_token(&self, project_id: &str) -> Result<PushToken, PlatformError>;

    /// Create or update an Android notification channel.
    async fn set_channel(&self, channel: &AndroidChannel) -> Result<(), PlatformError>;

    /// Set the foreground presentation policy.
    async fn set_presentation(&self, presentation: Presentation) -> Result<(), PlatformError>;

    /// Subscribe to notification events.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<NotificationEvent>;
}
