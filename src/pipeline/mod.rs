//! Push token delivery pipeline.
//!
//! Keeps the server's token → session mapping current:
//!
//! ```text
//! refresh(trigger)
//!     ↓
//! acquire_token()  ── none ──► TokenUnavailable
//!     ↓ token
//! unchanged and not a session change? ──► Unchanged
//!     ↓
//! deliver()  ──► spawned retry chain ──► Delivered | GaveUp
//! ```
//!
//! The pipeline owns the current token and session. It is driven from the
//! shell's single event loop, so neither needs locking. Delivery chains run
//! as detached tasks and capture the token and session at spawn time.

pub mod retry;

use std::sync::Arc;

use tokio::task::JoinHandle;

pub use retry::{run_chain, DeliveryOutcome, RetryPolicy};

use crate::config::Config;
use crate::device::DeviceInfo;
use crate::error::PlatformError;
use crate::platform::{AndroidChannel, NotificationService, PushToken};
use crate::registry::{SaveTokenRequest, TokenRegistry};
use crate::session::{Identity, SessionIdentity};

/// What started a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First cycle after the shell starts.
    Startup,
    /// Periodic timer tick.
    Timer,
    /// The embedded content reported a new session.
    SessionChanged,
}

impl std::fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Timer => write!(f, "timer"),
            Self::SessionChanged => write!(f, "session_changed"),
        }
    }
}

/// Result of one refresh cycle.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// No token could be obtained; nothing was sent.
    TokenUnavailable,
    /// Token equals the current one; nothing was sent.
    Unchanged,
    /// A delivery chain was spawned.
    Delivering(JoinHandle<DeliveryOutcome>),
}

impl RefreshOutcome {
    /// Handle of the spawned chain, if any.
    pub fn into_delivery(self) -> Option<JoinHandle<DeliveryOutcome>> {
        match self {
            Self::Delivering(handle) => Some(handle),
            Self::TokenUnavailable | Self::Unchanged => None,
        }
    }
}

/// Pipeline settings taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Project tokens are issued for.
    pub project_id: String,
    /// Delivery retry policy.
    pub retry: RetryPolicy,
    /// Put `userId`/`isGuest` into the request body.
    pub include_identity: bool,
}

impl PipelineOptions {
    /// Options from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            project_id: config.project_id.clone(),
            retry: config.retry_policy(),
            include_identity: config.include_identity,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Token delivery pipeline.
pub struct TokenPipeline {
    registry: Arc<dyn TokenRegistry>,
    notifications: Arc<dyn NotificationService>,
    device: DeviceInfo,
    options: PipelineOptions,
    current_token: Option<PushToken>,
    session: Option<SessionIdentity>,
}

impl std::fmt::Debug for TokenPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPipeline")
            .field("device", &self.device)
            .field("options", &self.options)
            .field("current_token", &self.current_token)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl TokenPipeline {
    /// Pipeline with no current token and a guest session.
    pub fn new(
        registry: Arc<dyn TokenRegistry>,
        notifications: Arc<dyn NotificationService>,
        device: DeviceInfo,
        options: PipelineOptions,
    ) -> Self {
        Self {
            registry,
            notifications,
            device,
            options,
            current_token: None,
            session: None,
        }
    }

    /// Token considered current, if any.
    pub fn current_token(&self) -> Option<&PushToken> {
        self.current_token.as_ref()
    }

    /// Last session reported by the content.
    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    /// Device snapshot sent with every delivery.
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Obtain a push token from the platform.
    ///
    /// Permission denial, emulators and issuance errors are logged and
    /// yield `None`. None of them is retried.
    pub async fn acquire_token(&self) -> Option<PushToken> {
        match self.try_acquire_token().await {
            Ok(token) => Some(token),
            Err(PlatformError::NoPhysicalDevice) => {
                log::info!("Must use physical device for Push Notifications");
                None
            }
            Err(PlatformError::PermissionDenied) => {
                log::info!("Failed to get push token for push notification!");
                None
            }
            Err(e) => {
                log::warn!("Push token unavailable: {e}");
                None
            }
        }
    }

    /// Obtain a push token, reporting why when there is none.
    pub async fn try_acquire_token(&self) -> Result<PushToken, PlatformError> {
        if self.device.is_android() {
            if let Err(e) = self
                .notifications
                .set_channel(&AndroidChannel::default_channel())
                .await
            {
                log::warn!("Failed to set up default notification channel: {e}");
            }
        }

        if !self.notifications.is_physical_device() {
            return Err(PlatformError::NoPhysicalDevice);
        }

        let mut status = self.notifications.permission_status().await?;
        if !status.is_granted() {
            status = self.notifications.request_permission().await?;
        }
        if !status.is_granted() {
            return Err(PlatformError::PermissionDenied);
        }

        let token = self
            .notifications
            .push_token(&self.options.project_id)
            .await?;
        if token.as_str().is_empty() {
            return Err(PlatformError::TokenUnavailable(
                "platform returned an empty token".to_string(),
            ));
        }
        Ok(token)
    }

    /// Registration body for `token` and `session` as they are right now.
    pub fn build_request(
        &self,
        token: &PushToken,
        session: Option<&SessionIdentity>,
    ) -> SaveTokenRequest {
        let identity = Identity::of(session);
        let (user_id, is_guest) = if self.options.include_identity {
            (identity.user_id().map(str::to_string), Some(identity.is_guest()))
        } else {
            (None, None)
        };

        SaveTokenRequest {
            token: token.as_str().to_string(),
            device_info: self.device.clone(),
            user_id,
            is_guest,
        }
    }

    /// Spawn a delivery chain for `token` and `session`, starting at `attempt`.
    ///
    /// The request is built before spawning; later session changes do not
    /// affect a chain already running.
    pub fn deliver(
        &self,
        token: &PushToken,
        session: Option<&SessionIdentity>,
        attempt: u32,
    ) -> JoinHandle<DeliveryOutcome> {
        let request = self.build_request(token, session);
        log::info!(
            "Delivering push token for {} (attempt {})",
            Identity::of(session),
            attempt
        );

        tokio::spawn(run_chain(
            Arc::clone(&self.registry),
            request,
            self.options.retry,
            attempt,
        ))
    }

    /// Run one refresh cycle.
    ///
    /// Timer and startup cycles deliver only when the token changed. A
    /// session change always delivers, falling back to the current token if
    /// the platform does not produce one.
    pub async fn refresh(&mut self, trigger: RefreshTrigger) -> RefreshOutcome {
        let acquired = self.acquire_token().await;

        let token = match (trigger, acquired) {
            (RefreshTrigger::SessionChanged, acquired) => {
                match acquired.or_else(|| self.current_token.clone()) {
                    Some(token) => token,
                    None => return RefreshOutcome::TokenUnavailable,
                }
            }
            (_, None) => return RefreshOutcome::TokenUnavailable,
            (_, Some(token)) if self.current_token.as_ref() == Some(&token) => {
                log::debug!("Push token unchanged on {trigger}; skipping delivery");
                return RefreshOutcome::Unchanged;
            }
            (_, Some(token)) => token,
        };

        if self.current_token.as_ref() != Some(&token) {
            log::info!("Push token updated on {trigger}");
            self.current_token = Some(token.clone());
        }

        RefreshOutcome::Delivering(self.deliver(&token, self.session.as_ref(), 0))
    }

    /// Record a new session and run a forced refresh.
    pub async fn on_session_change(&mut self, session: SessionIdentity) -> RefreshOutcome {
        log::info!("Session updated: {}", Identity::of(Some(&session)));
        self.session = Some(session);
        self.refresh(RefreshTrigger::SessionChanged).await
    }
}
