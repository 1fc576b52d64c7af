//! Notification service for hosts without an OS notification API.
//!
//! Token, device kind and permission outcome come from configuration.
//! Notification events are injected with [`HeadlessNotifications::emit`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::PlatformError;
use crate::platform::{
    AndroidChannel, NotificationEvent, NotificationService, PermissionStatus, Presentation,
    PushToken,
};

#[derive(Debug)]
struct HeadlessState {
    token: Option<PushToken>,
    permission: PermissionStatus,
    permission_requests: usize,
    presentation: Option<Presentation>,
    channels: Vec<AndroidChannel>,
    subscribers: Vec<mpsc::UnboundedSender<NotificationEvent>>,
}

/// Configurable [`NotificationService`].
#[derive(Debug)]
pub struct HeadlessNotifications {
    physical_device: bool,
    grant_on_request: bool,
    state: Mutex<HeadlessState>,
}

impl HeadlessNotifications {
    /// Service issuing `token`, with permission initially undetermined.
    pub fn new(token: Option<PushToken>, physical_device: bool, grant_on_request: bool) -> Self {
        Self {
            physical_device,
            grant_on_request,
            state: Mutex::new(HeadlessState {
                token,
                permission: PermissionStatus::Undetermined,
                permission_requests: 0,
                presentation: None,
                channels: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Service described by the `push_token`, `physical_device` and
    /// `grant_permission` settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.push_token.clone().map(PushToken::from),
            config.physical_device,
            config.grant_permission,
        )
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the token issued from now on (`None` makes issuance fail).
    pub fn set_token(&self, token: Option<PushToken>) {
        self.state().token = token;
    }

    /// Deliver `event` to every live subscriber. Returns how many got it.
    pub fn emit(&self, event: NotificationEvent) -> usize {
        let mut state = self.state();
        state
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        state.subscribers.len()
    }

    /// Presentation policy last set by the shell.
    pub fn presentation(&self) -> Option<Presentation> {
        self.state().presentation
    }

    /// Channels set up so far, in order.
    pub fn channels(&self) -> Vec<AndroidChannel> {
        self.state().channels.clone()
    }

    /// Number of permission prompts shown so far.
    pub fn permission_requests(&self) -> usize {
        self.state().permission_requests
    }
}

#[async_trait]
impl NotificationService for HeadlessNotifications {
    fn is_physical_device(&self) -> bool {
        self.physical_device
    }

    async fn permission_status(&self) -> Result<PermissionStatus, PlatformError> {
        Ok(self.state().permission)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        let mut state = self.state();
        state.permission_requests += 1;
        state.permission = if self.grant_on_request {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        log::debug!("Notification permission request -> {:?}", state.permission);
        Ok(state.permission)
    }

    async fn push_token(&self, project_id: &str) -> Result<PushToken, PlatformError> {
        self.state().token.clone().ok_or_else(|| {
            PlatformError::TokenUnavailable(format!("no push token configured for {project_id}"))
        })
    }

    async fn set_channel(&self, channel: &AndroidChannel) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.channels.retain(|c| c.id != channel.id);
        state.channels.push(channel.clone());
        Ok(())
    }

    async fn set_presentation(&self, presentation: Presentation) -> Result<(), PlatformError> {
        self.state().presentation = Some(presentation);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<NotificationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().subscribers.push(tx);
        rx
    }
}
