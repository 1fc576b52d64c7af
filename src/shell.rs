//! Shell event loop.
//!
//! One task drives everything: the periodic refresh timer, inbound content
//! messages, and platform notification events. Each handler runs to
//! completion before the next event is taken, so the pipeline's state is only
//! ever touched from here.
//!
//! ```text
//!            ┌──────── refresh timer (first tick at startup)
//!            │  ┌───── inbound content messages
//!            │  │  ┌── platform notification events
//!            ▼  ▼  ▼
//!          Shell::run ──► TokenPipeline ──► spawned delivery chains
//!               │
//!               └──► WebContent::post_message
//! ```
//!
//! Events are polled in priority order: shutdown, refresh timer, inbound
//! content, notification events.
//!
//! Teardown stops the timer and drops the notification subscription.
//! Delivery chains already spawned keep running.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::bridge::{InboundMessage, OutboundMessage, WebContent};
use crate::pipeline::{RefreshOutcome, RefreshTrigger, TokenPipeline};
use crate::platform::{NotificationEvent, NotificationService, Presentation};

/// The app shell around the embedded content.
pub struct Shell {
    pipeline: TokenPipeline,
    content: Arc<dyn WebContent>,
    notifications: Arc<dyn NotificationService>,
    refresh_interval: Duration,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("pipeline", &self.pipeline)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Wire a shell from its capabilities.
    pub fn new(
        pipeline: TokenPipeline,
        content: Arc<dyn WebContent>,
        notifications: Arc<dyn NotificationService>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            content,
            notifications,
            refresh_interval,
        }
    }

    /// The token pipeline.
    pub fn pipeline(&self) -> &TokenPipeline {
        &self.pipeline
    }

    /// Handle one raw inbound payload from the content.
    ///
    /// Malformed payloads are logged and dropped.
    pub async fn handle_inbound(&mut self, raw: &str) -> Option<RefreshOutcome> {
        match InboundMessage::parse(raw) {
            Ok(Some(message)) => self.handle_message(message).await,
            Ok(None) => None,
            Err(e) => {
                log::warn!("Dropping inbound message: {e}");
                None
            }
        }
    }

    /// Handle one parsed inbound message.
    ///
    /// Returns the refresh outcome when the message started a refresh cycle.
    pub async fn handle_message(&mut self, message: InboundMessage) -> Option<RefreshOutcome> {
        log::debug!("Inbound {}", message.kind());
        match message {
            InboundMessage::GetPushToken => {
                let token = self
                    .pipeline
                    .current_token()
                    .map(|t| t.as_str().to_string());
                self.post(&OutboundMessage::PushToken { token }).await;
                None
            }
            InboundMessage::SessionUpdate { session } => {
                Some(self.pipeline.on_session_change(session).await)
            }
        }
    }

    /// Forward a platform notification event into the content.
    pub async fn forward_notification(&self, event: NotificationEvent) {
        let message = match event {
            NotificationEvent::Received(notification) => {
                log::info!("Notification received: {notification}");
                OutboundMessage::NotificationReceived { notification }
            }
            NotificationEvent::Response(response) => {
                log::info!("Notification response: {response}");
                OutboundMessage::NotificationResponse { response }
            }
        };
        self.post(&message).await;
    }

    async fn post(&self, message: &OutboundMessage) {
        if let Err(e) = self.content.post_message(message).await {
            log::warn!("Failed to post message to content: {e}");
        }
    }

    /// Run until `shutdown` resolves or the inbound stream closes.
    pub async fn run<F>(mut self, mut inbound: mpsc::Receiver<String>, shutdown: F) -> Self
    where
        F: Future<Output = ()>,
    {
        if let Err(e) = self
            .notifications
            .set_presentation(Presentation::foreground())
            .await
        {
            log::warn!("Failed to set notification presentation: {e}");
        }
        let mut events = self.notifications.subscribe();

        let mut refresh = tokio::time::interval(self.refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger = RefreshTrigger::Startup;

        tokio::pin!(shutdown);
        log::info!("Shell started (refresh every {:?})", self.refresh_interval);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    log::info!("Shutdown requested");
                    break;
                }
                _ = refresh.tick() => {
                    let outcome = self.pipeline.refresh(trigger).await;
                    log_refresh(trigger, &outcome);
                    trigger = RefreshTrigger::Timer;
                }
                raw = inbound.recv() => {
                    let Some(raw) = raw else {
                        log::info!("Content channel closed");
                        break;
                    };
                    if let Some(outcome) = self.handle_inbound(&raw).await {
                        log_refresh(RefreshTrigger::SessionChanged, &outcome);
                    }
                }
                Some(event) = events.recv() => {
                    self.forward_notification(event).await;
                }
            }
        }

        drop(refresh);
        drop(events);
        log::info!("Shell stopped");
        self
    }
}

fn log_refresh(trigger: RefreshTrigger, outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::TokenUnavailable => log::info!("Refresh ({trigger}): no push token"),
        RefreshOutcome::Unchanged => log::debug!("Refresh ({trigger}): token unchanged"),
        RefreshOutcome::Delivering(_) => log::info!("Refresh ({trigger}): delivering token"),
    }
}
