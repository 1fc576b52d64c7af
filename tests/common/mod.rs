//! Shared fakes for the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sharepush::error::{BridgeError, DeliveryError};
use sharepush::host::HeadlessNotifications;
use sharepush::registry::{SaveTokenRequest, SaveTokenResponse};
use sharepush::{
    DeviceInfo, OutboundMessage, PipelineOptions, PushToken, RetryPolicy, TokenPipeline,
    TokenRegistry, WebContent,
};

/// Web content that records every posted message.
#[derive(Default)]
pub struct RecordingContent {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl RecordingContent {
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebContent for RecordingContent {
    async fn post_message(&self, message: &OutboundMessage) -> Result<(), BridgeError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Registry that records every request and rejects the first `failures`.
#[derive(Default)]
pub struct RecordingRegistry {
    requests: Mutex<Vec<SaveTokenRequest>>,
    failures: Mutex<usize>,
}

impl RecordingRegistry {
    pub fn failing(failures: usize) -> Self {
        Self {
            requests: Mutex::default(),
            failures: Mutex::new(failures),
        }
    }

    pub fn requests(&self) -> Vec<SaveTokenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRegistry for RecordingRegistry {
    async fn save_token(
        &self,
        request: &SaveTokenRequest,
    ) -> Result<SaveTokenResponse, DeliveryError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(DeliveryError::Status {
                status: 500,
                body: String::new(),
            });
        }
        Ok(SaveTokenResponse {
            message: Some("ok".to_string()),
        })
    }
}

/// Physical device that grants permission and issues `token`.
pub fn notifications(token: Option<&str>) -> Arc<HeadlessNotifications> {
    Arc::new(HeadlessNotifications::new(
        token.map(PushToken::from),
        true,
        true,
    ))
}

/// Pipeline options with a short retry delay for real-time tests.
pub fn fast_options() -> PipelineOptions {
    PipelineOptions {
        project_id: "test-project".to_string(),
        retry: RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(20),
        },
        include_identity: false,
    }
}

pub fn test_device() -> DeviceInfo {
    DeviceInfo::new("ios", "iPhone 15")
}

pub fn pipeline(
    registry: Arc<dyn TokenRegistry>,
    notifications: Arc<HeadlessNotifications>,
) -> TokenPipeline {
    TokenPipeline::new(registry, notifications, test_device(), fast_options())
}
