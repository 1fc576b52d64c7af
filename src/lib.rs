//! sharepush - app shell around the share-push web content.
//!
//! The shell embeds the web content, keeps the server's push token
//! registration current, and relays notification events into the content.
//!
//! # Architecture
//!
//! ```text
//!  NotificationService ──► TokenPipeline ──► TokenRegistry (HTTP)
//!          │                     ▲
//!          │ events              │ session changes
//!          ▼                     │
//!        Shell ◄──── WebContent (JSON message bridge)
//! ```
//!
//! - **Shell** - single event loop; owns the pipeline
//! - **TokenPipeline** - token acquisition, change detection, delivery
//! - **Bridge** - message protocol between shell and content
//! - **Host** - headless implementations of the capabilities
//!
//! # Modules
//!
//! - [`pipeline`] - token refresh and retrying delivery
//! - [`registry`] - token registration endpoint client
//! - [`bridge`] - content message protocol
//! - [`config`] - configuration loading/saving

pub mod bridge;
pub mod host;
pub mod pipeline;
pub mod platform;
pub mod registry;
pub mod shell;

pub mod config;
pub mod constants;
pub mod device;
pub mod env;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use bridge::{ContentDescriptor, InboundMessage, OutboundMessage, WebContent};
pub use config::Config;
pub use device::DeviceInfo;
pub use pipeline::{DeliveryOutcome, PipelineOptions, RefreshOutcome, RetryPolicy, TokenPipeline};
pub use platform::{NotificationService, PushToken};
pub use registry::{HttpTokenRegistry, TokenRegistry};
pub use session::SessionIdentity;
pub use shell::Shell;
