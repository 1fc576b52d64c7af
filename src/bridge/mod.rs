//! Message bridge between the shell and the embedded web content.
//!
//! # Architecture
//!
//! ```text
//! embedded page ──(JSON string)──► InboundMessage::parse ──► Shell
//! Shell ──► OutboundMessage ──► WebContent::post_message ──► embedded page
//! ```
//!
//! The page is an opaque collaborator; the [`WebContent`] trait is the only
//! way the shell reaches it. Hosts implement it over whatever web view they
//! embed (see [`crate::host::StdioContent`] for the headless one).

pub mod content;
pub mod message;

use async_trait::async_trait;

pub use content::{ContentDescriptor, INJECTED_SCRIPT};
pub use message::{InboundMessage, OutboundMessage};

use crate::error::BridgeError;

/// Outbound side of the embedded content.
#[async_trait]
pub trait WebContent: Send + Sync {
    /// Post one message into the page.
    async fn post_message(&self, message: &OutboundMessage) -> Result<(), BridgeError>;
}
