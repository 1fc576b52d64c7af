//! Headless host implementations of the shell's capabilities.
//!
//! - [`StdioContent`] - embedded content reached over JSON lines
//! - [`HeadlessNotifications`] - notification service driven by configuration

pub mod headless;
pub mod stdio;

pub use headless::HeadlessNotifications;
pub use stdio::{spawn_line_reader, LineContent, StdioContent};
