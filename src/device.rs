//! Host device metadata attached to every token registration.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Operating system identifier (`ios`, `android`, `linux`, ...).
    pub os: String,
    /// Human-readable device model.
    pub model: String,
}

impl DeviceInfo {
    /// Snapshot with an explicit model.
    pub fn new(os: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            model: model.into(),
        }
    }

    /// Detect the current host.
    ///
    /// `model_override` wins when set. Otherwise the DMI product name is used
    /// on Linux, then the hostname, then `"unknown"`.
    pub fn detect(model_override: Option<&str>) -> Self {
        let model = model_override
            .map(str::to_string)
            .or_else(dmi_product_name)
            .or_else(host_name)
            .unwrap_or_else(|| "unknown".to_string());

        Self::new(std::env::consts::OS, model)
    }

    /// Whether this is the Android platform.
    pub fn is_android(&self) -> bool {
        self.os.eq_ignore_ascii_case("android")
    }
}

#[cfg(target_os = "linux")]
fn dmi_product_name() -> Option<String> {
    std::fs::read_to_string("/sys/devices/virtual/dmi/id/product_name")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(not(target_os = "linux"))]
fn dmi_product_name() -> Option<String> {
    None
}

fn host_name() -> Option<String> {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.is_empty())
}
