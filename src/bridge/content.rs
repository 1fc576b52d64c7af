//! What the host web view loads.

use serde::Serialize;

/// Script injected into the page.
///
/// Re-posts `SESSION_UPDATE` window messages to the native bridge so the
/// page can report its session with a plain `window.postMessage`.
pub const INJECTED_SCRIPT: &str = r"window.addEventListener('message', function(event) {
  if (event.data && event.data.type === 'SESSION_UPDATE') {
    window.ReactNativeWebView.postMessage(JSON.stringify(event.data));
  }
});";

/// Page and script handed to the host's web view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    /// Page to display full-screen.
    pub uri: String,
    /// Script evaluated after the page loads.
    pub injected_java_script: String,
}

impl ContentDescriptor {
    /// Descriptor for `uri` with the standard session relay script.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            injected_java_script: INJECTED_SCRIPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_json_shape() {
        let json = serde_json::to_value(ContentDescriptor::new("https://example.com/")).unwrap();
        assert_eq!(json["uri"], "https://example.com/");
        assert!(json["injectedJavaScript"]
            .as_str()
            .unwrap()
            .contains("SESSION_UPDATE"));
    }
}
