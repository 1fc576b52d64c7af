//! Session identity reported by the embedded content.
//!
//! The content may send any JSON as its session. Only a truthy `user.id`
//! makes the session identified; every other shape is a guest.

use serde::Serialize;
use serde_json::Value;

/// Current authenticated user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    /// Present only when the reported session carried a usable user id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// User part of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    /// Server-side user id.
    pub id: String,
}

/// Who a token is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No session, or a session without a user id.
    Guest,
    /// Session with a user id.
    User(String),
}

impl Identity {
    /// Derive from an optional session.
    pub fn of(session: Option<&SessionIdentity>) -> Self {
        match session.and_then(SessionIdentity::user_id) {
            Some(id) => Self::User(id.to_string()),
            None => Self::Guest,
        }
    }

    /// Whether this is the guest identity.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// User id, when identified.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::User(id) => Some(id),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

impl SessionIdentity {
    /// Session for a known user.
    pub fn for_user(id: impl Into<String>) -> Self {
        Self {
            user: Some(SessionUser { id: id.into() }),
        }
    }

    /// Read a session from arbitrary JSON.
    ///
    /// `user.id` counts when it is truthy: a non-empty string, a non-zero
    /// number, `true`, or any object or array. Non-string ids are rendered as
    /// JSON text. `null`, `false`, `0` and `""` yield a guest session.
    pub fn from_value(value: &Value) -> Self {
        let id = value
            .get("user")
            .and_then(|user| user.get("id"))
            .and_then(truthy_id);

        Self {
            user: id.map(|id| SessionUser { id }),
        }
    }

    /// User id, when present.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }
}

fn truthy_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() > 0.0) => {
            Some(n.to_string())
        }
        Value::Bool(true) | Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        Value::Null | Value::Bool(false) | Value::String(_) | Value::Number(_) => None,
    }
}
