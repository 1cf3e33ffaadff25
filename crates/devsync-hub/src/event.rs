//! Event records pushed to subscribers.

use crate::error::HubError;
use serde::{Deserialize, Serialize};

/// Well-known event kinds.
pub mod kinds {
    /// A tracked repository changed (the original deploy notification).
    pub const REPO_UPDATE: &str = "repo-update";
    /// A deployment changed state.
    pub const DEPLOY: &str = "deploy";
    /// An incident was opened or changed.
    pub const INCIDENT: &str = "incident";
    /// Reserved for the connection greeting; producers may not use it.
    pub const INFO: &str = "info";
}

/// Message carried by the greeting every subscriber receives first.
pub const WELCOME_MESSAGE: &str = "Connected to DevSync live event stream";

/// A lifecycle event as delivered to subscribers.
///
/// Serialises as `{"type", "repo", "event", "timestamp"}`, the record shape
/// the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "repo")]
    pub subject: String,
    #[serde(rename = "event")]
    pub detail: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
}

impl Event {
    /// Creates an event stamped with the current time.
    pub fn now(
        kind: impl Into<String>,
        subject: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            subject: subject.into(),
            detail: detail.into(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Body of a producer's emit request.
#[derive(Debug, Clone, Deserialize)]
pub struct EmitRequest {
    pub kind: String,
    pub subject: String,
    pub detail: String,
}

impl EmitRequest {
    /// Validates the request and stamps it into an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MalformedEvent`] when a field is blank or the
    /// reserved `info` kind is used.
    pub fn into_event(self) -> Result<Event, HubError> {
        for (field, value) in [
            ("kind", &self.kind),
            ("subject", &self.subject),
            ("detail", &self.detail),
        ] {
            if value.trim().is_empty() {
                return Err(HubError::MalformedEvent(format!("{field} must not be empty")));
            }
        }
        if self.kind.trim() == kinds::INFO {
            return Err(HubError::MalformedEvent(format!(
                "kind `{}` is reserved",
                kinds::INFO
            )));
        }

        Ok(Event::now(
            self.kind.trim(),
            self.subject.trim(),
            self.detail.trim(),
        ))
    }
}

/// Greeting sent once to every new subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "info")]
pub struct Welcome {
    pub message: String,
}

impl Default for Welcome {
    fn default() -> Self {
        Self {
            message: WELCOME_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_dashboard_field_names() {
        let event = Event {
            kind: kinds::REPO_UPDATE.to_string(),
            subject: "checkout".to_string(),
            detail: "deployed".to_string(),
            timestamp: "2025-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "repo-update",
                "repo": "checkout",
                "event": "deployed",
                "timestamp": "2025-01-01T00:00:00.000Z",
            })
        );
    }

    #[test]
    fn welcome_is_tagged_info() {
        let json = serde_json::to_value(Welcome::default()).unwrap();
        assert_eq!(json["type"], "info");
        assert_eq!(json["message"], WELCOME_MESSAGE);
    }

    #[test]
    fn timestamp_is_utc_rfc3339() {
        let event = Event::now(kinds::DEPLOY, "svc", "running");
        assert!(event.timestamp.ends_with('Z'), "got {}", event.timestamp);
        chrono::DateTime::parse_from_rfc3339(&event.timestamp).expect("valid RFC 3339");
    }

    #[test]
    fn emit_request_is_trimmed_and_stamped() {
        let event = EmitRequest {
            kind: " incident ".to_string(),
            subject: "billing".to_string(),
            detail: "opened".to_string(),
        }
        .into_event()
        .unwrap();
        assert_eq!(event.kind, "incident");
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn emit_request_rejects_blank_fields() {
        let err = EmitRequest {
            kind: "deploy".to_string(),
            subject: "   ".to_string(),
            detail: "done".to_string(),
        }
        .into_event()
        .unwrap_err();
        assert!(matches!(err, HubError::MalformedEvent(msg) if msg.contains("subject")));
    }

    #[test]
    fn emit_request_rejects_reserved_kind() {
        let err = EmitRequest {
            kind: "info".to_string(),
            subject: "svc".to_string(),
            detail: "spoofed".to_string(),
        }
        .into_event()
        .unwrap_err();
        assert!(matches!(err, HubError::MalformedEvent(_)));
    }
}
