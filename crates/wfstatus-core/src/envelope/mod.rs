//! Status envelopes: the unit published to the status queue.

mod status;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub use status::{StatusCode, UnknownStatusCode};

use crate::snapshot::{ProgressCounters, SerializedDocument, StructureDocument};

/// Free-text fields attached to a status report.
///
/// Left empty, the tracker sends empty logs and a timestamped placeholder
/// message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusNote {
    /// Log excerpt sent in the `logs` field.
    pub logs: String,
    /// Human-readable message, replacing the placeholder when set.
    pub message: Option<String>,
}

impl StatusNote {
    /// Creates an empty note.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log excerpt.
    #[must_use]
    pub fn with_logs(mut self, logs: impl Into<String>) -> Self {
        self.logs = logs.into();
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Placeholder message used when the caller supplies none.
pub fn default_message(at: Timestamp) -> String {
    format!("this is a tracking log at {at}")
}

/// Wire-level status message.
///
/// Built fresh for every publish and never changed afterwards; fields are
/// only readable. Serializes to
/// `{"workflow_uuid", "logs", "status", "message", "progress", "structure"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    workflow_uuid: String,
    logs: String,
    status: StatusCode,
    message: Option<String>,
    progress: ProgressCounters,
    structure: StructureDocument,
}

impl StatusEnvelope {
    /// Builds an envelope from a rendered snapshot.
    ///
    /// A missing message is replaced with [`default_message`] for the current
    /// time.
    pub fn new(
        workflow_uuid: impl Into<String>,
        status: StatusCode,
        document: &SerializedDocument,
        note: StatusNote,
    ) -> Self {
        let message = note
            .message
            .unwrap_or_else(|| default_message(Timestamp::now()));

        Self {
            workflow_uuid: workflow_uuid.into(),
            logs: note.logs,
            status,
            message: Some(message),
            progress: document.progress(),
            structure: document.structure(),
        }
    }

    /// Identifier of the tracked workflow.
    #[inline]
    pub fn workflow_uuid(&self) -> &str {
        &self.workflow_uuid
    }

    /// Log excerpt.
    #[inline]
    pub fn logs(&self) -> &str {
        &self.logs
    }

    /// Lifecycle status.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Progress counters of the snapshot.
    #[inline]
    pub fn progress(&self) -> ProgressCounters {
        self.progress
    }

    /// Structure document of the snapshot.
    #[inline]
    pub fn structure(&self) -> &StructureDocument {
        &self.structure
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::snapshot::render;

    fn document() -> SerializedDocument {
        render(&json!({
            "progress": {"planned": 3, "submitted": 2, "succeeded": 1, "failed": 0},
            "graph": {
                "nodes": [
                    {"nodeid": "1234", "metadata": {"name": "selection"}, "jobid": null},
                    {"nodeid": "9876", "metadata": {"name": "fitting"}, "jobid": "job-12345"}
                ],
                "edges": [{"from": "1234", "to": "9876"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_wire_format() {
        let note = StatusNote::new().with_logs("step 1 done").with_message("running");
        let envelope = StatusEnvelope::new("abc-123", StatusCode::Running, &document(), note);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["workflow_uuid"], "abc-123");
        assert_eq!(value["logs"], "step 1 done");
        assert_eq!(value["status"], 1);
        assert_eq!(value["message"], "running");
        assert_eq!(
            value["progress"],
            json!({"planned": 3, "submitted": 2, "succeeded": 1, "failed": 0})
        );
        assert_eq!(value["structure"]["type"], "yadage");
        assert_eq!(value["structure"]["graph"]["nodes"][1]["jobid"], "job-12345");
    }

    #[test]
    fn test_default_message_is_timestamped() {
        let envelope =
            StatusEnvelope::new("abc-123", StatusCode::Running, &document(), StatusNote::new());

        assert_eq!(envelope.logs(), "");
        let message = envelope.message().unwrap();
        let stamp = message.strip_prefix("this is a tracking log at ").unwrap();
        assert!(stamp.parse::<Timestamp>().is_ok());
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope =
            StatusEnvelope::new("abc-123", StatusCode::Finished, &document(), StatusNote::new());
        let bytes = serde_json::to_vec(&envelope).unwrap();
        let parsed: StatusEnvelope = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(parsed, envelope);
        assert_eq!(parsed.progress(), ProgressCounters::new(3, 2, 1, 0));
    }
}
