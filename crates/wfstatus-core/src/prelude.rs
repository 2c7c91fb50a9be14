//! Prelude module for wfstatus-core.
//!
//! Re-exports the types needed to wire a workflow engine to a status channel
//! with a single `use` statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use wfstatus_core::prelude::*;
//!
//! let mut tracker = StatusTracker::new("abc-123", channel);
//! tracker.track(&snapshot).await?;
//! ```

// Snapshot types
pub use crate::snapshot::{
    Edge, GraphSnapshot, JsonSnapshot, Node, NodeMetadata, ProgressCounters, SerializedDocument,
    SnapshotSource, StructureDocument, WorkflowSnapshot, render,
};
// Envelope types
pub use crate::envelope::{StatusCode, StatusEnvelope, StatusNote};
// Transport types
pub use crate::transport::{
    Delivery, Destination, OutboundMessage, STATUS_QUEUE, StatusChannel, publish,
};
// Tracker types
pub use crate::tracker::{StatusTracker, TrackerConfig, TrackerState};
// Error types
pub use crate::{Error, LifecycleError, Result, SerializationError, TransportError};
