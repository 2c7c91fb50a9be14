//! Workflow status codes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// Lifecycle stage of a workflow, sent on the wire as its integer value.
///
/// Discriminants are part of the wire contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr)]
#[serde(into = "u8", try_from = "u8")]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum StatusCode {
    /// Workflow registered, not started.
    Created = 0,
    /// Workflow in progress.
    Running = 1,
    /// Workflow completed successfully.
    Finished = 2,
    /// Workflow completed with failures.
    Failed = 3,
    /// Workflow removed.
    Deleted = 4,
    /// Workflow stopped before completion.
    Stopped = 5,
    /// Workflow waiting for resources.
    Queued = 6,
    /// Workflow accepted, waiting to be scheduled.
    Pending = 7,
}

impl StatusCode {
    /// Returns the wire value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true if no further status is expected after this one.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Failed | Self::Deleted | Self::Stopped
        )
    }
}

impl From<StatusCode> for u8 {
    fn from(status: StatusCode) -> Self {
        status.as_u8()
    }
}

/// An integer that is not a known [`StatusCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status code {0}")]
pub struct UnknownStatusCode(pub u8);

impl TryFrom<u8> for StatusCode {
    type Error = UnknownStatusCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Created,
            1 => Self::Running,
            2 => Self::Finished,
            3 => Self::Failed,
            4 => Self::Deleted,
            5 => Self::Stopped,
            6 => Self::Queued,
            7 => Self::Pending,
            other => return Err(UnknownStatusCode(other)),
        })
    }
}
