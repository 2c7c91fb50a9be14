#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for snapshot rendering.
///
/// Use this target for logging reference resolution and canonicalization.
pub const TRACING_TARGET_SERIALIZER: &str = "wfstatus_core::serializer";

/// Tracing target for envelope transport.
///
/// Use this target for logging outbound messages and delivery outcomes.
pub const TRACING_TARGET_TRANSPORT: &str = "wfstatus_core::transport";

/// Tracing target for tracker lifecycle calls.
pub const TRACING_TARGET_TRACKER: &str = "wfstatus_core::tracker";

mod error;

pub mod envelope;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod prelude;
pub mod snapshot;
pub mod tracker;
pub mod transport;

pub use error::{Error, LifecycleError, LifecycleOperation, Result, SerializationError};
pub use transport::TransportError;
