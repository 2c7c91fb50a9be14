//! Lifecycle-driven status tracker.
//!
//! The workflow engine calls [`StatusTracker::initialize`] when the workflow
//! starts, [`StatusTracker::track`] after each progress step and
//! [`StatusTracker::finalize`] once it completes. Every call renders the
//! snapshot it is given and publishes exactly one envelope.

mod config;

pub use config::TrackerConfig;

use crate::envelope::{StatusCode, StatusEnvelope, StatusNote};
use crate::snapshot::{SnapshotSource, render};
use crate::transport::{Delivery, Destination, StatusChannel, publish_to};
use crate::{LifecycleError, LifecycleOperation, Result, TRACING_TARGET_TRACKER};

/// Tracker lifecycle state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// No report sent yet.
    #[default]
    Created,
    /// At least one report sent, workflow still running.
    Active,
    /// Final report sent; further calls are rejected.
    Terminated,
}

/// Publishes workflow status envelopes over a caller-supplied channel.
///
/// Lifecycle calls take `&mut self`: a tracker reports for one workflow and
/// its calls happen one at a time.
#[derive(Debug)]
pub struct StatusTracker<C> {
    workflow_uuid: String,
    channel: C,
    destination: Destination,
    state: TrackerState,
}

impl<C> StatusTracker<C>
where
    C: StatusChannel,
{
    /// Creates a tracker publishing to the `jobs-status` queue.
    pub fn new(workflow_uuid: impl Into<String>, channel: C) -> Self {
        let workflow_uuid = workflow_uuid.into();
        tracing::info!(
            target: TRACING_TARGET_TRACKER,
            workflow_uuid = %workflow_uuid,
            "initializing workflow status tracker"
        );

        Self {
            workflow_uuid,
            channel,
            destination: Destination::default(),
            state: TrackerState::Created,
        }
    }

    /// Creates a tracker from configuration.
    pub fn from_config(config: &TrackerConfig, channel: C) -> Self {
        Self::new(config.workflow_uuid.clone(), channel).with_destination(config.destination())
    }

    /// Overrides the destination.
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Identifier of the tracked workflow.
    #[inline]
    pub fn workflow_uuid(&self) -> &str {
        &self.workflow_uuid
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Destination of published envelopes.
    #[inline]
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Returns the underlying channel.
    #[inline]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Reports that the workflow started.
    ///
    /// Publishes the same envelope [`track`](Self::track) would.
    pub async fn initialize<S>(&mut self, source: &S) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.initialize_with(source, StatusNote::new()).await
    }

    /// Like [`initialize`](Self::initialize), with caller-supplied logs and message.
    pub async fn initialize_with<S>(&mut self, source: &S, note: StatusNote) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.report(LifecycleOperation::Initialize, source, note)
            .await
    }

    /// Reports progress with a running status.
    pub async fn track<S>(&mut self, source: &S) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.track_with(source, StatusNote::new()).await
    }

    /// Reports progress with caller-supplied logs and message.
    pub async fn track_with<S>(&mut self, source: &S, note: StatusNote) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.report(LifecycleOperation::Track, source, note).await
    }

    /// Sends the final report and terminates the tracker.
    ///
    /// The status is [`StatusCode::Failed`] if any node failed and
    /// [`StatusCode::Finished`] otherwise. If rendering or publishing fails,
    /// the tracker stays active so the call can be retried.
    pub async fn finalize<S>(&mut self, source: &S) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.finalize_with(source, StatusNote::new()).await
    }

    /// Like [`finalize`](Self::finalize), with caller-supplied logs and message.
    pub async fn finalize_with<S>(&mut self, source: &S, note: StatusNote) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        self.report(LifecycleOperation::Finalize, source, note)
            .await
    }

    async fn report<S>(
        &mut self,
        operation: LifecycleOperation,
        source: &S,
        note: StatusNote,
    ) -> Result<Delivery>
    where
        S: SnapshotSource + ?Sized,
    {
        if self.state == TrackerState::Terminated {
            tracing::warn!(
                target: TRACING_TARGET_TRACKER,
                workflow_uuid = %self.workflow_uuid,
                operation = %operation,
                "lifecycle call after finalize"
            );
            return Err(LifecycleError::terminated(&self.workflow_uuid, operation).into());
        }

        tracing::info!(
            target: TRACING_TARGET_TRACKER,
            workflow_uuid = %self.workflow_uuid,
            operation = %operation,
            "sending progress information"
        );

        let document = render(source)?;
        let progress = document.progress();
        if !progress.is_consistent() {
            tracing::warn!(
                target: TRACING_TARGET_TRACKER,
                workflow_uuid = %self.workflow_uuid,
                planned = progress.planned,
                submitted = progress.submitted,
                succeeded = progress.succeeded,
                failed = progress.failed,
                "inconsistent progress counters"
            );
        }

        let status = match operation {
            LifecycleOperation::Finalize if progress.has_failures() => StatusCode::Failed,
            LifecycleOperation::Finalize => StatusCode::Finished,
            LifecycleOperation::Initialize | LifecycleOperation::Track => StatusCode::Running,
        };

        let envelope = StatusEnvelope::new(&self.workflow_uuid, status, &document, note);

        tracing::info!(
            target: TRACING_TARGET_TRACKER,
            workflow_uuid = %self.workflow_uuid,
            status = %status,
            digest = %document.digest(),
            message = envelope.message().unwrap_or_default(),
            "publishing workflow status"
        );

        let delivery = publish_to(&self.channel, &self.destination, &envelope).await?;

        self.state = match operation {
            LifecycleOperation::Finalize => TrackerState::Terminated,
            LifecycleOperation::Initialize | LifecycleOperation::Track => TrackerState::Active,
        };

        Ok(delivery)
    }
}
