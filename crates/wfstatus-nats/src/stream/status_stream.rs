//! Status stream configuration for NATS JetStream.

use std::time::Duration;

use wfstatus_core::transport::STATUS_QUEUE;

/// Marker trait for status streams.
///
/// This trait defines the configuration for a NATS JetStream stream that
/// stores status messages.
pub trait StatusStream: Clone + Send + Sync + 'static {
    /// Stream name used in NATS JetStream.
    const NAME: &'static str;

    /// Subject bound to this stream; the queue name on the default exchange.
    const SUBJECT: &'static str;

    /// Maximum age for messages in this stream.
    /// Returns `None` for streams where messages should not expire.
    const MAX_AGE: Option<Duration>;

    /// Subjects the stream captures: the queue itself and the same queue
    /// behind any named exchange.
    fn subjects() -> Vec<String> {
        vec![Self::SUBJECT.to_owned(), format!("*.{}", Self::SUBJECT)]
    }

    /// Returns true if a message published on `subject` is stored by this stream.
    fn captures(subject: &str) -> bool {
        Self::subjects()
            .iter()
            .any(|pattern| subject_matches(pattern, subject))
    }
}

/// Matches a subject against a NATS subject pattern.
///
/// `*` matches exactly one token and a trailing `>` matches one or more.
pub fn subject_matches(pattern: &str, subject: &str) -> bool {
    let mut tokens = subject.split('.');

    for expected in pattern.split('.') {
        match (expected, tokens.next()) {
            (">", Some(token)) => return !token.is_empty(),
            ("*", Some(token)) if !token.is_empty() => {}
            (expected, Some(token)) if expected == token => {}
            _ => return false,
        }
    }

    tokens.next().is_none()
}

/// Stream for the `jobs-status` queue.
///
/// Messages expire after 7 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JobsStatusStream;

impl StatusStream for JobsStatusStream {
    const MAX_AGE: Option<Duration> = Some(Duration::from_secs(7 * 24 * 60 * 60));
    const NAME: &'static str = "JOBS_STATUS";
    const SUBJECT: &'static str = STATUS_QUEUE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_status_stream() {
        assert_eq!(JobsStatusStream::NAME, "JOBS_STATUS");
        assert_eq!(JobsStatusStream::SUBJECT, "jobs-status");
        assert_eq!(
            JobsStatusStream::MAX_AGE,
            Some(Duration::from_secs(7 * 24 * 60 * 60))
        );
    }

    #[test]
    fn test_jobs_status_subjects() {
        assert_eq!(
            JobsStatusStream::subjects(),
            vec!["jobs-status".to_string(), "*.jobs-status".to_string()]
        );
    }

    #[test]
    fn test_subject_matches() {
        assert!(subject_matches("jobs-status", "jobs-status"));
        assert!(subject_matches("*.jobs-status", "reana.jobs-status"));
        assert!(subject_matches("events.>", "events.a.b"));

        assert!(!subject_matches("jobs-status", "status-updates"));
        assert!(!subject_matches("*.jobs-status", "a.b.jobs-status"));
        assert!(!subject_matches("*.jobs-status", ".jobs-status"));
        assert!(!subject_matches("events.>", "events"));
        assert!(!subject_matches("jobs-status", "jobs-status.extra"));
    }

    #[test]
    fn test_jobs_status_captures() {
        assert!(JobsStatusStream::captures("jobs-status"));
        assert!(JobsStatusStream::captures("reana.jobs-status"));
        assert!(!JobsStatusStream::captures("status-updates"));
        assert!(!JobsStatusStream::captures("a.b.jobs-status"));
    }
}
