//! Channel printing envelopes instead of publishing them.

use std::io::{self, Write};
use std::sync::Mutex;

use wfstatus_core::TransportError;
use wfstatus_core::transport::{Delivery, OutboundMessage, StatusChannel};

use crate::TRACING_TARGET_REPLAY;

/// Writes every payload as one JSON line.
///
/// Used by `--dry-run`; nothing reaches a broker.
#[derive(Debug)]
pub struct StdoutChannel<W = io::Stdout> {
    writer: Mutex<W>,
}

impl StdoutChannel {
    /// Creates a channel writing to the process stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> StdoutChannel<W>
where
    W: Write + Send,
{
    /// Creates a channel writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl<W> StatusChannel for StdoutChannel<W>
where
    W: Write + Send,
{
    async fn send(&self, message: OutboundMessage) -> Result<Delivery, TransportError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| TransportError::channel_closed("output writer poisoned"))?;

        writer
            .write_all(message.payload())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush())
            .map_err(|e| TransportError::channel_closed(e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_REPLAY,
            message_id = %message.message_id(),
            routing_key = %message.destination().routing_key,
            "printed status envelope"
        );
        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use wfstatus_core::transport::Destination;

    use super::*;

    fn message(body: &str) -> OutboundMessage {
        OutboundMessage::persistent(Destination::default(), body.as_bytes().to_vec().into())
    }

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let channel = StdoutChannel::new(Vec::new());

        for body in [r#"{"a":1}"#, r#"{"b":2}"#] {
            let delivery = channel.send(message(body)).await.unwrap();
            assert_eq!(delivery, Delivery::Sent);
        }

        let output = String::from_utf8(channel.into_inner()).unwrap();
        assert_eq!(output, "{\"a\":1}\n{\"b\":2}\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_errors_close_the_channel() {
        let channel = StdoutChannel::new(BrokenPipe);
        let error = channel.send(message("{}")).await.unwrap_err();
        assert!(error.is_channel_closed());
    }
}
