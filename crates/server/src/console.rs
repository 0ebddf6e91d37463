use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use stockbot_slack::{
    blocks::MessageTemplate,
    commands::{parse_console_line, CommandParseError, SlashCommandPayload},
    events::{SlackEnvelope, SlackEvent},
    socket::{SocketTransport, TransportError},
};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin, Stdout,
};
use tokio::sync::Mutex;
use tracing::info;

/// Local transport: one slash command per input line, replies written back
/// as plain text.
///
/// ```text
/// /add_product Widget 2 A1 A2
/// /ship_product Widget 1
/// /check_inventory
/// ```
///
/// Blank lines and lines starting with `#` are skipped.
pub struct ConsoleTransport<R, W> {
    lines: Mutex<Lines<R>>,
    writer: Mutex<W>,
    sequence: AtomicU64,
}

impl ConsoleTransport<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { lines: Mutex::new(reader.lines()), writer: Mutex::new(writer), sequence: AtomicU64::new(0) }
    }

    fn next_envelope_id(&self) -> String {
        format!("console-{}", self.sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn write_line(&self, text: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

#[async_trait]
impl<R, W> SocketTransport for ConsoleTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn mode(&self) -> &'static str {
        "console"
    }

    async fn connect(&self) -> Result<(), TransportError> {
        info!(
            event_name = "ingress.console.ready",
            correlation_id = "bootstrap",
            "console transport reading commands from stdin"
        );
        Ok(())
    }

    async fn next_envelope(&self) -> Result<Option<SlackEnvelope>, TransportError> {
        let mut lines = self.lines.lock().await;
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|error| TransportError::Receive(error.to_string()))?;
            let Some(line) = line else {
                return Ok(None);
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let envelope_id = self.next_envelope_id();
            let payload = match parse_console_line(trimmed, envelope_id.clone()) {
                Ok(payload) => payload,
                // Unknown commands still travel as envelopes so the handler can answer them.
                Err(CommandParseError::UnsupportedCommand(command)) => {
                    SlashCommandPayload::new(command, envelope_id.clone())
                }
                Err(error) => return Err(TransportError::Receive(error.to_string())),
            };

            return Ok(Some(SlackEnvelope { envelope_id, event: SlackEvent::SlashCommand(payload) }));
        }
    }

    async fn acknowledge(&self, _envelope_id: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_reply(
        &self,
        _envelope_id: &str,
        message: &MessageTemplate,
    ) -> Result<(), TransportError> {
        self.write_line(&message.fallback_text)
            .await
            .map_err(|error| TransportError::Reply(error.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.flush().await.map_err(|error| TransportError::Disconnect(error.to_string()))
    }
}
