//! stdio transport for the MCP server.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)
//!
//! # Mailbox
//!
//! The server core is synchronous and sink-driven. The serve loop bridges
//! it to async stdio with a single-writer mailbox: the server's sink
//! enqueues outbound documents on an unbounded channel, and the loop
//! drains the channel to stdout after every processed line. Responses
//! therefore leave in processing order.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::mcp::server::{McpServer, MessageSink};

/// A stdio-based MCP transport.
///
/// Handles reading JSON-RPC messages from stdin and writing responses to
/// stdout.
pub struct StdioTransport {
    /// Buffered reader for stdin.
    reader: BufReader<tokio::io::Stdin>,
    /// Handle for stdout.
    writer: tokio::io::Stdout,
}

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
        }
    }

    /// Reads the next message line from stdin.
    ///
    /// Returns `None` if stdin is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // EOF - stdin closed
            return Ok(None);
        }

        // Remove the trailing newline
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a serialised JSON document to stdout with newline
    /// termination.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // MCP spec: messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a channel-backed [`MessageSink`] and the receiving half of its
/// mailbox.
///
/// Documents pushed into the sink are retrieved in order from the
/// receiver.
#[must_use]
pub fn channel_sink() -> (MessageSink, UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let sink: MessageSink = Box::new(move |msg: &str| {
        if tx.send(msg.to_string()).is_err() {
            tracing::warn!("Outbound mailbox closed, dropping response");
        }
    });
    (sink, rx)
}

/// Serves a server over stdio until EOF or a termination signal.
///
/// `rx` must be the receiving half paired with the server's sink (see
/// [`channel_sink`]); tool registration must be complete before calling.
///
/// # Errors
///
/// Returns an error if transport I/O fails.
pub async fn serve(mut server: McpServer, mut rx: UnboundedReceiver<String>) -> io::Result<()> {
    let mut transport = StdioTransport::new();

    tracing::info!(server = %server.info().name, "Serving MCP over stdio");
    serve_with_shutdown(&mut server, &mut transport, &mut rx).await
}

/// Runs the serve loop and handles shutdown signals.
#[cfg(unix)]
async fn serve_with_shutdown(
    server: &mut McpServer,
    transport: &mut StdioTransport,
    rx: &mut UnboundedReceiver<String>,
) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

    loop {
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, shutting down");
                return Ok(());
            }

            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down");
                return Ok(());
            }

            line_result = transport.read_line() => {
                if handle_line(server, transport, rx, line_result).await? {
                    return Ok(());
                }
            }
        }
    }
}

/// Runs the serve loop and handles shutdown signals.
#[cfg(windows)]
async fn serve_with_shutdown(
    server: &mut McpServer,
    transport: &mut StdioTransport,
    rx: &mut UnboundedReceiver<String>,
) -> io::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Received Ctrl+C, shutting down");
                return Ok(());
            }

            line_result = transport.read_line() => {
                if handle_line(server, transport, rx, line_result).await? {
                    return Ok(());
                }
            }
        }
    }
}

/// Processes one read result; drains the mailbox to stdout.
///
/// Returns `true` when the peer closed stdin.
async fn handle_line(
    server: &mut McpServer,
    transport: &mut StdioTransport,
    rx: &mut UnboundedReceiver<String>,
    line_result: io::Result<Option<String>>,
) -> io::Result<bool> {
    let Some(line) = line_result? else {
        tracing::info!("stdin closed, shutting down");
        return Ok(true);
    };

    if line.trim().is_empty() {
        return Ok(false);
    }

    server.parse_message(&line);

    while let Ok(response) = rx.try_recv() {
        transport.write_raw(&response).await?;
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::server::ServerInfo;

    #[test]
    fn transport_default() {
        // Just ensure Default is implemented and doesn't panic
        let _transport = StdioTransport::default();
    }

    #[tokio::test]
    async fn channel_sink_preserves_order() {
        let (mut sink, mut rx) = channel_sink();
        sink("first");
        sink("second");

        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        assert_eq!(rx.recv().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn responses_reach_mailbox_before_parse_returns() {
        let (sink, mut rx) = channel_sink();
        let mut server = McpServer::new(ServerInfo::new("Mailbox", "0.1.0"), sink);

        server.parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        let response = rx.try_recv().expect("response not enqueued");
        assert!(response.contains(r#""id":1"#));
    }
}
