//! Transport layer for serving MCP over stdin/stdout
//!
//! The server speaks newline-delimited JSON-RPC: each line on the input is one
//! message, each message written to the output is one line. Standard output is
//! reserved for protocol traffic, so diagnostics must go to stderr.
//!
//! ```no_run
//! use hitl_mcp::mcp::transport::{MCPTransport, StdioConfig, StdioServerTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut transport = StdioServerTransport::new(StdioConfig::default());
//! let streams = transport.connect().await?;
//! // hand the streams to an MCPServerHandler
//! # drop(streams);
//! # Ok(())
//! # }
//! ```
//!
//! Transports follow a connect / communicate / disconnect lifecycle. `connect()`
//! spawns one reader task and one writer task and returns the channel-backed
//! streams; `disconnect()` stops the reader and waits until the writer has
//! flushed every queued message.

use crate::mcp::error::MCPOperationError;
use crate::mcp::types::MCPMessage;
use async_trait::async_trait;
use futures::sink::Sink;
use futures::stream::Stream;
use std::pin::Pin;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Type alias for message streams
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<MCPMessage, MCPOperationError>> + Send>>;
pub type MessageSink = Pin<Box<dyn Sink<MCPMessage, Error = MCPOperationError> + Send>>;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Transport connection result containing read and write streams
pub struct TransportStreams {
    /// Messages arriving from the MCP client
    pub read_stream: MessageStream,
    /// Sink for messages going back to the MCP client
    pub write_stream: MessageSink,
}

// Manual Debug implementation since streams are not easily debuggable
impl std::fmt::Debug for TransportStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportStreams")
            .field("read_stream", &"<message_stream>")
            .field("write_stream", &"<message_sink>")
            .finish()
    }
}

/// Core trait for MCP transport implementations
#[async_trait]
pub trait MCPTransport: Send + Sync {
    /// Establish the channel and return communication streams
    ///
    /// # Errors
    ///
    /// - `StdioError` - the underlying handles are unavailable
    /// - `InvalidRequest` - the transport was already connected
    async fn connect(&mut self) -> Result<TransportStreams, MCPOperationError>;

    /// Stop background tasks and release the channel
    async fn disconnect(&mut self) -> Result<(), MCPOperationError>;

    /// Check current connection status
    fn is_connected(&self) -> bool;

    /// Get transport metadata
    fn transport_info(&self) -> TransportInfo;
}

/// Metadata about a transport's configuration
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Type of transport (e.g., "stdio")
    pub transport_type: String,
    /// Connection endpoint or identifier
    pub endpoint: String,
    /// Maximum message size supported (if any)
    pub max_message_size: Option<usize>,
}

/// Configuration for the stdio server transport
#[derive(Debug, Clone)]
pub struct StdioConfig {
    /// Maximum accepted line length in bytes
    pub max_message_size: Option<usize>,
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            max_message_size: Some(16 * 1024 * 1024), // 16MB
        }
    }
}

/// Stdio transport for the serving side of an MCP connection
///
/// By default it binds to the process's stdin and stdout. [`from_handles`]
/// accepts any async reader/writer pair, which is how the in-process tests
/// drive the server over a `tokio::io::duplex` pipe.
///
/// [`from_handles`]: StdioServerTransport::from_handles
pub struct StdioServerTransport {
    config: StdioConfig,
    connected: bool,
    close_sender: Option<mpsc::UnboundedSender<()>>,
    writer_close: Option<oneshot::Sender<()>>,
    writer_task: Option<JoinHandle<()>>,
    external_handles: Mutex<Option<(BoxedReader, BoxedWriter)>>,
    endpoint: String,
}

impl StdioServerTransport {
    pub fn new(config: StdioConfig) -> Self {
        Self {
            config,
            connected: false,
            close_sender: None,
            writer_close: None,
            writer_task: None,
            external_handles: Mutex::new(None),
            endpoint: "stdin/stdout".to_string(),
        }
    }

    /// Create a transport over existing reader/writer handles
    pub fn from_handles<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            config: StdioConfig::default(),
            connected: false,
            close_sender: None,
            writer_close: None,
            writer_task: None,
            external_handles: Mutex::new(Some((Box::new(reader), Box::new(writer)))),
            endpoint: "<external>".to_string(),
        }
    }

    fn spawn_io(
        &mut self,
        reader: BoxedReader,
        mut writer: BoxedWriter,
    ) -> TransportStreams {
        let (read_tx, read_rx) = mpsc::unbounded_channel();
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<MCPMessage>();
        let (close_tx, mut close_rx) = mpsc::unbounded_channel();
        let (writer_close_tx, mut writer_close_rx) = oneshot::channel::<()>();

        self.close_sender = Some(close_tx);
        self.writer_close = Some(writer_close_tx);
        let max_message_size = self.config.max_message_size;

        // Spawn task to handle input reading
        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buffer = Vec::new();

            loop {
                tokio::select! {
                    result = reader.read_until(b'\n', &mut buffer) => {
                        match result {
                            Ok(0) => {
                                // EOF; dropping the sender ends the read stream
                                tracing::debug!("MCP input closed");
                                break;
                            }
                            Ok(_) => {
                                let parsed = match std::str::from_utf8(&buffer) {
                                    Ok(line) if line.trim().is_empty() => None,
                                    Ok(line) => Some(decode_line(line.trim(), max_message_size)),
                                    Err(e) => Some(Err(MCPOperationError::parse(format!(
                                        "Message is not valid UTF-8: {}",
                                        e
                                    )))),
                                };
                                buffer.clear();
                                if let Some(parsed) = parsed {
                                    if read_tx.send(parsed).is_err() {
                                        break; // Receiver dropped
                                    }
                                }
                            }
                            Err(e) => {
                                let error = MCPOperationError::stdio(format!("Failed to read from stdin: {}", e));
                                let _ = read_tx.send(Err(error));
                                break;
                            }
                        }
                    }
                    _ = close_rx.recv() => {
                        break;
                    }
                }
            }
        });

        // Spawn task to handle output writing. It runs until the sink is dropped
        // or disconnect() closes the channel, and drains what is queued either way.
        let writer_task = tokio::spawn(async move {
            let mut closing = false;
            loop {
                let message = tokio::select! {
                    message = write_rx.recv() => message,
                    _ = &mut writer_close_rx, if !closing => {
                        closing = true;
                        write_rx.close();
                        continue;
                    }
                };
                let Some(message) = message else { break };

                match serde_json::to_string(&message) {
                    Ok(json) => {
                        let line = format!("{}\n", json);
                        if let Err(e) = writer.write_all(line.as_bytes()).await {
                            tracing::error!("Failed to write to stdout: {}", e);
                            return;
                        }
                        if let Err(e) = writer.flush().await {
                            tracing::error!("Failed to flush stdout: {}", e);
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to serialize message: {}", e);
                    }
                }
            }
            if let Err(e) = writer.shutdown().await {
                tracing::debug!("Failed to close output: {}", e);
            }
        });
        self.writer_task = Some(writer_task);

        let read_stream: MessageStream =
            Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(read_rx));

        let write_stream: MessageSink =
            Box::pin(futures::sink::unfold(write_tx, |tx, msg| async move {
                match tx.send(msg) {
                    Ok(()) => Ok(tx),
                    Err(_) => Err(MCPOperationError::connection_lost("Write channel closed")),
                }
            }));

        TransportStreams {
            read_stream,
            write_stream,
        }
    }
}

/// Decode one input line into a message
///
/// Invalid JSON is a parse error; valid JSON of the wrong shape is an invalid
/// request. Neither ends the session.
fn decode_line(
    line: &str,
    max_message_size: Option<usize>,
) -> Result<MCPMessage, MCPOperationError> {
    if let Some(limit) = max_message_size {
        if line.len() > limit {
            return Err(MCPOperationError::invalid_request(format!(
                "Message of {} bytes exceeds limit of {} bytes",
                line.len(),
                limit
            )));
        }
    }

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| MCPOperationError::parse(format!("Failed to parse MCP message: {}", e)))?;

    serde_json::from_value::<MCPMessage>(value).map_err(|e| {
        MCPOperationError::invalid_request(format!("Not a JSON-RPC 2.0 message: {}", e))
    })
}

#[async_trait]
impl MCPTransport for StdioServerTransport {
    async fn connect(&mut self) -> Result<TransportStreams, MCPOperationError> {
        if self.connected {
            return Err(MCPOperationError::invalid_request(
                "Transport is already connected",
            ));
        }

        let external = self
            .external_handles
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let (reader, writer): (BoxedReader, BoxedWriter) = match external {
            Some(handles) => handles,
            None => (
                Box::new(tokio::io::stdin()),
                Box::new(tokio::io::stdout()),
            ),
        };

        let streams = self.spawn_io(reader, writer);
        self.connected = true;
        Ok(streams)
    }

    async fn disconnect(&mut self) -> Result<(), MCPOperationError> {
        if let Some(close_sender) = self.close_sender.take() {
            let _ = close_sender.send(());
        }
        if let Some(writer_close) = self.writer_close.take() {
            let _ = writer_close.send(());
        }
        self.connected = false;

        if let Some(writer_task) = self.writer_task.take() {
            writer_task.await.map_err(|e| {
                MCPOperationError::stdio(format!("Output writer task failed: {}", e))
            })?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn transport_info(&self) -> TransportInfo {
        TransportInfo {
            transport_type: "stdio".to_string(),
            endpoint: self.endpoint.clone(),
            max_message_size: self.config.max_message_size,
        }
    }
}

/// Create in-memory message streams for unit testing
///
/// Returns a sender for injecting inbound messages, a receiver capturing
/// everything written by the server, and the streams to hand to the server.
pub fn create_test_streams() -> (
    mpsc::UnboundedSender<Result<MCPMessage, MCPOperationError>>,
    mpsc::UnboundedReceiver<MCPMessage>,
    TransportStreams,
) {
    let (read_tx, read_rx) = mpsc::unbounded_channel();
    let (write_tx, write_rx) = mpsc::unbounded_channel();

    let read_stream = Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(
        read_rx,
    ));
    let write_stream = Box::pin(futures::sink::unfold(write_tx, |tx, msg| async move {
        tx.send(msg)
            .map_err(|_| MCPOperationError::connection_lost("Channel closed"))
            .map(|_| tx)
    }));

    let streams = TransportStreams {
        read_stream,
        write_stream,
    };

    (read_tx, write_rx, streams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::{MCPRequest, MCPResponse};
    use futures::{SinkExt, StreamExt};
    use serde_json::json;

    #[test]
    fn test_stdio_config_default() {
        let config = StdioConfig::default();
        assert_eq!(config.max_message_size, Some(16 * 1024 * 1024));
    }

    #[test]
    fn test_decode_line_variants() {
        let ok = decode_line(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, None).unwrap();
        assert!(matches!(ok, MCPMessage::Request(_)));

        let bad_json = decode_line("{not json", None).unwrap_err();
        assert!(matches!(bad_json, MCPOperationError::ParseError { .. }));

        let wrong_shape = decode_line(r#"{"hello":"world"}"#, None).unwrap_err();
        assert!(matches!(wrong_shape, MCPOperationError::InvalidRequest { .. }));

        let too_big = decode_line(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, Some(8)).unwrap_err();
        assert!(matches!(too_big, MCPOperationError::InvalidRequest { .. }));
    }

    #[test]
    fn test_transport_info() {
        let transport = StdioServerTransport::new(StdioConfig::default());
        let info = transport.transport_info();
        assert_eq!(info.transport_type, "stdio");
        assert_eq!(info.endpoint, "stdin/stdout");
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_duplex_round_trip() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_side);
        let (client_read, mut client_write) = tokio::io::split(client_side);

        let mut transport = StdioServerTransport::from_handles(server_read, server_write);
        let mut streams = transport.connect().await.unwrap();
        assert!(transport.is_connected());

        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\n")
            .await
            .unwrap();

        let inbound = streams.read_stream.next().await.unwrap().unwrap();
        assert_eq!(
            inbound,
            MCPMessage::Request(MCPRequest::new(json!(1), "ping", None))
        );

        streams
            .write_stream
            .send(MCPMessage::Response(MCPResponse::success(json!(1), json!({}))))
            .await
            .unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_connect_twice_fails() {
        let (_client, server) = tokio::io::duplex(64);
        let (r, w) = tokio::io::split(server);
        let mut transport = StdioServerTransport::from_handles(r, w);
        let _streams = transport.connect().await.unwrap();
        assert!(transport.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_parse_error() {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (r, w) = tokio::io::split(server_side);
        let (_client_read, mut client_write) = tokio::io::split(client_side);
        let mut transport = StdioServerTransport::from_handles(r, w);
        let mut streams = transport.connect().await.unwrap();

        client_write
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\xff\xfe\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n")
            .await
            .unwrap();
        client_write.shutdown().await.unwrap();

        let first = streams.read_stream.next().await.unwrap();
        assert!(matches!(first, Ok(MCPMessage::Request(ref r)) if r.id == json!(1)));

        let second = streams.read_stream.next().await.unwrap().unwrap_err();
        assert!(matches!(second, MCPOperationError::ParseError { .. }));

        let third = streams.read_stream.next().await.unwrap();
        assert!(matches!(third, Ok(MCPMessage::Request(ref r)) if r.id == json!(2)));

        assert!(streams.read_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_flushes_queued_messages() {
        let (client_side, server_side) = tokio::io::duplex(64 * 1024);
        let (r, w) = tokio::io::split(server_side);
        let (client_read, _client_write) = tokio::io::split(client_side);
        let mut transport = StdioServerTransport::from_handles(r, w);
        let mut streams = transport.connect().await.unwrap();

        for id in 0..50 {
            streams
                .write_stream
                .send(MCPMessage::Response(MCPResponse::success(json!(id), json!({}))))
                .await
                .unwrap();
        }
        drop(streams);

        transport.disconnect().await.unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let mut ids = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            let value: serde_json::Value = serde_json::from_str(&line).unwrap();
            ids.push(value["id"].as_i64().unwrap());
        }
        assert_eq!(ids, (0..50).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_eof_ends_read_stream() {
        let (client_side, server_side) = tokio::io::duplex(64);
        let (r, w) = tokio::io::split(server_side);
        let mut transport = StdioServerTransport::from_handles(r, w);
        let mut streams = transport.connect().await.unwrap();

        drop(client_side);
        assert!(streams.read_stream.next().await.is_none());
    }
}
