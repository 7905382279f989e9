//! Line-delimited stdio transport
//!
//! One JSON-RPC message per line in each direction.

use super::protocol::JsonRpcResponse;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Async line transport over any reader/writer pair
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Transport over the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next raw line, trimmed. `Ok(None)` means EOF.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Write a response followed by a newline
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Give back the writer (used by tests to inspect output)
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::protocol::JsonRpcError;

    #[test]
    fn test_read_lines_until_eof() {
        tokio_test::block_on(async {
            let input: &[u8] = b"{\"a\":1}\n\n  second  \n";
            let mut transport = LineTransport::new(input, Vec::new());
            assert_eq!(transport.read_line().await.unwrap().unwrap(), "{\"a\":1}");
            assert_eq!(transport.read_line().await.unwrap().unwrap(), "");
            assert_eq!(transport.read_line().await.unwrap().unwrap(), "second");
            assert!(transport.read_line().await.unwrap().is_none());
        });
    }

    #[test]
    fn test_response_serialization() {
        tokio_test::block_on(async {
            let input: &[u8] = b"";
            let mut transport = LineTransport::new(input, Vec::new());
            let response = JsonRpcResponse::success(
                Some(serde_json::json!(1)),
                serde_json::json!({"status": "ok"}),
            );
            transport.write_response(&response).await.unwrap();
            let error = JsonRpcResponse::error(None, JsonRpcError::method_not_found("unknown"));
            transport.write_response(&error).await.unwrap();

            let out = String::from_utf8(transport.into_writer()).unwrap();
            let lines: Vec<&str> = out.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].contains("\"jsonrpc\":\"2.0\""));
            assert!(lines[0].contains("\"result\""));
            assert!(lines[1].contains("-32601"));
        });
    }
}
