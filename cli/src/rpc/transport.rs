//! WebSocket JSON-RPC transport

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};
use url::Url;

use crate::rpc::error::{RpcError, RATE_LIMIT_CODE};

/// A connected RPC channel: one synchronous call in flight at a time.
#[async_trait]
pub trait Transport: Send {
    /// Invoke `method` with positional `params`, blocking until the response.
    async fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;

    /// Release the underlying connection.
    async fn close(&mut self);
}

/// Produces a fresh connected transport, so a dropped session can be reopened.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Transport>, RpcError>;
}

/// Derive the host's RPC endpoint from a `--host` value.
///
/// Accepts a full `ws://` / `wss://` URL, or a bare hostname/IP which maps to
/// the plaintext endpoint `ws://<host>/api/current`.
pub fn api_endpoint(host: &str) -> Result<Url, RpcError> {
    let url = if host.contains("://") {
        Url::parse(host).map_err(|e| RpcError::Protocol(format!("invalid endpoint URL: {e}")))?
    } else {
        Url::parse(&format!("ws://{host}/api/current"))
            .map_err(|e| RpcError::Protocol(format!("invalid host '{host}': {e}")))?
    };

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(RpcError::Protocol(format!(
            "unsupported endpoint scheme '{other}' (expected ws or wss)"
        ))),
    }
}

/// Connector for the host's WebSocket endpoint
pub struct WsConnector {
    endpoint: Url,
}

impl WsConnector {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl Connect for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, RpcError> {
        debug!("Connecting to {}", self.endpoint);
        let (stream, _) = connect_async(self.endpoint.as_str()).await?;
        Ok(Box::new(WsTransport { stream, next_id: 0 }))
    }
}

/// JSON-RPC 2.0 over one WebSocket stream
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

#[async_trait]
impl Transport for WsTransport {
    async fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.next_id += 1;
        let id = self.next_id;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.stream
            .send(Message::Text(request.to_string().into()))
            .await?;

        loop {
            match self.stream.next().await {
                None => return Err(RpcError::Closed),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => {
                    let frame: Value = serde_json::from_str(text.as_str())
                        .map_err(|e| RpcError::Protocol(format!("invalid frame: {e}")))?;

                    // Server-initiated notifications carry no id; skip them
                    // while waiting for our response.
                    if frame.get("id").and_then(Value::as_u64) != Some(id) {
                        debug!("Skipping non-response frame for {}", method);
                        continue;
                    }

                    if let Some(error) = frame.get("error") {
                        return Err(call_error(error));
                    }
                    return Ok(frame.get("result").cloned().unwrap_or(Value::Null));
                }
                Some(Ok(Message::Close(_))) => {
                    warn!("Host closed the connection mid-call");
                    return Err(RpcError::Closed);
                }
                // Ping/pong and binary frames are not part of the RPC exchange.
                Some(Ok(_)) => {}
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

fn call_error(error: &Value) -> RpcError {
    let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
    if code == RATE_LIMIT_CODE {
        return RpcError::RateLimited;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    RpcError::Call { code, message }
}
