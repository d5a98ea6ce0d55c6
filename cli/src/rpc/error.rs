//! Typed RPC failure classification

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error code the host replies with when shedding load. JSON-RPC 2.0 reserves
/// -32000..-32099 for implementation-defined server errors; the host uses the
/// range floor for its rate limiter.
pub const RATE_LIMIT_CODE: i64 = -32000;

/// RPC failure, classified at the transport layer
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("websocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("connection closed")]
    Closed,

    #[error("rate limited by the host")]
    RateLimited,

    #[error("call failed ({code}): {message}")]
    Call { code: i64, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unexpected result shape: {0}")]
    Decode(String),
}

impl RpcError {
    /// Whether reconnecting and retrying the call can plausibly succeed.
    ///
    /// Connection-level failures and rate-limit replies are transient;
    /// everything the server actively rejected is not.
    pub fn is_transient(&self) -> bool {
        match self {
            RpcError::Closed | RpcError::RateLimited => true,
            RpcError::Ws(e) => matches!(
                e,
                tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Io(_)
                    | tungstenite::Error::Protocol(_)
            ),
            _ => false,
        }
    }
}
