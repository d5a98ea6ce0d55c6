//! RPC client for the orchestration host
//!
//! JSON-RPC 2.0 over a single WebSocket connection: a typed error layer,
//! a transport abstraction, and the session that owns the connection.

pub mod error;
pub mod session;
pub mod transport;
