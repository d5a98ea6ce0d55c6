//! Error types for tidesync

use thiserror::Error;

use crate::rpc::error::RpcError;

/// Main error type for the reconciliation run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("RPC error: {0}")]
    RpcError(#[from] RpcError),

    #[error("login rejected by the host")]
    AuthRejected,

    #[error("application runtime is not ready: {0}")]
    RuntimeNotReady(String),

    #[error("invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
