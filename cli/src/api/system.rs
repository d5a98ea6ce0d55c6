//! Runtime subsystem endpoints

use std::fmt;

use serde::Deserialize;

use crate::errors::SyncError;
use crate::rpc::error::RpcError;
use crate::rpc::session::Session;

/// State of the host's application runtime subsystem
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuntimeState {
    Running,
    Unconfigured,

    /// Any other state the host reports; carried verbatim for error messages.
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeState::Running => write!(f, "RUNNING"),
            RuntimeState::Unconfigured => write!(f, "UNCONFIGURED"),
            RuntimeState::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Response of `docker.status`
#[derive(Debug, Clone, Deserialize)]
pub struct DockerStatus {
    pub status: RuntimeState,

    #[serde(default)]
    pub description: Option<String>,
}

impl Session {
    /// Query readiness of the application runtime subsystem.
    pub async fn docker_status(&mut self) -> Result<DockerStatus, SyncError> {
        let result = self.call("docker.status", vec![]).await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::Decode(format!("docker.status: {e}")).into())
    }
}
