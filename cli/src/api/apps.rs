//! Application endpoints

use serde_json::{json, Value};
use tracing::debug;

use crate::errors::SyncError;
use crate::rpc::error::RpcError;
use crate::rpc::session::Session;

impl Session {
    /// Look up an application by name. Returns the first match, if any.
    pub async fn query_app(&mut self, name: &str) -> Result<Option<Value>, SyncError> {
        debug!("Querying for app {}", name);
        let result = self
            .call(
                "app.query",
                vec![json!([["name", "=", name]]), json!({"limit": 1})],
            )
            .await?;

        match result {
            Value::Array(mut apps) => {
                if apps.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(apps.remove(0)))
                }
            }
            other => Err(RpcError::Decode(format!("app.query returned {other}")).into()),
        }
    }

    /// Fetch the current configuration of a named application.
    pub async fn app_config(&mut self, name: &str) -> Result<Value, SyncError> {
        self.call("app.config", vec![json!(name)]).await
    }

    /// Request creation of a new application; returns the async job id.
    pub async fn create_app(&mut self, payload: Value) -> Result<i64, SyncError> {
        let result = self.call("app.create", vec![payload]).await?;
        job_id(result, "app.create")
    }

    /// Request an update of a named application's desired spec; returns the
    /// async job id.
    pub async fn update_app(&mut self, name: &str, payload: Value) -> Result<i64, SyncError> {
        let result = self.call("app.update", vec![json!(name), payload]).await?;
        job_id(result, "app.update")
    }
}

fn job_id(result: Value, method: &str) -> Result<i64, SyncError> {
    result
        .as_i64()
        .ok_or_else(|| RpcError::Decode(format!("{method} did not return a job id: {result}")).into())
}
