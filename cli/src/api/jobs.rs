//! Job endpoints

use serde_json::json;

use crate::errors::SyncError;
use crate::models::job::Job;
use crate::rpc::error::RpcError;
use crate::rpc::session::Session;

impl Session {
    /// Fetch a single job record by id.
    ///
    /// `raw_result` asks the host to skip result post-processing, which keeps
    /// the record decodable regardless of what the job produced.
    pub async fn get_job(&mut self, job_id: i64, raw_result: bool) -> Result<Job, SyncError> {
        let result = self
            .call(
                "core.get_jobs",
                vec![
                    json!([["id", "=", job_id]]),
                    json!({"get": true, "extra": {"raw_result": raw_result}}),
                ],
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| RpcError::Decode(format!("core.get_jobs: {e}")).into())
    }
}
