//! Job models
//!
//! A job is a server-side asynchronous operation tracked by integer id. It
//! moves through running states and settles in exactly one terminal state.

use serde::Deserialize;
use serde_json::Value;

/// Lifecycle state reported by the host's job engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Waiting,
    Running,
    Success,
    Failed,
    Aborted,

    /// Any state this client does not know about; treated as still running.
    #[serde(other)]
    Other,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failed | JobState::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Waiting => "WAITING",
            JobState::Running => "RUNNING",
            JobState::Success => "SUCCESS",
            JobState::Failed => "FAILED",
            JobState::Aborted => "ABORTED",
            JobState::Other => "UNKNOWN",
        }
    }
}

/// Progress fields the host attaches to a running job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobProgress {
    #[serde(default)]
    pub percent: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,
}

/// A job record as returned by `core.get_jobs`
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: i64,

    pub state: JobState,

    #[serde(default)]
    pub progress: Option<JobProgress>,

    /// Tail of the job's log output; grows monotonically across polls.
    #[serde(default)]
    pub logs_excerpt: Option<String>,

    #[serde(default)]
    pub error: Option<Value>,

    /// Set by the host when the job result could not be encoded; used as an
    /// error fallback when `error` is absent.
    #[serde(default)]
    pub result_encoding_error: Option<Value>,

    #[serde(default)]
    pub result: Option<Value>,
}

impl Job {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn percent(&self) -> Option<f64> {
        self.progress.as_ref().and_then(|p| p.percent)
    }

    pub fn description(&self) -> Option<&str> {
        self.progress.as_ref().and_then(|p| p.description.as_deref())
    }

    /// Human-readable error detail for a non-SUCCESS terminal state.
    pub fn error_detail(&self) -> Option<String> {
        let detail = self.error.as_ref().or(self.result_encoding_error.as_ref())?;
        match detail {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
