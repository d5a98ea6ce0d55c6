//! Application configuration options

use std::path::PathBuf;

use url::Url;

use crate::reconcile::ReconcileOptions;
use crate::rpc::session::{Credentials, SessionOptions};

/// Everything one reconciliation pass needs
pub struct AppOptions {
    /// The host's WebSocket RPC endpoint
    pub endpoint: Url,

    /// Login material (API key or username+password)
    pub credentials: Credentials,

    /// Directory of definition files to reconcile
    pub definitions_dir: PathBuf,

    /// Session retry tuning
    pub session: SessionOptions,

    /// Reconciler behavior (mode, dry run, job watching)
    pub reconcile: ReconcileOptions,
}
