//! Single-pass run loop

use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::SyncError;
use crate::reconcile::{Reconciler, Summary};
use crate::rpc::session::Session;
use crate::rpc::transport::WsConnector;

/// Execute one reconciliation pass against the host.
///
/// Connects and authenticates once, reconciles every definition in order,
/// and releases the connection on every exit path.
pub async fn run(options: AppOptions) -> Result<Summary, SyncError> {
    info!("Connecting to {}", options.endpoint);

    let connector = WsConnector::new(options.endpoint.clone());
    let mut session = Session::new(
        Box::new(connector),
        options.credentials.clone(),
        options.session.clone(),
    );

    let result = run_with_session(&mut session, &options).await;
    session.close().await;
    result
}

async fn run_with_session(
    session: &mut Session,
    options: &AppOptions,
) -> Result<Summary, SyncError> {
    session.open().await?;

    let mut reconciler = Reconciler::new(session, options.reconcile.clone());
    reconciler.run(&options.definitions_dir).await
}
