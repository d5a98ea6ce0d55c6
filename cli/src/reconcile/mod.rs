//! Reconciliation core
//!
//! Drives one pass over a directory of definitions: for each one, decide
//! create vs update vs skip against the host's current state, and watch any
//! triggered job to completion.

pub mod canonical;
pub mod definition;
pub mod spec;

use std::path::Path;

use colored::Colorize;
use tracing::{info, warn};

use crate::api::system::RuntimeState;
use crate::errors::SyncError;
use crate::models::job::JobState;
use crate::reconcile::definition::Definition;
use crate::reconcile::spec::DeployMode;
use crate::rpc::session::Session;
use crate::watch::{watch_job, WatchOptions};

/// Reconciler options
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub mode: DeployMode,

    /// Announce decisions without issuing mutating calls
    pub dry_run: bool,

    pub watch: WatchOptions,
}

/// The action taken (or that would be taken) for one definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Create,
    Update,
    Skip,
}

impl Decision {
    fn tag(&self) -> colored::ColoredString {
        match self {
            Decision::Create => "[CREATE]".green(),
            Decision::Update => "[UPDATE]".yellow(),
            Decision::Skip => "[SKIP]".cyan(),
        }
    }
}

/// Outcome counts for one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,

    /// Watched jobs that ended FAILED or ABORTED
    pub failed_jobs: u32,
}

impl Summary {
    pub fn ok(&self) -> bool {
        self.failed_jobs == 0
    }
}

/// Per-definition create/update/skip engine
pub struct Reconciler<'a> {
    session: &'a mut Session,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(session: &'a mut Session, options: ReconcileOptions) -> Self {
        Self { session, options }
    }

    /// Gate the run on the host's application runtime being up.
    ///
    /// Anything other than RUNNING aborts before any definition is touched;
    /// partial reconciliation against an unhealthy runtime is never attempted.
    pub async fn preflight(&mut self) -> Result<(), SyncError> {
        let status = self.session.docker_status().await?;
        match status.status {
            RuntimeState::Running => Ok(()),
            RuntimeState::Unconfigured => Err(SyncError::RuntimeNotReady(
                "the application runtime is UNCONFIGURED; configure it on the host and retry"
                    .to_string(),
            )),
            other => Err(SyncError::RuntimeNotReady(format!(
                "the application runtime is not healthy (status={other})"
            ))),
        }
    }

    /// Reconcile every definition in `dir`, in lexicographic order.
    ///
    /// An invalid definition aborts the batch; a failed job is recorded in
    /// the summary and the batch continues.
    pub async fn run(&mut self, dir: &Path) -> Result<Summary, SyncError> {
        self.preflight().await?;

        let files = definition::discover(dir).await?;
        if files.is_empty() {
            warn!("No definition files found in {}", dir.display());
        }

        let mut summary = Summary::default();
        for path in &files {
            let definition = Definition::load(path).await?;
            self.reconcile(&definition, &mut summary).await?;
        }

        info!(
            "Pass complete: {} created, {} updated, {} skipped, {} failed jobs",
            summary.created, summary.updated, summary.skipped, summary.failed_jobs
        );
        Ok(summary)
    }

    /// Reconcile a single definition against the host.
    pub async fn reconcile(
        &mut self,
        definition: &Definition,
        summary: &mut Summary,
    ) -> Result<Decision, SyncError> {
        let name = &definition.name;

        if self.session.query_app(name).await?.is_none() {
            self.announce(Decision::Create, name, "defined but not deployed, deploying");
            summary.created += 1;
            if !self.options.dry_run {
                let payload =
                    spec::create_payload(name, self.options.mode, &definition.document);
                let job_id = self.session.create_app(payload).await?;
                self.finish_job(job_id, summary).await?;
            }
            return Ok(Decision::Create);
        }

        let current = self.session.app_config(name).await?;
        if canonical::equivalent(&definition.document, &current) {
            self.announce(Decision::Skip, name, "config is up to date");
            summary.skipped += 1;
            Ok(Decision::Skip)
        } else {
            self.announce(Decision::Update, name, "config has drifted, updating");
            summary.updated += 1;
            if !self.options.dry_run {
                let payload = spec::update_payload(self.options.mode, &definition.document);
                let job_id = self.session.update_app(name, payload).await?;
                self.finish_job(job_id, summary).await?;
            }
            Ok(Decision::Update)
        }
    }

    async fn finish_job(&mut self, job_id: i64, summary: &mut Summary) -> Result<(), SyncError> {
        let job = watch_job(self.session, job_id, &self.options.watch).await?;
        if job.state != JobState::Success {
            summary.failed_jobs += 1;
        }
        Ok(())
    }

    fn announce(&self, decision: Decision, name: &str, reason: &str) {
        let suffix = if self.options.dry_run { " (dry run)" } else { "" };
        println!("{} {} -- {}{}", decision.tag(), name, reason, suffix);
    }
}
