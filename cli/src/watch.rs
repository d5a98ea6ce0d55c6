//! Job watching
//!
//! Polls a job until it reaches a terminal state, echoing progress as it
//! happens. A status line is printed only when the percent or description
//! changed since the last printed line, and the log excerpt only when it
//! differs from the previously seen one, so unchanged polls stay silent.

use std::time::Duration;

use colored::Colorize;
use tracing::debug;

use crate::errors::SyncError;
use crate::models::job::{Job, JobState};
use crate::rpc::session::Session;

/// Watch loop options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Fixed delay between polls
    pub poll_interval: Duration,

    /// Request the raw result encoding from the host
    pub raw_result: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            raw_result: true,
        }
    }
}

/// Change-tracking for the watch loop's output discipline.
///
/// Feed it every polled record; it returns only the lines that should be
/// printed. Pure state, no IO.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last_percent: Option<f64>,
    last_description: Option<String>,
    last_excerpt: Option<String>,
}

impl ProgressTracker {
    pub fn observe(&mut self, job: &Job) -> Vec<String> {
        let mut lines = Vec::new();

        let percent = job.percent();
        let description = job.description();
        if percent != self.last_percent || description != self.last_description.as_deref() {
            lines.push(status_line(job));
            self.last_percent = percent;
            self.last_description = description.map(str::to_string);
        }

        if let Some(excerpt) = job.logs_excerpt.as_deref() {
            if self.last_excerpt.as_deref() != Some(excerpt) {
                lines.push(format!("[job {} logs]\n{}", job.id, excerpt));
                self.last_excerpt = Some(excerpt.to_string());
            }
        }

        lines
    }
}

fn status_line(job: &Job) -> String {
    let percent = job
        .percent()
        .map(|p| format!("{p}%"))
        .unwrap_or_default();
    let description = job
        .description()
        .map(|d| format!(" - {d}"))
        .unwrap_or_default();
    format!("[job {}] {} {}{}", job.id, job.state.as_str(), percent, description)
}

/// Poll `job_id` until it reaches a terminal state and return the final
/// record. FAILED and ABORTED are reported but returned, not raised; polling
/// failures propagate through the session's own retry policy.
pub async fn watch_job(
    session: &mut Session,
    job_id: i64,
    options: &WatchOptions,
) -> Result<Job, SyncError> {
    let mut tracker = ProgressTracker::default();

    loop {
        let job = session.get_job(job_id, options.raw_result).await?;
        for line in tracker.observe(&job) {
            println!("{line}");
        }

        if job.is_terminal() {
            match job.state {
                JobState::Success => {
                    println!("[job {}] {}", job_id, "Finished.".green());
                }
                state => {
                    let detail = job.error_detail().unwrap_or_else(|| "none".to_string());
                    println!(
                        "[job {}] {} error = {}",
                        job_id,
                        format!("{}.", state.as_str()).red(),
                        detail
                    );
                }
            }
            return Ok(job);
        }

        debug!("Job {} still {}, polling again", job_id, job.state.as_str());
        tokio::time::sleep(options.poll_interval).await;
    }
}
