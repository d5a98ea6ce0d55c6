//! tidesync - Entry Point
//!
//! Reconciles a directory of compose-style application definitions against
//! the running application state of a remote orchestration host.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use tracing::error;

use tidesync::app::options::AppOptions;
use tidesync::app::run::run;
use tidesync::logs::{init_logging, LogLevel};
use tidesync::reconcile::spec::DeployMode;
use tidesync::reconcile::ReconcileOptions;
use tidesync::rpc::session::{Credentials, SessionOptions};
use tidesync::rpc::transport::api_endpoint;
use tidesync::utils::version_info;
use tidesync::watch::WatchOptions;

const USAGE: &str = "\
Usage: tidesync --host=<host> --dir=<definitions-dir> [options]

Options:
  --host=<host>            Hostname/IP of the orchestration host, or a full
                           ws:// / wss:// endpoint URL
  --dir=<path>             Directory of .yaml/.yml/.json definition files
  --user=<name>            Username to log in with (default: admin)
  --password=<secret>      Password (or set TIDESYNC_PASSWORD)
  --api-key=<key>          API key (or set TIDESYNC_API_KEY); wins over
                           username+password when both are present
  --mode=<compose|values>  Deployment mode (default: compose)
  --dry-run                Show actions without making changes
  --poll-interval=<secs>   Job poll interval in seconds (default: 1)
  --log-level=<level>      trace|debug|info|warn|error (default: info)
  --version                Print version information and exit";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version_info()).unwrap());
        return;
    }

    if cli_args.contains_key("help") {
        println!("{USAGE}");
        return;
    }

    // Initialize logging
    let log_level = match cli_args.get("log-level") {
        Some(level) => match level.parse::<LogLevel>() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        None => LogLevel::default(),
    };
    if let Err(e) = init_logging(log_level) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = match build_options(&cli_args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e:#}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    match run(options).await {
        Ok(summary) => {
            println!(
                "{} created, {} updated, {} skipped, {} failed job(s)",
                summary.created, summary.updated, summary.skipped, summary.failed_jobs
            );
            if !summary.ok() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Reconciliation failed: {e}");
            std::process::exit(1);
        }
    }
}

fn build_options(args: &HashMap<String, String>) -> Result<AppOptions> {
    let host = args.get("host").context("--host is required")?;
    let endpoint = api_endpoint(host).context("invalid --host")?;

    let dir = args.get("dir").context("--dir is required")?;
    let definitions_dir = PathBuf::from(dir);
    if !definitions_dir.is_dir() {
        bail!("'{dir}' is not a valid directory");
    }

    let api_key = args
        .get("api-key")
        .cloned()
        .or_else(|| env::var("TIDESYNC_API_KEY").ok());
    let credentials = match api_key {
        Some(key) => Credentials::ApiKey(SecretString::from(key)),
        None => {
            let username = args
                .get("user")
                .cloned()
                .unwrap_or_else(|| "admin".to_string());
            let password = args
                .get("password")
                .cloned()
                .or_else(|| env::var("TIDESYNC_PASSWORD").ok())
                .context(
                    "no credentials given: pass --api-key or --password, \
                     or set TIDESYNC_API_KEY or TIDESYNC_PASSWORD",
                )?;
            Credentials::Password {
                username,
                password: SecretString::from(password),
            }
        }
    };

    let mode = match args.get("mode") {
        Some(mode) => mode.parse::<DeployMode>().map_err(anyhow::Error::msg)?,
        None => DeployMode::default(),
    };

    let poll_interval = match args.get("poll-interval") {
        Some(secs) => Duration::from_secs(
            secs.parse::<u64>()
                .context("--poll-interval must be a number of seconds")?,
        ),
        None => WatchOptions::default().poll_interval,
    };

    Ok(AppOptions {
        endpoint,
        credentials,
        definitions_dir,
        session: SessionOptions::default(),
        reconcile: ReconcileOptions {
            mode,
            dry_run: args.contains_key("dry-run"),
            watch: WatchOptions {
                poll_interval,
                ..Default::default()
            },
        },
    })
}
