//! Application definition files
//!
//! One file per application: the stem is the app's logical name, the content
//! is a YAML or JSON mapping. Anything else is rejected before the host is
//! ever contacted.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::SyncError;

/// A validated application definition
#[derive(Debug, Clone)]
pub struct Definition {
    /// Logical application name (the file stem)
    pub name: String,

    pub path: PathBuf,

    /// Parsed document; the top level is guaranteed to be a mapping.
    pub document: Value,
}

impl Definition {
    /// Load and validate a definition file.
    pub async fn load(path: &Path) -> Result<Self, SyncError> {
        let name = path
            .file_stem()
            .and_then(OsStr::to_str)
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                SyncError::InvalidDefinition(format!(
                    "{} has no usable file name",
                    path.display()
                ))
            })?
            .to_string();

        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase);
        let format = match extension.as_deref() {
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => {
                return Err(SyncError::InvalidDefinition(format!(
                    "{} must be .yaml, .yml, or .json",
                    path.display()
                )))
            }
        };

        let text = tokio::fs::read_to_string(path).await?;
        let document: Value = match format {
            Format::Yaml => serde_yaml::from_str(&text).map_err(|e| {
                SyncError::InvalidDefinition(format!("{} is not valid yaml: {e}", path.display()))
            })?,
            Format::Json => serde_json::from_str(&text).map_err(|e| {
                SyncError::InvalidDefinition(format!("{} is not valid json: {e}", path.display()))
            })?,
        };

        if !document.is_object() {
            return Err(SyncError::InvalidDefinition(format!(
                "{} must contain a top-level mapping",
                path.display()
            )));
        }

        debug!("Loaded definition {} from {}", name, path.display());
        Ok(Self {
            name,
            path: path.to_path_buf(),
            document,
        })
    }
}

enum Format {
    Yaml,
    Json,
}

/// List definition files in lexicographic order.
///
/// Directories and other non-regular entries are skipped; validation of each
/// file happens at load time.
pub async fn discover(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
