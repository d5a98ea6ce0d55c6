//! Desired-spec payload shaping
//!
//! Pure transforms from a parsed definition document to the payloads the
//! host's `app.create` / `app.update` calls expect. The shape depends on the
//! deployment mode.

use std::str::FromStr;

use serde_json::{json, Value};

/// How the definitions in a directory are deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployMode {
    /// The definition is a full container-compose document, sent wrapped
    /// under `custom_compose_config`.
    #[default]
    Compose,

    /// Catalog/chart deployment; the definition is a flat `values` mapping.
    Values,
}

impl FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compose" => Ok(DeployMode::Compose),
            "values" => Ok(DeployMode::Values),
            _ => Err(format!("invalid mode '{s}' (expected compose or values)")),
        }
    }
}

/// Payload for `app.create`.
pub fn create_payload(name: &str, mode: DeployMode, document: &Value) -> Value {
    match mode {
        DeployMode::Compose => json!({
            "app_name": name,
            "custom_app": true,
            "custom_compose_config": document,
        }),
        DeployMode::Values => document.clone(),
    }
}

/// Payload for `app.update`.
///
/// Values mode sends an empty mapping instead of the drifted values; this
/// mirrors the catalog update behavior of the deployment API this client was
/// built against. Recorded as an open question in DESIGN.md.
pub fn update_payload(mode: DeployMode, document: &Value) -> Value {
    match mode {
        DeployMode::Compose => json!({"custom_compose_config": document}),
        DeployMode::Values => json!({"values": {}}),
    }
}
