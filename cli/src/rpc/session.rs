//! Authenticated RPC session management
//!
//! One lazily-opened connection, one call in flight, one retry policy.
//! The session is a single-owner value threaded through by `&mut`; calls are
//! never pipelined on the connection.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::SyncError;
use crate::rpc::transport::{Connect, Transport};

/// Login material for the host; exactly one mechanism applies.
#[derive(Clone)]
pub enum Credentials {
    /// `auth.login_with_api_key`
    ApiKey(SecretString),

    /// `auth.login`
    Password {
        username: String,
        password: SecretString,
    },
}

/// Session retry tuning
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Extra attempts after a transient call failure
    pub retries: u32,

    /// Base reconnect delay; grows linearly with the attempt number
    pub backoff: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            retries: 1,
            backoff: Duration::from_secs(1),
        }
    }
}

/// The one authenticated connection to the host
///
/// Lifecycle is Closed -> Open -> Closed, reopened any number of times. Closing
/// is idempotent and happens on every exit path of a run.
pub struct Session {
    connector: Box<dyn Connect>,
    credentials: Credentials,
    options: SessionOptions,
    transport: Option<Box<dyn Transport>>,
}

impl Session {
    pub fn new(
        connector: Box<dyn Connect>,
        credentials: Credentials,
        options: SessionOptions,
    ) -> Self {
        Self {
            connector,
            credentials,
            options,
            transport: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Open the connection and authenticate once. No-op when already open.
    ///
    /// A rejected login is fatal and the just-opened transport never
    /// outlives it.
    pub async fn open(&mut self) -> Result<(), SyncError> {
        if self.transport.is_some() {
            return Ok(());
        }

        let mut transport = self.connector.connect().await?;
        let login = match &self.credentials {
            Credentials::ApiKey(key) => {
                transport
                    .call("auth.login_with_api_key", vec![json!(key.expose_secret())])
                    .await
            }
            Credentials::Password { username, password } => {
                transport
                    .call(
                        "auth.login",
                        vec![json!(username), json!(password.expose_secret())],
                    )
                    .await
            }
        };

        match login {
            Ok(Value::Bool(true)) => {
                debug!("Authenticated with the host");
                self.transport = Some(transport);
                Ok(())
            }
            Ok(_) => {
                transport.close().await;
                Err(SyncError::AuthRejected)
            }
            Err(e) => {
                transport.close().await;
                Err(e.into())
            }
        }
    }

    /// Invoke an RPC method, transparently reconnecting and retrying on
    /// transient failures until the retry budget is spent.
    pub async fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, SyncError> {
        let mut attempt: u32 = 0;
        loop {
            self.open().await?;
            let transport = self
                .transport
                .as_deref_mut()
                .ok_or_else(|| SyncError::Internal("transport missing after open".to_string()))?;

            match transport.call(method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.options.retries => {
                    attempt += 1;
                    warn!(
                        "Transient failure on {} (attempt {}): {}; reconnecting...",
                        method, attempt, e
                    );
                    tokio::time::sleep(self.options.backoff * attempt).await;
                    self.close().await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Release the connection. Safe to call when already closed.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            debug!("Session closed");
        }
    }
}
