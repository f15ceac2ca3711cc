use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;

use super::error::AutomationError;
use crate::config::Config;

/// JSON object the script prints before exiting.
#[derive(Debug, Deserialize)]
struct ScriptResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A registration the script reported as done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// Confirmation text scraped by the script, if it sent one.
    pub message: Option<String>,
}

/// Runs the account-creation script with the admin credentials from [`Config`].
pub struct Automation {
    interpreter: PathBuf,
    script: PathBuf,
    target_url: String,
    admin_email: String,
    admin_password: String,
    timeout: Duration,
    permits: Option<Semaphore>,
}

impl Automation {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            script: config.script_path.clone(),
            target_url: config.target_url.clone(),
            admin_email: config.admin_email.clone(),
            admin_password: config.admin_password.clone(),
            timeout: config.automation_timeout,
            permits: config.automation_max_concurrency.map(Semaphore::new),
        }
    }

    /// Register `email` against the configured target.
    pub async fn register(&self, email: &str) -> Result<Registered, AutomationError> {
        self.invoke(
            &self.target_url,
            &self.admin_email,
            &self.admin_password,
            email,
        )
        .await
    }

    /// Run the script once and interpret its combined output.
    ///
    /// Arguments go to the script positionally: target URL, admin identity,
    /// admin secret, subject email. The whole run, including the wait for a
    /// concurrency permit, is bounded by the configured timeout; the child is
    /// killed when the deadline passes.
    #[tracing::instrument(skip(self, admin_email, admin_password), fields(%target_url, %email))]
    pub async fn invoke(
        &self,
        target_url: &str,
        admin_email: &str,
        admin_password: &str,
        email: &str,
    ) -> Result<Registered, AutomationError> {
        let run = async {
            let _permit = match &self.permits {
                Some(limit) => limit.acquire().await.ok(),
                None => None,
            };

            let mut child = Command::new(&self.interpreter)
                .arg(&self.script)
                .arg(target_url)
                .arg(admin_email)
                .arg(admin_password)
                .arg(email)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(AutomationError::Launch)?;

            let output = combined_output(&mut child)
                .await
                .map_err(AutomationError::Io)?;
            let status = child.wait().await.map_err(AutomationError::Io)?;
            Ok::<_, AutomationError>((status, output))
        };

        let (status, output) = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| AutomationError::Timeout(self.timeout))??;

        let registered = interpret(status, &output)?;
        tracing::info!(message = ?registered.message, "automation script reported success");
        Ok(registered)
    }
}

/// Drain stdout and stderr into one buffer in the order the bytes arrive.
async fn combined_output(child: &mut Child) -> std::io::Result<Vec<u8>> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("stdout not captured"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("stderr not captured"))?;

    let mut combined = Vec::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            n = stdout.read(&mut out_buf), if out_open => {
                let n = n?;
                if n == 0 {
                    out_open = false;
                } else {
                    combined.extend_from_slice(&out_buf[..n]);
                }
            }
            n = stderr.read(&mut err_buf), if err_open => {
                let n = n?;
                if n == 0 {
                    err_open = false;
                } else {
                    combined.extend_from_slice(&err_buf[..n]);
                }
            }
        }
    }

    Ok(combined)
}

/// Map exit status and output onto an outcome.
fn interpret(status: ExitStatus, output: &[u8]) -> Result<Registered, AutomationError> {
    if !status.success() {
        return Err(AutomationError::Exited {
            status,
            output: String::from_utf8_lossy(output).into_owned(),
        });
    }

    let response: ScriptResponse =
        serde_json::from_slice(output).map_err(|source| AutomationError::Malformed {
            source,
            output: String::from_utf8_lossy(output).into_owned(),
        })?;

    if !response.success {
        return Err(AutomationError::Rejected(
            response.error.unwrap_or_default(),
        ));
    }

    Ok(Registered {
        message: response.message,
    })
}
