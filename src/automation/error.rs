use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("failed to launch automation script: {0}")]
    Launch(#[source] std::io::Error),

    #[error("failed to collect automation script output: {0}")]
    Io(#[source] std::io::Error),

    #[error("automation script timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("automation script failed: {status}, output: {output}")]
    Exited { status: ExitStatus, output: String },

    #[error("failed to parse automation response: {source}, output: {output}")]
    Malformed {
        source: serde_json::Error,
        output: String,
    },

    #[error("registration failed: {0}")]
    Rejected(String),
}

impl AutomationError {
    /// Short label for the failure, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Launch(_) => "launch",
            Self::Io(_) => "io",
            Self::Timeout(_) => "timeout",
            Self::Exited { .. } => "exit_status",
            Self::Malformed { .. } => "malformed_output",
            Self::Rejected(_) => "rejected",
        }
    }
}
