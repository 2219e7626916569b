use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "foldgraph::events::telemetry";

/// Phases of an undoable command as it moves through the history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandLifecycle {
    Execute,
    Undo,
    Redo,
    Failure,
}

impl fmt::Display for CommandLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execute => write!(f, "command_execute"),
            Self::Undo => write!(f, "command_undo"),
            Self::Redo => write!(f, "command_redo"),
            Self::Failure => write!(f, "command_failure"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTelemetry {
    pub correlation_id: String,
    pub command: String,
    pub lifecycle: CommandLifecycle,
    pub affected: usize,
    pub error_reason: Option<String>,
}

impl CommandTelemetry {
    pub fn new(
        command: impl Into<String>,
        correlation_id: &str,
        lifecycle: CommandLifecycle,
        affected: usize,
    ) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            command: command.into(),
            lifecycle,
            affected,
            error_reason: None,
        }
    }

    pub fn failure(command: impl Into<String>, correlation_id: &str, reason: String) -> Self {
        Self {
            error_reason: Some(reason),
            ..Self::new(command, correlation_id, CommandLifecycle::Failure, 0)
        }
    }

    fn now_unix_ms() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn command_lifecycle(
    command: &str,
    correlation_id: &str,
    lifecycle: CommandLifecycle,
    affected: usize,
) -> CommandTelemetry {
    let telemetry = CommandTelemetry::new(command, correlation_id, lifecycle, affected);
    info!(
        target: TELEMETRY_TARGET,
        command = %telemetry.command,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        affected = telemetry.affected,
        timestamp_ms = CommandTelemetry::now_unix_ms(),
        "{}",
        telemetry.lifecycle
    );
    telemetry
}

pub fn command_failure(command: &str, correlation_id: &str, reason: String) -> CommandTelemetry {
    let telemetry = CommandTelemetry::failure(command, correlation_id, reason);
    let error_reason = telemetry.error_reason.as_deref().unwrap_or("unclassified");

    error!(
        target: TELEMETRY_TARGET,
        command = %telemetry.command,
        correlation_id = %telemetry.correlation_id,
        lifecycle = %telemetry.lifecycle,
        error = %error_reason,
        timestamp_ms = CommandTelemetry::now_unix_ms(),
        "command_failure"
    );

    telemetry
}

pub fn debug_context(command: &str, correlation_id: &str, context: &str) {
    debug!(
        target: TELEMETRY_TARGET,
        command = %command,
        correlation_id = %correlation_id,
        context = %context,
        "command_context"
    );
}
