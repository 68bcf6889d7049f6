/// Audit logging for privileged firewall operations
///
/// This module provides structured logging of every mutating ufw invocation:
/// enable/disable toggles and rule additions, blocks, and deletions.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Types of auditable events
#[derive(Debug, Clone, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    EnableFirewall,
    DisableFirewall,
    AllowPort,
    DenyPort,
    DeleteRule,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event occurred (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Type of event
    pub event_type: EventType,

    /// Whether the operation succeeded
    pub success: bool,

    /// Additional structured data about the event
    pub details: serde_json::Value,

    /// Error message if operation failed
    pub error: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event
    pub fn new(
        event_type: EventType,
        success: bool,
        details: serde_json::Value,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            event_type,
            success,
            details,
            error,
        }
    }
}

/// Audit log writer
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Creates a new audit log instance
    ///
    /// # Errors
    ///
    /// Returns `Err` if state directory cannot be determined
    pub fn new() -> std::io::Result<Self> {
        let mut log_path = crate::utils::get_state_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "State directory not found")
        })?;
        log_path.push("audit.log");

        Ok(Self { log_path })
    }

    /// Appends an event to the audit log
    ///
    /// Events are written as JSON-lines format (one JSON object per line)
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be opened or written
    pub async fn log(&self, event: AuditEvent) -> std::io::Result<()> {
        let json = serde_json::to_string(&event)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.sync_all().await?;

        Ok(())
    }

    /// Returns the path to the audit log file
    #[allow(dead_code)]
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

/// Logs an enable/disable toggle
pub async fn log_toggle(enabled: bool, success: bool, error: Option<String>) {
    let event_type = if enabled {
        EventType::EnableFirewall
    } else {
        EventType::DisableFirewall
    };

    log_event(AuditEvent::new(
        event_type,
        success,
        serde_json::json!({}),
        error,
    ))
    .await;
}

/// Logs a port rule addition (allow or deny)
pub async fn log_port_rule(
    event_type: EventType,
    port: u16,
    success: bool,
    error: Option<String>,
) {
    log_event(AuditEvent::new(
        event_type,
        success,
        serde_json::json!({ "port": port }),
        error,
    ))
    .await;
}

/// Logs a rule deletion (both the allow and deny variants are attempted)
pub async fn log_delete(port: u16, any_deleted: bool, error: Option<String>) {
    log_event(AuditEvent::new(
        EventType::DeleteRule,
        error.is_none(),
        serde_json::json!({ "port": port, "any_deleted": any_deleted }),
        error,
    ))
    .await;
}

async fn log_event(event: AuditEvent) {
    if let Ok(audit) = AuditLog::new()
        && let Err(e) = audit.log(event).await
    {
        tracing::warn!("Failed to write audit log: {}", e);
    }
}
