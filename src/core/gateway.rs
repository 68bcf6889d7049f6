//! The firewall command gateway
//!
//! Translates high-level intents (enable, disable, status queries, port
//! rules) into elevated invocations of the external `ufw` binary, captures
//! output and exit status, and mirrors the firewall's enabled state.
//!
//! # State Mirroring
//!
//! [`Gateway`] owns a single `enabled` boolean. It is read from the tool at
//! construction and re-read after every enable/disable, never assumed from
//! the success of a mutating command.
//!
//! # Error Tolerance
//!
//! Delete intents are error-tolerant: deleting a rule that does not exist
//! is an expected no-op, so a non-zero exit is reported in the outcome
//! instead of raised as an error. All other intents treat non-zero exit as
//! [`Error::ExecutionFailed`].

use crate::core::error::{Error, Result};
use crate::core::status;
use crate::elevation;
use crate::validators;
use std::fmt;
use tracing::{debug, info, warn};

/// One firewall operation the gateway can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Enable,
    Disable,
    Status,
    StatusVerbose,
    AllowPort(u16),
    DenyPort(u16),
    DeleteAllow(u16),
    DeleteDeny(u16),
}

impl Intent {
    /// The argument vector passed to `ufw` for this intent.
    pub fn args(&self) -> Vec<String> {
        match self {
            Intent::Enable => vec!["enable".into()],
            Intent::Disable => vec!["disable".into()],
            Intent::Status => vec!["status".into()],
            Intent::StatusVerbose => vec!["status".into(), "verbose".into()],
            Intent::AllowPort(port) => vec!["allow".into(), port.to_string()],
            Intent::DenyPort(port) => vec!["deny".into(), port.to_string()],
            Intent::DeleteAllow(port) => {
                vec!["delete".into(), "allow".into(), port.to_string()]
            }
            Intent::DeleteDeny(port) => {
                vec!["delete".into(), "deny".into(), port.to_string()]
            }
        }
    }

    /// Whether a non-zero exit is an expected no-op rather than an error.
    ///
    /// True only for the delete intents: ufw fails them when no matching
    /// rule exists, which is not a real error from the caller's view.
    pub fn error_tolerant(&self) -> bool {
        matches!(self, Intent::DeleteAllow(_) | Intent::DeleteDeny(_))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ufw {}", self.args().join(" "))
    }
}

/// The captured outcome of one external tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl From<std::process::Output> for CommandOutcome {
    fn from(output: std::process::Output) -> Self {
        Self {
            succeeded: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
        }
    }
}

/// Combined outcome of a "delete rule" request, which always attempts both
/// the allow and the deny variant of the rule.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub allow: CommandOutcome,
    pub deny: CommandOutcome,
}

impl DeleteOutcome {
    /// True if at least one of the two delete attempts removed a rule.
    pub fn any_deleted(&self) -> bool {
        self.allow.succeeded || self.deny.succeeded
    }
}

/// Gateway to the external `ufw` tool.
///
/// Constructed via [`Gateway::connect`], which verifies the tool is
/// installed before any operation may run.
#[derive(Debug)]
pub struct Gateway {
    enabled: bool,
}

impl Gateway {
    /// Connects to the external tool: verifies `ufw` is invocable and reads
    /// the initial firewall state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolUnavailable`] if `ufw --version` cannot be run
    /// or exits non-zero. Callers must not attempt any operation after
    /// construction fails.
    pub async fn connect() -> Result<Self> {
        Self::check_available().await?;

        let mut gateway = Self { enabled: false };
        gateway.refresh().await?;
        Ok(gateway)
    }

    /// Verifies the external tool is installed and invocable.
    ///
    /// Runs `ufw --version` without elevation; ufw answers version queries
    /// unprivileged.
    async fn check_available() -> Result<()> {
        let output = elevation::create_unelevated_ufw_command(&["--version"])
            .output()
            .await
            .map_err(|e| Error::ToolUnavailable(format!("failed to invoke ufw: {e}")))?;

        if output.status.success() {
            debug!(
                "ufw available: {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            Ok(())
        } else {
            Err(Error::ToolUnavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }

    /// The last observed firewall state.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Re-reads the firewall state from the tool and updates the mirror.
    pub async fn refresh(&mut self) -> Result<bool> {
        let outcome = self.dispatch(&Intent::Status).await?;
        self.enabled = status::parse_enabled(&outcome.stdout);
        debug!(enabled = self.enabled, "firewall state refreshed");
        Ok(self.enabled)
    }

    /// Executes one intent against the external tool and waits for it to
    /// exit.
    ///
    /// # Errors
    ///
    /// - [`Error::Elevation`] if no elevation helper is available
    /// - [`Error::Io`] if the subprocess cannot be spawned
    /// - [`Error::ExecutionFailed`] on non-zero exit, unless the intent is
    ///   error-tolerant, in which case the failed outcome is returned
    pub async fn dispatch(&self, intent: &Intent) -> Result<CommandOutcome> {
        let args = intent.args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        info!(%intent, "executing firewall command");

        let output = elevation::create_elevated_ufw_command(&arg_refs)
            .map_err(|e| Error::Elevation(e.to_string()))?
            .output()
            .await?;

        let outcome = CommandOutcome::from(output);

        if outcome.succeeded {
            debug!(%intent, "command succeeded");
            Ok(outcome)
        } else if intent.error_tolerant() {
            warn!(
                %intent,
                exit_code = ?outcome.exit_code,
                "tolerated command failure (expected no-op)"
            );
            Ok(outcome)
        } else {
            warn!(%intent, exit_code = ?outcome.exit_code, "command failed");
            Err(Error::ExecutionFailed {
                message: if outcome.stderr.is_empty() {
                    format!("'{intent}' exited with status {:?}", outcome.exit_code)
                } else {
                    outcome.stderr.clone()
                },
                stderr: Some(outcome.stderr),
                exit_code: outcome.exit_code,
            })
        }
    }

    /// Enables the firewall and re-reads the resulting state.
    ///
    /// A failed re-read does not fail the operation: the toggle already took
    /// effect, so the failure is logged and the mirror keeps its last
    /// observation until the next successful status read.
    pub async fn enable(&mut self) -> Result<CommandOutcome> {
        let outcome = self.dispatch(&Intent::Enable).await?;
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "state re-read failed after enable");
        }
        Ok(outcome)
    }

    /// Disables the firewall and re-reads the resulting state.
    ///
    /// A failed re-read is logged, not propagated. See [`Gateway::enable`].
    pub async fn disable(&mut self) -> Result<CommandOutcome> {
        let outcome = self.dispatch(&Intent::Disable).await?;
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "state re-read failed after disable");
        }
        Ok(outcome)
    }

    /// Enables the firewall if it is disabled, disables it otherwise.
    pub async fn toggle(&mut self) -> Result<CommandOutcome> {
        if self.enabled {
            self.disable().await
        } else {
            self.enable().await
        }
    }

    /// Returns the raw `ufw status` text, updating the state mirror.
    pub async fn status_text(&mut self) -> Result<String> {
        let outcome = self.dispatch(&Intent::Status).await?;
        self.enabled = status::parse_enabled(&outcome.stdout);
        Ok(outcome.stdout)
    }

    /// Returns the raw `ufw status verbose` text (full rule listing).
    pub async fn verbose_status(&self) -> Result<String> {
        let outcome = self.dispatch(&Intent::StatusVerbose).await?;
        Ok(outcome.stdout)
    }

    /// Allows traffic on a port.
    pub async fn allow_port(&self, port: u16) -> Result<CommandOutcome> {
        let port = validated(port)?;
        self.dispatch(&Intent::AllowPort(port)).await
    }

    /// Blocks traffic on a port.
    pub async fn deny_port(&self, port: u16) -> Result<CommandOutcome> {
        let port = validated(port)?;
        self.dispatch(&Intent::DenyPort(port)).await
    }

    /// Deletes any rule for a port, attempting both the allow and the deny
    /// variant regardless of whether either individually fails.
    pub async fn delete_port(&self, port: u16) -> Result<DeleteOutcome> {
        let port = validated(port)?;

        // Both intents run before either result is inspected
        let allow = self.dispatch(&Intent::DeleteAllow(port)).await;
        let deny = self.dispatch(&Intent::DeleteDeny(port)).await;

        Ok(DeleteOutcome {
            allow: allow?,
            deny: deny?,
        })
    }
}

/// Rejects out-of-range ports before they reach the external tool.
fn validated(port: u16) -> Result<u16> {
    validators::validate_port(port).map_err(|message| Error::Validation {
        field: "port".to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intent_argument_mapping() {
        assert_eq!(Intent::Enable.args(), ["enable"]);
        assert_eq!(Intent::Disable.args(), ["disable"]);
        assert_eq!(Intent::Status.args(), ["status"]);
        assert_eq!(Intent::StatusVerbose.args(), ["status", "verbose"]);
        assert_eq!(Intent::AllowPort(8080).args(), ["allow", "8080"]);
        assert_eq!(Intent::DenyPort(443).args(), ["deny", "443"]);
        assert_eq!(Intent::DeleteAllow(22).args(), ["delete", "allow", "22"]);
        assert_eq!(Intent::DeleteDeny(22).args(), ["delete", "deny", "22"]);
    }

    #[test]
    fn test_only_deletes_are_error_tolerant() {
        assert!(Intent::DeleteAllow(80).error_tolerant());
        assert!(Intent::DeleteDeny(80).error_tolerant());
        assert!(!Intent::Enable.error_tolerant());
        assert!(!Intent::Disable.error_tolerant());
        assert!(!Intent::Status.error_tolerant());
        assert!(!Intent::StatusVerbose.error_tolerant());
        assert!(!Intent::AllowPort(80).error_tolerant());
        assert!(!Intent::DenyPort(80).error_tolerant());
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::AllowPort(8080).to_string(), "ufw allow 8080");
        assert_eq!(Intent::StatusVerbose.to_string(), "ufw status verbose");
    }

    #[test]
    fn test_delete_outcome_any_deleted() {
        let hit = CommandOutcome {
            succeeded: true,
            stdout: "Rule deleted".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        let miss = CommandOutcome {
            succeeded: false,
            stdout: String::new(),
            stderr: "Could not delete non-existent rule".to_string(),
            exit_code: Some(1),
        };

        let outcome = DeleteOutcome {
            allow: hit.clone(),
            deny: miss.clone(),
        };
        assert!(outcome.any_deleted());

        let outcome = DeleteOutcome {
            allow: miss.clone(),
            deny: miss,
        };
        assert!(!outcome.any_deleted());
    }

    #[test]
    fn test_port_zero_rejected_before_dispatch() {
        assert!(matches!(
            validated(0),
            Err(Error::Validation { field, .. }) if field == "port"
        ));
    }

    proptest! {
        #[test]
        fn prop_allow_args_for_all_ports(port in 1u16..=65535) {
            let expected = vec!["allow".to_string(), port.to_string()];
            prop_assert_eq!(Intent::AllowPort(port).args(), expected);
        }

        #[test]
        fn prop_deny_args_for_all_ports(port in 1u16..=65535) {
            let expected = vec!["deny".to_string(), port.to_string()];
            prop_assert_eq!(Intent::DenyPort(port).args(), expected);
        }

        #[test]
        fn prop_valid_ports_pass_gateway_validation(port in 1u16..=65535) {
            prop_assert!(validated(port).is_ok());
        }
    }
}
