use thiserror::Error;

/// Core error types for rufw
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ufw is not installed or cannot be invoked
    #[error("ufw unavailable: {0}")]
    ToolUnavailable(String),

    /// ufw command execution failed (non-zero exit on an error-intolerant intent)
    ///
    /// Privilege denial also surfaces here: the elevation helper exits
    /// non-zero and its error text is opaque to the gateway.
    #[error("ufw error: {message}")]
    ExecutionFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    /// Input validation failed
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// Privilege escalation failed
    #[error("Elevation error: {0}")]
    Elevation(String),
}

/// Represents a translated error with helpful context
#[derive(Debug, Clone)]
pub struct ErrorTranslation {
    pub user_message: String,
    pub suggestions: Vec<String>,
}

impl ErrorTranslation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            user_message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Database of ufw error patterns and their translations
pub struct UfwErrorPattern;

impl UfwErrorPattern {
    /// Matches an error message against known patterns and returns a user-friendly translation.
    pub fn match_error(msg: &str) -> ErrorTranslation {
        let lower = msg.to_lowercase();

        // Permission errors (pkexec/sudo denied, or ufw run unprivileged)
        if lower.contains("permission denied")
            || lower.contains("operation not permitted")
            || lower.contains("you need to be root")
        {
            return ErrorTranslation::new("Insufficient permissions to modify the firewall")
                .with_suggestion("ufw requires root privileges for this operation")
                .with_suggestion("Check that sudo or pkexec is configured for your user")
                .with_suggestion("Force a method with RUFW_ELEVATION_METHOD=sudo if needed");
        }

        // Missing ufw
        if lower.contains("no such file") || lower.contains("command not found") {
            return ErrorTranslation::new("ufw is not installed or not found in PATH")
                .with_suggestion("Install ufw: sudo apt install ufw  (Debian/Ubuntu)")
                .with_suggestion("Or: sudo dnf install ufw  (Fedora)")
                .with_suggestion("Or: sudo pacman -S ufw  (Arch)");
        }

        // Port errors
        if lower.contains("bad port") || (lower.contains("port") && lower.contains("invalid")) {
            return ErrorTranslation::new("Invalid port in rule")
                .with_suggestion("Port numbers must be between 1 and 65535");
        }

        // Duplicate rule
        if lower.contains("skipping adding existing rule") || lower.contains("already exists") {
            return ErrorTranslation::new("An identical rule already exists")
                .with_suggestion("Check the current rules: rufw rules");
        }

        // Deleting a rule that isn't there
        if lower.contains("could not delete non-existent rule") {
            return ErrorTranslation::new("No matching rule to delete")
                .with_suggestion("Check the current rules: rufw rules");
        }

        // iptables backend trouble
        if lower.contains("iptables") || lower.contains("netfilter") {
            return ErrorTranslation::new("ufw's iptables backend reported an error")
                .with_suggestion("Check the kernel modules: lsmod | grep ip_tables")
                .with_suggestion("Inspect the full output: sudo ufw status verbose");
        }

        // Generic fallback
        ErrorTranslation::new(format!("Firewall error: {msg}"))
            .with_suggestion("Check the detailed error message for more information")
            .with_suggestion("Verify ufw is working: sudo ufw status")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command() {
        let translation = UfwErrorPattern::match_error("command not found: ufw");
        assert!(translation.user_message.contains("not installed"));
        assert!(translation.suggestions.len() >= 3); // Multiple distro options
    }

    #[test]
    fn test_permission_denied() {
        let translation = UfwErrorPattern::match_error("ERROR: You need to be root to run this script");
        assert!(translation.user_message.contains("permissions"));
        assert!(translation.suggestions.iter().any(|s| s.contains("root")));
    }

    #[test]
    fn test_nonexistent_rule() {
        let translation = UfwErrorPattern::match_error("Could not delete non-existent rule");
        assert!(translation.user_message.contains("No matching rule"));
    }

    #[test]
    fn test_bad_port() {
        let translation = UfwErrorPattern::match_error("ERROR: Bad port");
        assert!(translation.suggestions.iter().any(|s| s.contains("65535")));
    }

    #[test]
    fn test_generic_fallback() {
        let translation = UfwErrorPattern::match_error("something unexpected");
        assert!(translation.user_message.contains("something unexpected"));
        assert!(!translation.suggestions.is_empty());
    }

    #[test]
    fn test_execution_failed_display() {
        let err = Error::ExecutionFailed {
            message: "exit status 1".to_string(),
            stderr: Some("ERROR: Bad port".to_string()),
            exit_code: Some(1),
        };
        assert!(err.to_string().contains("exit status 1"));
    }
}
