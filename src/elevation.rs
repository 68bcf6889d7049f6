//! Privilege elevation for firewall operations
//!
//! rufw runs as an unprivileged user and only elevates to execute the
//! external `ufw` binary. The availability check (`ufw --version`) runs
//! without elevation; every firewall intent runs elevated.
//!
//! # Elevation Strategy
//!
//! - **Preferred (all modes)**: Uses `run0` when available (systemd v256+, no SUID, better security)
//! - **Terminal fallback**: Uses `sudo` when stdin is a TTY
//! - **Desktop fallback**: Uses `pkexec` for graphical authentication
//!
//! # Environment Variables
//!
//! - `RUFW_ELEVATION_METHOD`: Force a specific elevation method (`sudo`, `run0`, or `pkexec`).
//!   Useful for scripts with sudoers NOPASSWD rules where you want to bypass run0/polkit.
//!   Example: `RUFW_ELEVATION_METHOD=sudo rufw enable`
//!
//! - `RUFW_TEST_NO_ELEVATION`: Bypass elevation entirely (for testing only).
//!
//! - `RUFW_UFW_COMMAND`: Override the ufw binary path. Lets the test suite
//!   point the gateway at a mock script instead of the real tool.
//!
//! # Security
//!
//! - Only the `ufw` binary can be elevated
//! - All inputs are validated before elevation
//! - Commands are constructed safely without shell interpolation
//! - Elevation helpers (run0/sudo/pkexec) are checked for availability

use std::io;
use tokio::process::Command;

/// Error type for privilege elevation operations
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    /// pkexec binary not found in PATH
    #[error("pkexec not found - please install PolicyKit")]
    PkexecNotFound,

    /// Requested elevation method is not available (binary not found)
    #[error("Elevation method '{0}' is not available (binary not found)")]
    MethodNotAvailable(String),

    /// Invalid value for `RUFW_ELEVATION_METHOD`
    #[error("Invalid RUFW_ELEVATION_METHOD '{0}'. Valid options: sudo, run0, pkexec")]
    InvalidMethod(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resolves the ufw binary to invoke.
///
/// Honors `RUFW_UFW_COMMAND` so tests can substitute a mock script;
/// defaults to `ufw` resolved through PATH.
pub fn ufw_binary() -> String {
    std::env::var("RUFW_UFW_COMMAND").unwrap_or_else(|_| "ufw".to_string())
}

/// Checks if a binary exists in PATH
///
/// # Arguments
///
/// * `name` - Binary name to search for (e.g., "pkexec", "ufw")
///
/// # Returns
///
/// `true` if the binary is found in PATH, `false` otherwise
fn binary_exists(name: &str) -> bool {
    // Absolute or relative paths (e.g. a mock script) are checked directly
    if name.contains('/') {
        return std::path::Path::new(name).is_file();
    }

    std::env::var_os("PATH")
        .and_then(|paths| {
            std::env::split_paths(&paths).find_map(|dir| {
                let full_path = dir.join(name);
                if full_path.is_file() {
                    Some(full_path)
                } else {
                    None
                }
            })
        })
        .is_some()
}

/// Internal helper to build an elevated command for a specific program.
///
/// Not exposed publicly - callers must use [`create_elevated_ufw_command`]
/// to ensure only the approved binary can be elevated.
fn build_elevated_command(program: &str, args: &[&str]) -> Result<Command, ElevationError> {
    use std::os::fd::AsFd;

    // 1. Strict Test Mode Override (Highest Priority)
    if std::env::var("RUFW_TEST_NO_ELEVATION").is_ok() {
        let mut cmd = Command::new(program);
        cmd.args(args);
        return Ok(cmd);
    }

    // 2. Explicit elevation method override (for scripts with sudoers NOPASSWD, etc.)
    //    Takes precedence over the root short-circuit so an explicit request
    //    is always honored.
    if let Ok(method) = std::env::var("RUFW_ELEVATION_METHOD") {
        let method = method.to_lowercase();
        if !method.is_empty() {
            return match method.as_str() {
                "sudo" => {
                    if !binary_exists("sudo") {
                        return Err(ElevationError::MethodNotAvailable("sudo".into()));
                    }
                    let mut cmd = Command::new("sudo");
                    cmd.arg(program).args(args);
                    Ok(cmd)
                }
                "run0" => {
                    if !binary_exists("run0") {
                        return Err(ElevationError::MethodNotAvailable("run0".into()));
                    }
                    let mut cmd = Command::new("run0");
                    cmd.arg(program).args(args);
                    Ok(cmd)
                }
                "pkexec" => {
                    if !binary_exists("pkexec") {
                        return Err(ElevationError::MethodNotAvailable("pkexec".into()));
                    }
                    let mut cmd = Command::new("pkexec");
                    cmd.arg(program).args(args);
                    Ok(cmd)
                }
                _ => Err(ElevationError::InvalidMethod(method)),
            };
        }
    }

    // 3. Direct Root Execution (No prompt needed)
    let is_root = nix::unistd::getuid().is_root();
    if is_root {
        let mut cmd = Command::new(program);
        cmd.args(args);
        return Ok(cmd);
    }

    // 4. Automatic detection - prefer run0 (modern, no SUID), fallback to sudo/pkexec

    // Prefer run0 everywhere when available (better security, no SUID bit)
    if binary_exists("run0") {
        let mut cmd = Command::new("run0");
        cmd.arg(program).args(args);
        return Ok(cmd);
    }

    // Fall back based on environment when run0 not available
    let is_atty = nix::unistd::isatty(std::io::stdin().as_fd()).unwrap_or(false);

    if is_atty {
        // Terminal: Standard sudo elevation
        let mut cmd = Command::new("sudo");
        cmd.arg(program).args(args);
        Ok(cmd)
    } else {
        // Desktop session: pkexec elevation
        if !binary_exists("pkexec") {
            return Err(ElevationError::PkexecNotFound);
        }

        let mut cmd = Command::new("pkexec");
        cmd.arg(program).args(args);
        Ok(cmd)
    }
}

/// Creates an elevated `ufw` command with the specified arguments
///
/// Constructs a command that will execute `ufw` with root privileges. The
/// arguments are passed directly without shell interpretation, preventing
/// command injection.
///
/// # Arguments
///
/// * `args` - Command-line arguments to pass to `ufw` (e.g. `["allow", "8080"]`)
///
/// # Returns
///
/// - `Ok(Command)` - Configured tokio Command ready to spawn
/// - `Err(ElevationError)` - If no elevation helper is available
///
/// # Testing
///
/// Set `RUFW_TEST_NO_ELEVATION=1` to bypass run0/sudo/pkexec and run the
/// (possibly mocked) ufw binary directly.
pub fn create_elevated_ufw_command(args: &[&str]) -> Result<Command, ElevationError> {
    build_elevated_command(&ufw_binary(), args)
}

/// Creates an unelevated `ufw` command.
///
/// Used only for the availability check (`ufw --version`), which ufw
/// answers without privileges.
pub fn create_unelevated_ufw_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(ufw_binary());
    cmd.args(args);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_helpers::ENV_VAR_MUTEX;

    #[test]
    fn test_binary_exists() {
        // sh should exist on all Unix systems
        assert!(binary_exists("sh"));
        // This should not exist
        assert!(!binary_exists("rufw_nonexistent_binary_xyz"));
    }

    #[test]
    fn test_ufw_binary_default() {
        let _guard = ENV_VAR_MUTEX.lock().unwrap();

        unsafe {
            std::env::remove_var("RUFW_UFW_COMMAND");
        }
        assert_eq!(ufw_binary(), "ufw");
    }

    #[test]
    fn test_ufw_binary_override() {
        let _guard = ENV_VAR_MUTEX.lock().unwrap();

        unsafe {
            std::env::set_var("RUFW_UFW_COMMAND", "/tmp/mock_ufw.sh");
        }
        assert_eq!(ufw_binary(), "/tmp/mock_ufw.sh");
        unsafe {
            std::env::remove_var("RUFW_UFW_COMMAND");
        }
    }

    #[tokio::test]
    async fn test_create_ufw_command_test_mode() {
        let _guard = ENV_VAR_MUTEX.lock().unwrap();

        // Set test mode
        unsafe {
            std::env::set_var("RUFW_TEST_NO_ELEVATION", "1");
        }

        let cmd = create_elevated_ufw_command(&["status"]);
        assert!(cmd.is_ok());
    }

    #[test]
    fn test_invalid_elevation_method() {
        let _guard = ENV_VAR_MUTEX.lock().unwrap();

        // Clear test mode and set invalid method
        unsafe {
            std::env::remove_var("RUFW_TEST_NO_ELEVATION");
            std::env::set_var("RUFW_ELEVATION_METHOD", "invalid_method");
        }

        let result = create_elevated_ufw_command(&["status"]);

        // Restore test mode for other tests
        unsafe {
            std::env::set_var("RUFW_TEST_NO_ELEVATION", "1");
            std::env::remove_var("RUFW_ELEVATION_METHOD");
        }

        assert!(matches!(result, Err(ElevationError::InvalidMethod(_))));
    }

    #[test]
    fn test_elevation_method_case_insensitive() {
        let _guard = ENV_VAR_MUTEX.lock().unwrap();

        // sudo should exist on most systems, so this tests case insensitivity
        unsafe {
            std::env::remove_var("RUFW_TEST_NO_ELEVATION");
            std::env::set_var("RUFW_ELEVATION_METHOD", "SUDO");
        }

        let result = create_elevated_ufw_command(&["status"]);

        // Restore test mode
        unsafe {
            std::env::set_var("RUFW_TEST_NO_ELEVATION", "1");
            std::env::remove_var("RUFW_ELEVATION_METHOD");
        }

        // Should succeed (sudo exists) or fail with MethodNotAvailable (sudo doesn't exist)
        // but NOT InvalidMethod
        assert!(!matches!(result, Err(ElevationError::InvalidMethod(_))));
    }
}
