//! Input validation for rufw
//!
//! Centralized validation for user-supplied port numbers. Every port must
//! pass validation before an intent is dispatched to the gateway.

/// Validates a single port number.
///
/// The `u16` type already bounds the upper end at 65535; the only invalid
/// value left is 0 (reserved).
///
/// # Errors
///
/// Returns `Err` if port is 0.
pub fn validate_port(port: u16) -> Result<u16, String> {
    if port == 0 {
        Err("Port must be between 1 and 65535".to_string())
    } else {
        Ok(port)
    }
}

/// Parses and validates a port number from user input.
///
/// # Errors
///
/// Returns `Err` if the input is not a number in [1, 65535].
pub fn parse_port(input: &str) -> Result<u16, String> {
    let port: u16 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{input}' is not a valid port number (1-65535)"))?;
    validate_port(port)
}
