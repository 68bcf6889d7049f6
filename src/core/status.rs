//! Status-text parsing for ufw output
//!
//! ufw reports its state as free text ("Status: active" / "Status: inactive")
//! rather than anything structured, so the enabled flag is derived from a
//! substring heuristic. The check is case-insensitive and tests for
//! "inactive" before "active" - "inactive" contains "active" as a substring,
//! so a naive containment check would report a stopped firewall as running.

/// Derives the firewall's enabled state from raw `ufw status` output.
///
/// # Examples
///
/// ```
/// use rufw::core::status::parse_enabled;
///
/// assert!(parse_enabled("Status: active"));
/// assert!(!parse_enabled("Status: inactive"));
/// ```
pub fn parse_enabled(status_text: &str) -> bool {
    let lower = status_text.to_lowercase();
    if lower.contains("inactive") {
        return false;
    }
    lower.contains("active")
}
