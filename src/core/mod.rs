//! Core gateway functionality
//!
//! This module contains the types and logic for driving the external `ufw`
//! tool. It provides:
//!
//! - [`gateway`]: Intent-to-command translation, execution, and state mirroring
//! - [`status`]: Parsing of ufw's textual status output
//! - [`error`]: Error types for gateway operations

pub mod error;
pub mod gateway;
pub mod status;

#[cfg(test)]
pub mod test_helpers;
