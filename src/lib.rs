//! rufw - a command-line front-end for the UFW firewall
//!
//! Translates high-level intents (enable, disable, status queries, allow,
//! deny, delete) into elevated invocations of the external `ufw` tool and
//! reports the captured outcome.
//!
//! # Architecture
//!
//! - [`core`] - The command gateway, status parsing, and error types
//! - [`elevation`] - Privilege escalation (run0/sudo/pkexec)
//! - [`audit`] - Audit logging for all privileged operations
//! - [`validators`] - Port input validation
//! - [`config`] - Configuration persistence
//! - [`utils`] - Utility functions (XDG directories)
//!
//! # Safety Features
//!
//! - Tool availability verified before any operation
//! - Runs as unprivileged user, elevates per invocation
//! - Ports validated before reaching the external tool
//! - Firewall state mirrored from the tool's own output, never assumed
//! - Audit trail of all privileged operations

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

pub mod audit;
pub mod config;
pub mod core;
pub mod elevation;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::error::{Error, Result};
pub use core::gateway::{CommandOutcome, DeleteOutcome, Gateway, Intent};
