//! rufw - command-line control for the UFW firewall
//!
//! A thin, safe front-end over the host `ufw` tool. Every subcommand maps
//! 1:1 onto one firewall operation:
//!
//! ```bash
//! rufw status            # Current firewall status
//! rufw rules             # Full rule listing (status verbose)
//! rufw enable            # Turn the firewall on
//! rufw disable           # Turn the firewall off
//! rufw toggle            # Flip the current state
//! rufw allow 8080        # Allow traffic on a port
//! rufw deny 8080         # Block traffic on a port
//! rufw delete 8080       # Delete any rule for a port (allow and deny)
//! ```
//!
//! # Security
//!
//! Runs as an unprivileged user and elevates per invocation via
//! run0/sudo/pkexec. The port argument is validated before any command is
//! constructed. Privileged operations are written to an audit trail.

use clap::{Parser, Subcommand};
use rufw::core::error::UfwErrorPattern;
use rufw::{Gateway, audit, config};
use shadow_rs::shadow;
use std::process::ExitCode;

shadow!(build);

#[derive(Parser)]
#[command(name = "rufw")]
#[command(about = "Command-line control for the UFW firewall", long_about = None)]
#[command(version = build::CLAP_LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current firewall status
    Status {
        /// Show the full verbose status regardless of configuration
        #[arg(short, long)]
        verbose: bool,
    },
    /// Display all active firewall rules
    Rules,
    /// Enable the firewall
    Enable,
    /// Disable the firewall
    Disable,
    /// Toggle the firewall on or off
    Toggle,
    /// Allow traffic on a specific port
    Allow {
        /// Port number (1-65535)
        #[arg(value_parser = rufw::validators::parse_port)]
        port: u16,
    },
    /// Block traffic on a specific port
    Deny {
        /// Port number (1-65535)
        #[arg(value_parser = rufw::validators::parse_port)]
        port: u16,
    },
    /// Delete an existing port rule (attempts both allow and deny variants)
    Delete {
        /// Port number (1-65535)
        #[arg(value_parser = rufw::validators::parse_port)]
        port: u16,
    },
    /// Show or change persisted settings
    Config {
        /// Use verbose output for the plain status command
        #[arg(long, value_name = "BOOL")]
        verbose_status: Option<bool>,
        /// Record privileged operations in the audit trail
        #[arg(long, value_name = "BOOL")]
        audit_log: Option<bool>,
    },
}

fn main() -> ExitCode {
    let _ = rufw::utils::ensure_dirs();
    init_logging();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    match runtime.block_on(handle_cli(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let translation = UfwErrorPattern::match_error(&e.to_string());
            eprintln!("Error: {}", translation.user_message);
            for suggestion in &translation.suggestions {
                eprintln!("  hint: {suggestion}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Set up logging to a file in the state directory, falling back to stderr
fn init_logging() {
    if let Some(mut log_path) = rufw::utils::get_state_dir() {
        log_path.push("rufw.log");
        if let Ok(file) = std::fs::File::create(log_path) {
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .init();
            return;
        }
    }
    tracing_subscriber::fmt::init();
}

async fn handle_cli(command: Commands) -> rufw::Result<()> {
    let config = config::load_config().await;

    // Settings are managed without touching the firewall tool
    if let Commands::Config {
        verbose_status,
        audit_log,
    } = command
    {
        return handle_config(config, verbose_status, audit_log).await;
    }

    // Availability check happens here; no operation runs if ufw is missing
    let mut gateway = Gateway::connect().await?;

    match command {
        Commands::Status { verbose } => {
            let text = if verbose || config.verbose_status {
                gateway.verbose_status().await?
            } else {
                gateway.status_text().await?
            };
            println!("{text}");
            println!();
            println!(
                "Firewall is currently {}",
                if gateway.is_enabled() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        Commands::Rules => {
            let rules = gateway.verbose_status().await?;
            println!("{rules}");
        }
        Commands::Enable => {
            let result = gateway.enable().await;
            if config.enable_audit_log {
                audit::log_toggle(
                    true,
                    result.is_ok(),
                    result.as_ref().err().map(ToString::to_string),
                )
                .await;
            }
            let outcome = result?;
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            println!("Firewall enabled successfully");
        }
        Commands::Disable => {
            let result = gateway.disable().await;
            if config.enable_audit_log {
                audit::log_toggle(
                    false,
                    result.is_ok(),
                    result.as_ref().err().map(ToString::to_string),
                )
                .await;
            }
            let outcome = result?;
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            println!("Firewall disabled successfully");
        }
        Commands::Toggle => {
            let enabling = !gateway.is_enabled();
            let result = gateway.toggle().await;
            if config.enable_audit_log {
                audit::log_toggle(
                    enabling,
                    result.is_ok(),
                    result.as_ref().err().map(ToString::to_string),
                )
                .await;
            }
            let outcome = result?;
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            println!(
                "Firewall {} successfully",
                if enabling { "enabled" } else { "disabled" }
            );
        }
        Commands::Allow { port } => {
            let result = gateway.allow_port(port).await;
            if config.enable_audit_log {
                audit::log_port_rule(
                    audit::EventType::AllowPort,
                    port,
                    result.is_ok(),
                    result.as_ref().err().map(ToString::to_string),
                )
                .await;
            }
            let outcome = result?;
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            println!("Port {port} allowed successfully");
        }
        Commands::Deny { port } => {
            let result = gateway.deny_port(port).await;
            if config.enable_audit_log {
                audit::log_port_rule(
                    audit::EventType::DenyPort,
                    port,
                    result.is_ok(),
                    result.as_ref().err().map(ToString::to_string),
                )
                .await;
            }
            let outcome = result?;
            if !outcome.stdout.is_empty() {
                println!("{}", outcome.stdout);
            }
            println!("Port {port} blocked successfully");
        }
        Commands::Delete { port } => {
            let result = gateway.delete_port(port).await;
            if config.enable_audit_log {
                match &result {
                    Ok(outcome) => audit::log_delete(port, outcome.any_deleted(), None).await,
                    Err(e) => audit::log_delete(port, false, Some(e.to_string())).await,
                }
            }
            let outcome = result?;
            if outcome.any_deleted() {
                println!("Port {port} rule deleted");
            } else {
                println!("No existing rule for port {port} (nothing to delete)");
            }
        }
        Commands::Config { .. } => unreachable!("handled before gateway construction"),
    }
    Ok(())
}

/// Show the persisted settings, or update and save them when flags are given
async fn handle_config(
    mut config: config::AppConfig,
    verbose_status: Option<bool>,
    audit_log: Option<bool>,
) -> rufw::Result<()> {
    if verbose_status.is_none() && audit_log.is_none() {
        println!("verbose-status = {}", config.verbose_status);
        println!("audit-log = {}", config.enable_audit_log);
        return Ok(());
    }

    if let Some(value) = verbose_status {
        config.verbose_status = value;
    }
    if let Some(value) = audit_log {
        config.enable_audit_log = value;
    }

    config::save_config(&config).await?;
    println!("Settings saved");
    Ok(())
}
