//! permcheck - grant permission patterns to a token and check queries against it
//!
//! ```text
//! permcheck --grant 'hello.world@env=prod' check hello.world 'hello.world@env=dev'
//! permcheck --config grants.toml tree
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod config;

use config::CheckerConfig;

/// Permission pattern checker CLI
#[derive(Parser)]
#[command(name = "permcheck")]
#[command(about = "Check permission patterns against a set of grants")]
#[command(version)]
struct Cli {
    /// Path to a TOML grant file
    #[arg(short, long, env = "PERMCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Additional grant pattern (repeatable)
    #[arg(short, long = "grant")]
    grants: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check each pattern; exits non-zero if any is denied
    Check {
        /// Patterns to check
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Print the grant tree
    Tree,

    /// Print one canonical pattern per granted path
    Patterns,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("warn,permcheck={0},permtree={0}", log_level).into()),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    let token = config.build_token(&cli.grants)?;

    info!(token = %token.id(), nodes = token.node_count(), "Token ready");

    match cli.command {
        Command::Check { patterns } => {
            let mut all_allowed = true;
            for pattern in &patterns {
                let allowed = token.has_perm(pattern);
                all_allowed &= allowed;
                println!("{}\t{}", if allowed { "allow" } else { "deny" }, pattern);
            }

            if let Some(metrics) = token.metrics() {
                info!(
                    checks = metrics.checks,
                    allowed = metrics.allowed,
                    denied = metrics.denied,
                    malformed = metrics.malformed_queries,
                    "Checks complete"
                );
            }

            Ok(if all_allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Tree => {
            print!("{}", token.tree());
            Ok(ExitCode::SUCCESS)
        }
        Command::Patterns => {
            for pattern in token.patterns() {
                println!("{}", pattern);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
