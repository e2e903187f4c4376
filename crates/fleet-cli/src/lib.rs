// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use clap::Subcommand;
use fleet_logging::CliLoggingArgs;
use std::path::PathBuf;

pub mod config;
pub mod enroll;
pub mod metadata;

pub use clap::Parser;

#[derive(clap::Parser)]
#[command(
    name = "fleet",
    about = "Fleet agent CLI",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "FLEET_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Enroll(enroll::EnrollArgs),
}

impl Cli {
    /// Logging arguments with unset flags filled from the configuration
    pub fn logging_args(&self, config: &config::FleetConfig) -> CliLoggingArgs {
        let mut logging = self.logging.clone();
        if logging.log_level.is_none() {
            logging.log_level = config.logging.log_level;
        }
        if logging.log_format.is_none() {
            logging.log_format = config.logging.log_format;
        }
        logging
    }
}
