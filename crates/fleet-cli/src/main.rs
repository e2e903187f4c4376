// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use fleet_cli::config::FleetConfig;
use fleet_cli::{Cli, Commands, Parser};
use fleet_logging::CliLogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FleetConfig::load(cli.config.as_deref())?;

    cli.logging_args(&config).init("fleet", CliLogLevel::Warn)?;

    match cli.command {
        Commands::Enroll(args) => args.run(&config).await,
    }
}
