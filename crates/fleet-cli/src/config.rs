// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration loading for the Fleet CLI
//!
//! Precedence order: config file < `FLEET_*` environment < command-line flags.
//! Nested keys use a double underscore in the environment, e.g.
//! `FLEET_LOGGING__LOG_LEVEL=debug`.

use anyhow::{Context, Result};
use fleet_client::NetworkConfig;
use fleet_logging::logging_config::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Root configuration for the `fleet` binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FleetConfig {
    /// Kibana base URL
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Extra headers attached to every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FleetConfig {
    /// Load the configuration file (if any) overlaid with the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`FleetConfig::load`], reading `FLEET_*` variables from `env` when given
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml).required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FLEET")
                .prefix_separator("_")
                .separator("__")
                .convert_case(config::Case::Kebab)
                .source(env),
        );

        let built = builder
            .build()
            .with_context(|| match path {
                Some(path) => format!("reading config file {:?}", path),
                None => "reading configuration from environment".to_string(),
            })?;
        built.try_deserialize().context("invalid Fleet configuration")
    }

    /// Network settings for the transport, with an optional URL override
    pub fn network(&self, url_override: Option<&str>) -> Result<NetworkConfig> {
        let url = url_override
            .or(self.url.as_deref())
            .context("Fleet URL is not configured; pass --url or set FLEET_URL")?;

        let mut network = NetworkConfig::new(url);
        if let Some(timeout_secs) = self.timeout_secs {
            network.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = &self.user_agent {
            network.user_agent = user_agent.clone();
        }
        network.headers = self.headers.clone();
        Ok(network)
    }
}
