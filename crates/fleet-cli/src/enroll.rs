// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! `fleet enroll` command

use anyhow::{Context, Result};
use clap::Args;
use fleet_client::contract::{EnrollRequest, EnrollResponse, EnrollmentType, Metadata};
use fleet_client::{EnrollCmd, HttpTransport};
use fleet_logging::redact;
use tracing::info;

use crate::config::FleetConfig;
use crate::metadata::{local_metadata, parse_key_value, user_provided_metadata};

/// Arguments for the enroll command
#[derive(Args, Debug, Clone)]
#[command(about = "Enroll this agent into Fleet")]
pub struct EnrollArgs {
    /// Kibana base URL (overrides the configured one)
    #[arg(long)]
    pub url: Option<String>,

    /// Enrollment token issued by Fleet
    #[arg(long, env = "FLEET_ENROLLMENT_TOKEN", hide_env_values = true)]
    pub enrollment_token: String,

    /// Enrollment type
    #[arg(long = "type", default_value = "permanent", value_parser = parse_enrollment_type)]
    pub enrollment_type: EnrollmentType,

    /// Identifier shared by agents running on the same host
    #[arg(long)]
    pub shared_id: Option<String>,

    /// User-provided metadata, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Output in JSON format
    #[arg(long, help = "Output in JSON format")]
    pub json: bool,
}

fn parse_enrollment_type(s: &str) -> Result<EnrollmentType, String> {
    s.parse().map_err(|e: fleet_client::contract::ApiContractError| e.to_string())
}

impl EnrollArgs {
    /// Build the enrollment request from the arguments
    pub fn build_request(&self) -> EnrollRequest {
        let metadata = Metadata {
            local: local_metadata(),
            user_provided: user_provided_metadata(&self.meta),
        };

        EnrollRequest::new(self.enrollment_token.clone(), self.enrollment_type)
            .with_shared_id(self.shared_id.clone().unwrap_or_default())
            .with_metadata(metadata)
    }

    /// Run the enroll command
    pub async fn run(self, config: &FleetConfig) -> Result<()> {
        let network = config.network(self.url.as_deref())?;
        let transport = HttpTransport::new(&network).context("failed to set up Fleet transport")?;
        let cmd = EnrollCmd::new(transport);

        info!(
            url = %network.url,
            enrollment_type = %self.enrollment_type,
            token = %redact(&self.enrollment_token),
            "enrolling agent"
        );
        let response = cmd.execute(&self.build_request()).await.context("enrollment failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", render_summary(&response));
        }
        Ok(())
    }
}

/// Human-readable enrollment summary; the access token is left out
pub fn render_summary(response: &EnrollResponse) -> String {
    let item = &response.item;
    let mut lines = vec![
        "✅ Agent enrolled".to_string(),
        format!("  id:        {}", item.id),
        format!("  policy:    {}", item.policy_id),
        format!("  active:    {}", item.active),
    ];
    if let Some(enrolled_at) = item.enrolled_at {
        lines.push(format!("  enrolled:  {}", enrolled_at.to_rfc3339()));
    }
    if !item.actions.is_empty() {
        lines.push(format!("  pending actions: {}", item.actions.len()));
    }
    lines.join("\n")
}
