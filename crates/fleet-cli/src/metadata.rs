// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Enrollment metadata collection

use serde_json::{Value, json};
use std::collections::HashMap;

/// Attributes observed on the local host
pub fn local_metadata() -> HashMap<String, Value> {
    let mut host = json!({ "architecture": std::env::consts::ARCH });
    if let Some(hostname) = hostname() {
        host["hostname"] = Value::String(hostname);
    }

    HashMap::from([
        (
            "elastic".to_string(),
            json!({ "agent": { "version": env!("CARGO_PKG_VERSION") } }),
        ),
        ("host".to_string(), host),
        (
            "os".to_string(),
            json!({
                "name": std::env::consts::OS,
                "family": std::env::consts::FAMILY,
            }),
        ),
    ])
}

fn hostname() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

/// Parse a `key=value` pair given on the command line
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Attributes supplied by the operator
pub fn user_provided_metadata(pairs: &[(String, String)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}
