// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for API contract encoding and parsing

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while encoding or decoding contract types
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid enrollment type received")]
    EmptyEnrollmentType,

    #[error("value of '{value}' is an invalid enrollment type, supported type is {supported}")]
    UnknownEnrollmentType { value: String, supported: String },

    #[error("cannot serialize unknown type")]
    UnencodableEnrollmentType,
}

/// Error body returned by Kibana when a Fleet call fails
///
/// Example:
/// ```json
/// {"statusCode": 401, "error": "Unauthorized", "message": "invalid enrollment key"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetErrorBody {
    pub status_code: u16,
    pub error: String,
    #[serde(default)]
    pub message: String,
}
