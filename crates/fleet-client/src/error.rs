// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for Fleet commands

use fleet_api_contract::ValidationError;
use thiserror::Error;

use crate::extract::RemoteError;
use crate::transport::TransportError;

/// Result type alias for Fleet commands
pub type EnrollResult<T> = std::result::Result<T, EnrollError>;

/// Errors returned by [`crate::EnrollCmd::execute`]
#[derive(Debug, Error)]
pub enum EnrollError {
    /// Request or response failed structural validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("fail to encode the enrollment request: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-success status, as described by the error extractor
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("fail to decode enrollment response: {0}")]
    Decode(#[source] serde_json::Error),
}
