// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Extraction of remote errors from non-success responses

use fleet_api_contract::FleetErrorBody;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "status code: {}, fleet returned an error: {error}, message: {message}",
    .status.as_u16()
)]
pub struct RemoteError {
    pub status: StatusCode,
    pub error: String,
    pub message: String,
}

/// Turns a non-success response body into a [`RemoteError`]
pub trait ErrorExtractor: Send + Sync {
    fn extract(&self, status: StatusCode, body: &[u8]) -> RemoteError;
}

/// Understands the Kibana error body, falls back to the raw text
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetErrorExtractor;

impl ErrorExtractor for FleetErrorExtractor {
    fn extract(&self, status: StatusCode, body: &[u8]) -> RemoteError {
        match serde_json::from_slice::<FleetErrorBody>(body) {
            Ok(parsed) => RemoteError {
                status,
                error: parsed.error,
                message: parsed.message,
            },
            Err(_) => RemoteError {
                status,
                error: status.canonical_reason().unwrap_or("unknown error").to_string(),
                message: String::from_utf8_lossy(body).trim().to_string(),
            },
        }
    }
}

impl<F> ErrorExtractor for F
where
    F: Fn(StatusCode, &[u8]) -> RemoteError + Send + Sync,
{
    fn extract(&self, status: StatusCode, body: &[u8]) -> RemoteError {
        self(status, body)
    }
}
