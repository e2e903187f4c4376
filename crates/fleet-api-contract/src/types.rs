// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! API contract types for the Fleet enrollment endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use validator::Validate;

use crate::enrollment_type::EnrollmentType;

/// Data required to enroll an agent into Fleet
///
/// Example:
/// ```text
/// POST /api/fleet/agents/enroll
/// {
///   "type": "PERMANENT",
///   "metadata": {
///     "local": { "os": "macos" },
///     "userProvided": { "region": "us-east" }
///   }
/// }
/// ```
///
/// The enrollment token never appears in the body; it travels in the
/// `kbn-fleet-enrollment-token` header.
#[derive(Clone, PartialEq, Serialize, Validate)]
pub struct EnrollRequest {
    #[serde(skip)]
    #[validate(length(min = 1, message = "missing enrollment token"))]
    pub enrollment_token: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "missing enrollment type"))]
    pub enrollment_type: Option<EnrollmentType>,
    #[serde(rename = "sharedId", skip_serializing_if = "String::is_empty")]
    pub shared_id: String,
    pub metadata: Metadata,
}

impl EnrollRequest {
    pub fn new(enrollment_token: impl Into<String>, enrollment_type: EnrollmentType) -> Self {
        Self {
            enrollment_token: enrollment_token.into(),
            enrollment_type: Some(enrollment_type),
            shared_id: String::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_shared_id(mut self, shared_id: impl Into<String>) -> Self {
        self.shared_id = shared_id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl fmt::Debug for EnrollRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrollRequest")
            .field("enrollment_token", &"[REDACTED]")
            .field("enrollment_type", &self.enrollment_type)
            .field("shared_id", &self.shared_id)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Metadata sent by the agent at enrollment time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Attributes observed on the host running the agent
    pub local: HashMap<String, Value>,
    /// Attributes supplied by the operator
    #[serde(rename = "userProvided")]
    pub user_provided: HashMap<String, Value>,
}

impl Metadata {
    pub fn with_local(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.local.insert(key.into(), value.into());
        self
    }

    pub fn with_user_provided(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_provided.insert(key.into(), value.into());
        self
    }
}

/// Data received after enrolling an agent into Fleet
///
/// Example:
/// ```text
/// {
///   "action": "created",
///   "success": true,
///   "item": {
///     "id": "a4937110-e53e-11e9-934f-47a8e38a522c",
///     "active": true,
///     "policy_id": "default",
///     "type": "PERMANENT",
///     "enrolled_at": "2019-10-02T18:01:22.337Z",
///     "user_provided_metadata": {},
///     "local_metadata": {},
///     "actions": [],
///     "access_token": "ACCESS_TOKEN"
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EnrollResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(nested)]
    pub item: EnrollItemResponse,
}

/// Enrolled agent as described by Fleet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EnrollItemResponse {
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1, message = "missing ID"))]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub policy_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "missing enrollment type"))]
    pub enrollment_type: Option<EnrollmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub user_provided_metadata: HashMap<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub local_metadata: HashMap<String, Value>,
    /// Pending actions, passed through untouched
    #[serde(deserialize_with = "null_as_default")]
    pub actions: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    #[validate(length(min = 1, message = "access token is missing"))]
    pub access_token: String,
}

/// A JSON `null` decodes like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
