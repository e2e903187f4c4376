// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fleet enrollment API contract types and validation
//!
//! This crate defines the wire types exchanged with the Fleet enrollment
//! endpoint, the custom encoding of [`EnrollmentType`], and the structural
//! validation applied before a request is sent and after a response is
//! decoded. The types are shared between the enrollment client, the CLI and
//! the test servers.

pub mod enrollment_type;
pub mod error;
pub mod types;
pub mod validation;

pub use enrollment_type::*;
pub use error::*;
pub use types::*;
pub use validation::{ValidationError, Violation};

/// Path of the enrollment endpoint
pub const ENROLL_PATH: &str = "/api/fleet/agents/enroll";

/// Header carrying the enrollment credential
pub const ENROLLMENT_TOKEN_HEADER: &str = "kbn-fleet-enrollment-token";
