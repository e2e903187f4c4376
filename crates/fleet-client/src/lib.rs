// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fleet client for agent enrollment
//!
//! This crate provides the enrollment command and the pieces it is wired
//! from: a [`Transport`] seam with a reqwest-backed [`HttpTransport`], and an
//! [`ErrorExtractor`] that turns Kibana error bodies into [`RemoteError`]s.
//!
//! ## Design Principles
//!
//! Commands only depend on the [`Transport`] trait, so they can be exercised
//! without a network and embedded by third-party software that brings its
//! own HTTP stack.

pub mod client;
pub mod enroll;
pub mod error;
pub mod extract;
pub mod network_config;
pub mod transport;

pub use client::*;
pub use enroll::*;
pub use error::*;
pub use extract::*;
pub use network_config::NetworkConfig;
pub use transport::*;

pub use fleet_api_contract as contract;
