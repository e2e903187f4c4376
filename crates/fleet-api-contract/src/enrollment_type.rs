// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Wire encoding of the enrollment type
//!
//! Fleet exchanges the enrollment type as a bare string token. The mapping
//! between tokens and [`EnrollmentType`] values lives in a single
//! [`WireTable`]; decoding walks the table by token and encoding walks the
//! same table by value, so every registered value round-trips and a value
//! missing from the table can neither be sent nor accepted.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiContractError;

/// Type of enrollment requested for the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EnrollmentType {
    /// Default enrollment: the agent stays enrolled until explicitly removed
    Permanent,
}

/// Canonical token table for [`EnrollmentType`]
pub const ENROLLMENT_TYPES: WireTable<EnrollmentType> =
    WireTable::new(&[("PERMANENT", EnrollmentType::Permanent)]);

/// Bidirectional mapping between wire tokens and in-memory values
#[derive(Debug, Clone, Copy)]
pub struct WireTable<T: 'static> {
    entries: &'static [(&'static str, T)],
}

impl<T> WireTable<T>
where
    T: Copy + PartialEq + 'static,
{
    pub const fn new(entries: &'static [(&'static str, T)]) -> Self {
        Self { entries }
    }

    /// Look up the value registered for `token`
    pub fn value_of(&self, token: &str) -> Option<T> {
        self.entries.iter().find(|(t, _)| *t == token).map(|(_, v)| *v)
    }

    /// Look up the token registered for `value`
    pub fn token_of(&self, value: T) -> Option<&'static str> {
        self.entries.iter().find(|(_, v)| *v == value).map(|(t, _)| *t)
    }

    /// Registered tokens in table order
    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Decode an unquoted token
    pub fn decode_token(&self, token: &str) -> Result<T, ApiContractError> {
        if token.is_empty() {
            return Err(ApiContractError::EmptyEnrollmentType);
        }
        self.value_of(token).ok_or_else(|| ApiContractError::UnknownEnrollmentType {
            value: token.to_string(),
            supported: self.supported(),
        })
    }

    /// Decode a raw JSON string token, quotes included
    pub fn decode(&self, raw: &[u8]) -> Result<T, ApiContractError> {
        if raw.len() <= 2 {
            return Err(ApiContractError::EmptyEnrollmentType);
        }
        let inner = String::from_utf8_lossy(&raw[1..raw.len() - 1]);
        self.decode_token(&inner)
    }

    /// Encode a value as a raw JSON string token, quotes included
    pub fn encode(&self, value: T) -> Result<Vec<u8>, ApiContractError> {
        let token = self.token_of(value).ok_or(ApiContractError::UnencodableEnrollmentType)?;
        Ok(serde_json::to_vec(token)?)
    }

    fn supported(&self) -> String {
        self.tokens().map(|t| format!("'{}'", t)).collect::<Vec<_>>().join(", ")
    }
}

impl EnrollmentType {
    /// Wire token for this value, if registered
    pub fn as_token(self) -> Option<&'static str> {
        ENROLLMENT_TYPES.token_of(self)
    }
}

/// Decode a raw JSON token into an [`EnrollmentType`]
pub fn decode(raw: &[u8]) -> Result<EnrollmentType, ApiContractError> {
    ENROLLMENT_TYPES.decode(raw)
}

/// Encode an [`EnrollmentType`] as a raw JSON token
pub fn encode(value: EnrollmentType) -> Result<Vec<u8>, ApiContractError> {
    ENROLLMENT_TYPES.encode(value)
}

impl fmt::Display for EnrollmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token().unwrap_or("unknown"))
    }
}

impl FromStr for EnrollmentType {
    type Err = ApiContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ENROLLMENT_TYPES.decode_token(&s.to_ascii_uppercase())
    }
}

impl Serialize for EnrollmentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let token = self
            .as_token()
            .ok_or_else(|| ser::Error::custom(ApiContractError::UnencodableEnrollmentType))?;
        serializer.serialize_str(token)
    }
}

impl<'de> Deserialize<'de> for EnrollmentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        ENROLLMENT_TYPES.decode_token(&token).map_err(de::Error::custom)
    }
}
