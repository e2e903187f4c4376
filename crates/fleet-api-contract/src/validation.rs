// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for API contract types
//!
//! Every rule is evaluated; the resulting [`ValidationError`] lists all
//! violations, sorted by field path and then message.

use std::fmt;

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::types::{EnrollRequest, EnrollResponse};

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    /// Dotted path of the offending field
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Aggregate of every violation found while validating a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violation messages in report order
    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self.messages();
        write!(f, "{} error(s) occurred: {}", messages.len(), messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationErrors> for ValidationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        flatten("", &errors, &mut violations);
        violations.sort();
        Self { violations }
    }
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", path, error.code));
                    out.push(Violation {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

/// Validate an enrollment request before it is sent
pub fn validate_enroll_request(request: &EnrollRequest) -> Result<(), ValidationError> {
    request.validate()?;
    Ok(())
}

/// Validate an enrollment response after it has been decoded
pub fn validate_enroll_response(response: &EnrollResponse) -> Result<(), ValidationError> {
    response.validate()?;
    Ok(())
}
