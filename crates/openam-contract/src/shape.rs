// crates/openam-contract/src/shape.rs
// ============================================================================
// Module: Response Shapes
// Description: Key-set and value checks for successful authenticate bodies.
// Purpose: Decide whether a 200 body matches the session or no-session shape.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A successful authentication returns exactly `{successUrl, tokenId}`, or
//! exactly `{successUrl, message}` when `noSession=true` was requested.
//! Invariants:
//! - Key sets are compared exactly; extra and missing keys both fail.
//! - Every expected field must be a JSON string.
//! - `tokenId` must be non-empty; `successUrl` and `message` may be empty.

use serde_json::Value;

use crate::client::Step;
use crate::error::ContractError;

/// Success body shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Session issued: `{successUrl, tokenId}`.
    Session,
    /// No session requested: `{successUrl, message}`.
    NoSession,
}

impl ResponseShape {
    /// Returns the expected keys, sorted.
    #[must_use]
    pub const fn expected_keys(self) -> &'static [&'static str] {
        match self {
            Self::Session => &["successUrl", "tokenId"],
            Self::NoSession => &["message", "successUrl"],
        }
    }

    /// Checks `body` against this shape and returns its sorted key set.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Decode`] when the body is not an object,
    /// [`ContractError::ShapeMismatch`] when the key set differs, and
    /// [`ContractError::InvalidValue`] when a field value is unacceptable.
    pub fn check(self, step: Step, body: &Value) -> Result<Vec<String>, ContractError> {
        let Some(object) = body.as_object() else {
            return Err(ContractError::Decode {
                step,
                message: "expected a JSON object body".to_string(),
            });
        };
        let actual = key_set(body);
        let expected = self.expected_keys();
        if actual.iter().map(String::as_str).ne(expected.iter().copied()) {
            return Err(ContractError::ShapeMismatch {
                step,
                expected: expected.iter().map(ToString::to_string).collect(),
                actual,
            });
        }
        for key in expected {
            let Some(value) = object.get(*key).and_then(Value::as_str) else {
                return Err(ContractError::InvalidValue {
                    step,
                    field: (*key).to_string(),
                    reason: "must be a string".to_string(),
                });
            };
            if *key == "tokenId" && value.is_empty() {
                return Err(ContractError::InvalidValue {
                    step,
                    field: (*key).to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(actual)
    }
}

/// Returns the sorted top-level keys of a JSON object, or an empty list for
/// anything else.
#[must_use]
pub fn key_set(body: &Value) -> Vec<String> {
    let mut keys: Vec<String> =
        body.as_object().map(|object| object.keys().cloned().collect()).unwrap_or_default();
    keys.sort();
    keys
}

// ============================================================================
// SECTION: Tests
// ============================================================================
