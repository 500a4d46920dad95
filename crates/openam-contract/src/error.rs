// crates/openam-contract/src/error.rs
// ============================================================================
// Module: Contract Errors
// Description: Failure taxonomy for authenticate contract scenarios.
// Purpose: Report assertion failures with expected vs actual values.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! Errors split into assertion failures (status, shape, callback, value) and
//! transport/encode/decode failures. Every variant except the configuration
//! ones ([`ContractError::Config`], [`ContractError::InvalidUri`]), which occur
//! before any request is built, names the [`Step`] that produced it.

use thiserror::Error;

use crate::callbacks::CallbackKind;
use crate::client::Step;

/// Contract scenario failures.
///
/// # Invariants
/// - Variants are stable for error classification.
/// - Key lists in [`ContractError::ShapeMismatch`] are sorted.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The base URI cannot be turned into an authenticate URL.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// The HTTP round trip failed before a response was received.
    #[error("{step} request failed: {source}")]
    Transport {
        /// Step that issued the request.
        step: Step,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body could not be decoded.
    #[error("{step} response could not be decoded: {message}")]
    Decode {
        /// Step that received the response.
        step: Step,
        /// Decoder message.
        message: String,
    },
    /// Unexpected HTTP status code.
    #[error("{step} expected status {expected}, got {actual}")]
    StatusMismatch {
        /// Step that received the response.
        step: Step,
        /// Expected status code.
        expected: u16,
        /// Observed status code.
        actual: u16,
    },
    /// Response body key set differs from the expected key set.
    #[error(
        "{step} expected keys [{}], got [{}]",
        .expected.join(", "),
        .actual.join(", ")
    )]
    ShapeMismatch {
        /// Step that received the response.
        step: Step,
        /// Expected keys, sorted.
        expected: Vec<String>,
        /// Observed keys, sorted.
        actual: Vec<String>,
    },
    /// The request body could not be serialized.
    #[error("{step} request could not be encoded: {message}")]
    Encode {
        /// Step that built the request.
        step: Step,
        /// Serializer message.
        message: String,
    },
    /// The challenge lacks a callback needed to build the submission.
    #[error("{step} has no usable {kind}")]
    MissingCallback {
        /// Step whose response lacked the callback.
        step: Step,
        /// Callback kind that could not be filled.
        kind: CallbackKind,
    },
    /// A response field has the right key but an unacceptable value.
    #[error("{step} field {field} is invalid: {reason}")]
    InvalidValue {
        /// Step that received the response.
        step: Step,
        /// Offending field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Repeated runs of a scenario observed different outcomes.
    #[error("{scenario} is not idempotent: first run {first}, repeat run {second}")]
    NotIdempotent {
        /// Scenario label.
        scenario: &'static str,
        /// Fingerprint of the first run.
        first: String,
        /// Fingerprint of the diverging run.
        second: String,
    },
}

impl ContractError {
    /// Returns true for assertion failures, false for transport, decode, and
    /// configuration failures.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::StatusMismatch { .. }
                | Self::ShapeMismatch { .. }
                | Self::MissingCallback { .. }
                | Self::InvalidValue { .. }
                | Self::NotIdempotent { .. }
        )
    }
}
