// crates/openam-contract/src/callbacks.rs
// ============================================================================
// Module: Authentication Callbacks
// Description: Pass-through model of the server-issued callback challenge.
// Purpose: Fill credential callbacks without disturbing anything else.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A callback challenge is the JSON document the authenticate endpoint
//! returns when no credentials are supplied. It is echoed back with the first
//! input of each `NameCallback` and `PasswordCallback` filled in.
//! Invariants:
//! - Fields this crate does not model (`authId`, `output`, `input`, ...)
//!   round-trip unchanged through `rest` maps.
//! - Callback order is preserved.
//! - Only `input[0].value` of a matching callback is ever written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::client::Step;
use crate::config::Credentials;
use crate::error::ContractError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder written over password values in transcripts.
pub const REDACTED: &str = "<redacted>";
/// Callback field holding the input slots.
const INPUT_FIELD: &str = "input";
/// Input field holding the echoed value.
const VALUE_FIELD: &str = "value";

// ============================================================================
// SECTION: Callback Kinds
// ============================================================================

/// Callback types the suite knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallbackKind {
    /// Requests the username.
    #[serde(rename = "NameCallback")]
    Name,
    /// Requests the password.
    #[serde(rename = "PasswordCallback")]
    Password,
}

impl CallbackKind {
    /// Returns the wire `type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "NameCallback",
            Self::Password => "PasswordCallback",
        }
    }

    /// Maps a wire `type` value to a known kind.
    #[must_use]
    pub fn from_type(raw: &str) -> Option<Self> {
        match raw {
            "NameCallback" => Some(Self::Name),
            "PasswordCallback" => Some(Self::Password),
            _ => None,
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Challenge Model
// ============================================================================

/// One server-issued callback.
///
/// Everything except `type` stays in `rest` exactly as received, including
/// `input`, so inputs without a `value` key or an explicit `"input": null`
/// are echoed unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callback {
    /// Wire `type` tag, for example `NameCallback`.
    #[serde(rename = "type")]
    pub callback_type: String,
    /// Unmodeled fields, typically `output` and `input`.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Callback {
    /// Returns the known kind of this callback, if any.
    #[must_use]
    pub fn kind(&self) -> Option<CallbackKind> {
        CallbackKind::from_type(&self.callback_type)
    }

    /// Returns the first input slot, if present and an object.
    #[must_use]
    pub fn first_input(&self) -> Option<&Map<String, Value>> {
        self.rest.get(INPUT_FIELD)?.as_array()?.first()?.as_object()
    }

    /// Mutable access to the first input slot.
    fn first_input_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.rest.get_mut(INPUT_FIELD)?.as_array_mut()?.first_mut()?.as_object_mut()
    }
}

/// Callback challenge returned by the authenticate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackChallenge {
    /// Ordered callbacks requesting input.
    pub callbacks: Vec<Callback>,
    /// Unmodeled fields, typically `authId`, `template`, `stage`, `header`.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl CallbackChallenge {
    /// Parses a challenge from a decoded response body.
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not an object with a `callbacks`
    /// array of typed entries.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serializes the challenge back into a request body.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the opaque `authId`, when the server issued one.
    #[must_use]
    pub fn auth_id(&self) -> Option<&str> {
        self.rest.get("authId").and_then(Value::as_str)
    }

    /// Returns true when at least one callback of `kind` is present.
    #[must_use]
    pub fn has(&self, kind: CallbackKind) -> bool {
        self.callbacks.iter().any(|callback| callback.kind() == Some(kind))
    }

    /// Writes `value` into the first input of every callback of `kind`.
    ///
    /// Returns the number of callbacks written.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingCallback`] when no callback of `kind`
    /// exists or a matching callback has no input slot.
    pub fn fill(&mut self, kind: CallbackKind, value: &str) -> Result<usize, ContractError> {
        let mut written = 0usize;
        for callback in self.callbacks.iter_mut().filter(|callback| callback.kind() == Some(kind)) {
            let slot = callback.first_input_mut().ok_or(ContractError::MissingCallback {
                step: Step::Challenge,
                kind,
            })?;
            slot.insert(VALUE_FIELD.to_string(), Value::String(value.to_string()));
            written += 1;
        }
        if written == 0 {
            return Err(ContractError::MissingCallback {
                step: Step::Challenge,
                kind,
            });
        }
        Ok(written)
    }

    /// Returns a copy with name and password callbacks filled from `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingCallback`] when either kind cannot be filled.
    pub fn answered(&self, credentials: &Credentials) -> Result<Self, ContractError> {
        let mut answered = self.clone();
        answered.fill(CallbackKind::Name, credentials.username())?;
        answered.fill(CallbackKind::Password, credentials.password())?;
        Ok(answered)
    }
}

/// Replaces password callback values in a JSON document with [`REDACTED`].
///
/// Documents that do not look like a challenge are returned unchanged.
#[must_use]
pub fn redact_passwords(body: &Value) -> Value {
    let mut redacted = body.clone();
    let Some(callbacks) = redacted.get_mut("callbacks").and_then(Value::as_array_mut) else {
        return redacted;
    };
    for callback in callbacks {
        let is_password = callback
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|raw| CallbackKind::from_type(raw) == Some(CallbackKind::Password));
        if !is_password {
            continue;
        }
        let Some(inputs) = callback.get_mut(INPUT_FIELD).and_then(Value::as_array_mut) else {
            continue;
        };
        for input in inputs {
            if let Some(value) = input.get_mut(VALUE_FIELD)
                && value.as_str().is_some_and(|raw| !raw.is_empty())
            {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
    redacted
}

// ============================================================================
// SECTION: Tests
// ============================================================================
