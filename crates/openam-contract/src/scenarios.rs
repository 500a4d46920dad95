// crates/openam-contract/src/scenarios.rs
// ============================================================================
// Module: Contract Scenarios
// Description: The direct and callback authentication scenarios.
// Purpose: Run one scenario end-to-end and report its observed outcome.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Each [`Scenario`] builds its own requests, sends them through an
//! [`AuthenticateClient`], and checks status and body shape.
//! Invariants:
//! - Scenarios share no state beyond the client transcript.
//! - Wrong credentials are always the literal [`INVALID_CREDENTIAL`].
//! - `noSession=true` is only ever sent on the callback submit step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::callbacks::CallbackChallenge;
use crate::client::AuthExchange;
use crate::client::AuthenticateClient;
use crate::client::Step;
use crate::client::SubmitOptions;
use crate::config::Credentials;
use crate::error::ContractError;
use crate::shape::ResponseShape;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Value substituted for a deliberately wrong username or password.
pub const INVALID_CREDENTIAL: &str = "invalid";

/// Status returned for a successful login or a callback challenge.
pub const STATUS_OK: u16 = 200;

/// Status returned for rejected credentials.
pub const STATUS_UNAUTHORIZED: u16 = 401;

// ============================================================================
// SECTION: Scenario Catalog
// ============================================================================

/// Authenticate endpoint scenarios.
///
/// # Invariants
/// - Labels are stable snake-case identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Valid header credentials yield a session.
    DirectValid,
    /// Wrong username in headers is rejected.
    DirectInvalidUsername,
    /// Wrong password in headers is rejected.
    DirectInvalidPassword,
    /// Valid callback answers yield a session.
    CallbackValid,
    /// Wrong username in the name callback is rejected.
    CallbackInvalidUsername,
    /// Wrong password in the password callback is rejected.
    CallbackInvalidPassword,
    /// Valid callback answers with `noSession=true` yield a message, no token.
    CallbackNoSession,
}

/// How a scenario reaches the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Single request with credential headers.
    Direct,
    /// Challenge then submit.
    Callback(SubmitOptions),
}

impl Scenario {
    /// All scenarios in declaration order.
    pub const ALL: [Self; 7] = [
        Self::DirectValid,
        Self::DirectInvalidUsername,
        Self::DirectInvalidPassword,
        Self::CallbackValid,
        Self::CallbackInvalidUsername,
        Self::CallbackInvalidPassword,
        Self::CallbackNoSession,
    ];

    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectValid => "direct_valid",
            Self::DirectInvalidUsername => "direct_invalid_username",
            Self::DirectInvalidPassword => "direct_invalid_password",
            Self::CallbackValid => "callback_valid",
            Self::CallbackInvalidUsername => "callback_invalid_username",
            Self::CallbackInvalidPassword => "callback_invalid_password",
            Self::CallbackNoSession => "callback_no_session",
        }
    }

    /// Returns the status the final step must produce.
    #[must_use]
    pub const fn expected_status(self) -> u16 {
        match self {
            Self::DirectValid | Self::CallbackValid | Self::CallbackNoSession => STATUS_OK,
            Self::DirectInvalidUsername
            | Self::DirectInvalidPassword
            | Self::CallbackInvalidUsername
            | Self::CallbackInvalidPassword => STATUS_UNAUTHORIZED,
        }
    }

    /// Returns the body shape the final step must produce, if any is required.
    #[must_use]
    pub const fn expected_shape(self) -> Option<ResponseShape> {
        match self {
            Self::DirectValid | Self::CallbackValid => Some(ResponseShape::Session),
            Self::CallbackNoSession => Some(ResponseShape::NoSession),
            Self::DirectInvalidUsername
            | Self::DirectInvalidPassword
            | Self::CallbackInvalidUsername
            | Self::CallbackInvalidPassword => None,
        }
    }

    /// Returns the credentials this scenario presents, derived from the valid pair.
    #[must_use]
    pub fn presented(self, valid: &Credentials) -> Credentials {
        match self {
            Self::DirectInvalidUsername | Self::CallbackInvalidUsername => {
                valid.with_username(INVALID_CREDENTIAL)
            }
            Self::DirectInvalidPassword | Self::CallbackInvalidPassword => {
                valid.with_password(INVALID_CREDENTIAL)
            }
            Self::DirectValid | Self::CallbackValid | Self::CallbackNoSession => valid.clone(),
        }
    }

    /// Returns the request flow for this scenario.
    const fn flow(self) -> Flow {
        match self {
            Self::DirectValid | Self::DirectInvalidUsername | Self::DirectInvalidPassword => {
                Flow::Direct
            }
            Self::CallbackValid | Self::CallbackInvalidUsername | Self::CallbackInvalidPassword => {
                Flow::Callback(SubmitOptions {
                    no_session: false,
                })
            }
            Self::CallbackNoSession => Flow::Callback(SubmitOptions {
                no_session: true,
            }),
        }
    }

    /// Runs the scenario once.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] on any transport failure or contract violation.
    pub fn run(
        self,
        client: &AuthenticateClient,
        valid: &Credentials,
    ) -> Result<ScenarioReport, ContractError> {
        let presented = self.presented(valid);
        let (last, steps) = match self.flow() {
            Flow::Direct => (client.authenticate_with_headers(&presented)?, 1),
            Flow::Callback(options) => {
                let challenge = fetch_challenge(client)?;
                let answered = challenge.answered(&presented)?;
                (client.submit_callbacks(&answered, options)?, 2)
            }
        };
        let report = self.verify(&last, steps)?;
        tracing::info!(
            scenario = self.as_str(),
            status = report.status,
            keys = %report.keys.join(","),
            "scenario passed"
        );
        Ok(report)
    }

    /// Runs the scenario `runs` times and fails unless every run matches the first.
    ///
    /// A `runs` of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns the first run failure, or [`ContractError::NotIdempotent`] when
    /// a repeat run observes a different status or key set.
    pub fn run_repeated(
        self,
        client: &AuthenticateClient,
        valid: &Credentials,
        runs: u32,
    ) -> Result<ScenarioReport, ContractError> {
        let mut first = self.run(client, valid)?;
        for _ in 1..runs.max(1) {
            let next = self.run(client, valid)?;
            if next.fingerprint() != first.fingerprint() {
                return Err(ContractError::NotIdempotent {
                    scenario: self.as_str(),
                    first: first.fingerprint(),
                    second: next.fingerprint(),
                });
            }
            first.runs = first.runs.saturating_add(1);
        }
        Ok(first)
    }

    /// Checks the final exchange against this scenario's expectations.
    fn verify(self, last: &AuthExchange, steps: u32) -> Result<ScenarioReport, ContractError> {
        last.expect_status(self.expected_status())?;
        let keys = match self.expected_shape() {
            Some(shape) => shape.check(last.step, last.json()?)?,
            None => last.key_set(),
        };
        Ok(ScenarioReport {
            scenario: self,
            status: last.status,
            keys,
            steps,
            runs: 1,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == raw.trim())
            .ok_or_else(|| format!("unknown scenario: {raw}"))
    }
}

/// Requests a callback challenge and checks it is usable.
///
/// # Errors
///
/// Returns an error unless the server answers 200 with a challenge body that
/// parses as a callback list.
pub fn fetch_challenge(client: &AuthenticateClient) -> Result<CallbackChallenge, ContractError> {
    let exchange = client.request_challenge()?;
    exchange.expect_status(STATUS_OK)?;
    CallbackChallenge::from_value(exchange.json()?.clone()).map_err(|err| ContractError::Decode {
        step: Step::Challenge,
        message: format!("not a callback challenge: {err}"),
    })
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Observed outcome of a passing scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario that ran.
    pub scenario: Scenario,
    /// Final status code.
    pub status: u16,
    /// Sorted key set of the final body.
    pub keys: Vec<String>,
    /// Requests per run.
    pub steps: u32,
    /// Runs folded into this report.
    pub runs: u32,
}

impl ScenarioReport {
    /// Returns the `(status, key set)` fingerprint used for idempotence checks.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!("status={} keys=[{}]", self.status, self.keys.join(","))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
