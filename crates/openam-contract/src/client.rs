// crates/openam-contract/src/client.rs
// ============================================================================
// Module: Authenticate Client
// Description: Blocking HTTP client for the OpenAM authenticate endpoint.
// Purpose: Issue direct, challenge, and submit requests with transcripts.
// Dependencies: reqwest, serde, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`AuthenticateClient`] wraps a blocking `reqwest` client bound to one
//! authenticate URL. Each request is one round trip; nothing retries, and
//! transport failures are returned as [`ContractError::Transport`].
//! Invariants:
//! - Every request carries `Content-Type: application/json`.
//! - Every exchange is appended to the client's transcript in send order.
//! - Passwords are redacted in transcripts and never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::callbacks::CallbackChallenge;
use crate::callbacks::REDACTED;
use crate::callbacks::redact_passwords;
use crate::config::Credentials;
use crate::config::TargetConfig;
use crate::error::ContractError;
use crate::shape::key_set;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the username for direct authentication.
pub const USERNAME_HEADER: &str = "X-OpenAM-Username";
/// Header carrying the password for direct authentication.
pub const PASSWORD_HEADER: &str = "X-OpenAM-Password";
/// Query parameter suppressing session issuance.
pub const NO_SESSION_PARAM: &str = "noSession";
/// Content type header name.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
/// Content type sent on every request.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Exchange Types
// ============================================================================

/// Request step within a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Direct login with credential headers.
    Direct,
    /// Callback flow step 1: request the challenge.
    Challenge,
    /// Callback flow step 2: submit the filled challenge.
    Submit,
}

impl Step {
    /// Returns a stable label for the step.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Challenge => "challenge",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for callback submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOptions {
    /// Sends `noSession=true` when set.
    pub no_session: bool,
}

/// One completed request/response round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthExchange {
    /// Step that issued the request.
    pub step: Step,
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body; `None` when empty or not JSON.
    pub body: Option<Value>,
}

impl AuthExchange {
    /// Fails unless the status equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::StatusMismatch`] on any other status.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, ContractError> {
        if self.status == expected {
            return Ok(self);
        }
        Err(ContractError::StatusMismatch {
            step: self.step,
            expected,
            actual: self.status,
        })
    }

    /// Returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Decode`] when the body was empty or not JSON.
    pub fn json(&self) -> Result<&Value, ContractError> {
        self.body.as_ref().ok_or_else(|| ContractError::Decode {
            step: self.step,
            message: "response body is empty or not JSON".to_string(),
        })
    }

    /// Returns the sorted top-level key set of the body (empty when absent).
    #[must_use]
    pub fn key_set(&self) -> Vec<String> {
        self.body.as_ref().map(key_set).unwrap_or_default()
    }
}

/// Recorded exchange for transcripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// 1-based send order within the client.
    pub sequence: u64,
    /// Step that issued the request.
    pub step: Step,
    /// Request URL including query.
    pub url: String,
    /// Request headers; the password header value is redacted.
    pub headers: BTreeMap<String, String>,
    /// Request body with password callback values redacted.
    pub request: Option<Value>,
    /// Response status code.
    pub status: u16,
    /// Decoded response body.
    pub response: Option<Value>,
}

/// Outgoing request description shared by all steps.
struct Outgoing {
    /// Step issuing the request.
    step: Step,
    /// Request headers in send order.
    headers: Vec<(&'static str, String)>,
    /// Whether `noSession=true` is sent.
    no_session: bool,
    /// JSON body, if any.
    body: Option<Value>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client for one authenticate endpoint.
#[derive(Clone)]
pub struct AuthenticateClient {
    /// Authenticate endpoint URL.
    url: Url,
    /// Underlying HTTP client.
    client: Client,
    /// Exchanges recorded by this client and its clones.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl AuthenticateClient {
    /// Builds a client for `config`, honoring its timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &TargetConfig) -> Result<Self, ContractError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ContractError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self::with_client(config.authenticate_url()?, client))
    }

    /// Builds a client from an existing `reqwest` client.
    #[must_use]
    pub fn with_client(url: Url, client: Client) -> Self {
        Self {
            url,
            client,
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the authenticate endpoint URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns a snapshot of the recorded transcript.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// POSTs with credential headers and no body.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] when the round trip fails.
    pub fn authenticate_with_headers(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthExchange, ContractError> {
        self.send(Outgoing {
            step: Step::Direct,
            headers: vec![
                (USERNAME_HEADER, credentials.username().to_string()),
                (PASSWORD_HEADER, credentials.password().to_string()),
                (CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE.to_string()),
            ],
            no_session: false,
            body: None,
        })
    }

    /// POSTs with no credentials to obtain a callback challenge.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Transport`] when the round trip fails.
    pub fn request_challenge(&self) -> Result<AuthExchange, ContractError> {
        self.send(Outgoing {
            step: Step::Challenge,
            headers: vec![(CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE.to_string())],
            no_session: false,
            body: None,
        })
    }

    /// POSTs a filled challenge back to the endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the challenge cannot be serialized or the round
    /// trip fails.
    pub fn submit_callbacks(
        &self,
        challenge: &CallbackChallenge,
        options: SubmitOptions,
    ) -> Result<AuthExchange, ContractError> {
        let body = challenge.to_value().map_err(|err| ContractError::Encode {
            step: Step::Submit,
            message: format!("challenge serialization failed: {err}"),
        })?;
        self.send(Outgoing {
            step: Step::Submit,
            headers: vec![(CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE.to_string())],
            no_session: options.no_session,
            body: Some(body),
        })
    }

    /// Sends one request, decodes the response, and records the exchange.
    fn send(&self, outgoing: Outgoing) -> Result<AuthExchange, ContractError> {
        let Outgoing {
            step,
            headers,
            no_session,
            body,
        } = outgoing;
        let mut request: RequestBuilder = self.client.post(self.url.clone());
        for (name, value) in &headers {
            request = request.header(*name, value);
        }
        if no_session {
            request = request.query(&[(NO_SESSION_PARAM, "true")]);
        }
        if let Some(body) = &body {
            let bytes = serde_json::to_vec(body).map_err(|err| ContractError::Encode {
                step,
                message: format!("request serialization failed: {err}"),
            })?;
            request = request.body(bytes);
        }
        let request = request.build().map_err(|source| ContractError::Transport {
            step,
            source,
        })?;
        let url = request.url().to_string();
        let response = self.client.execute(request).map_err(|source| {
            tracing::warn!(step = %step, url = %url, error = %source, "authenticate request failed");
            ContractError::Transport {
                step,
                source,
            }
        })?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|source| ContractError::Transport {
            step,
            source,
        })?;
        let decoded = if text.trim().is_empty() { None } else { serde_json::from_str(&text).ok() };
        let exchange = AuthExchange {
            step,
            status,
            body: decoded,
        };
        tracing::debug!(
            step = %step,
            url = %url,
            status,
            keys = %exchange.key_set().join(","),
            "authenticate exchange"
        );
        self.record(step, url, &headers, body.as_ref(), &exchange);
        Ok(exchange)
    }

    /// Appends an exchange to the transcript with secrets redacted.
    fn record(
        &self,
        step: Step,
        url: String,
        headers: &[(&'static str, String)],
        request: Option<&Value>,
        exchange: &AuthExchange,
    ) {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                let value =
                    if *name == PASSWORD_HEADER { REDACTED.to_string() } else { value.clone() };
                ((*name).to_string(), value)
            })
            .collect();
        let mut entries = self.transcript.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = u64::try_from(entries.len()).unwrap_or(u64::MAX).saturating_add(1);
        entries.push(TranscriptEntry {
            sequence,
            step,
            url,
            headers,
            request: request.map(redact_passwords),
            status: exchange.status,
            response: exchange.body.clone(),
        });
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
