// crates/openam-contract/src/lib.rs
// ============================================================================
// Module: OpenAM Contract Library
// Description: Black-box contract checks for the OpenAM authenticate endpoint.
// Purpose: Provide config, client, callback model, and scenarios for the suite.
// Dependencies: reqwest, serde, serde_json, thiserror, tracing, url
// ============================================================================

//! ## Overview
//! `openam-contract` drives the `/authenticate` endpoint of an OpenAM-style
//! access-management server and checks the observable contract: status codes
//! and JSON body key sets for direct-header login and callback login.
//! Invariants:
//! - Every [`Scenario`] is independent and builds its own requests.
//! - Transport failures surface as [`ContractError::Transport`]; nothing retries.
//! - Password values never reach logs, reports, or transcripts.
//!
//! Security posture: server responses are untrusted input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod callbacks;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod scenarios;
pub mod shape;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callbacks::Callback;
pub use callbacks::CallbackChallenge;
pub use callbacks::CallbackKind;
pub use client::AuthExchange;
pub use client::AuthenticateClient;
pub use client::Step;
pub use client::SubmitOptions;
pub use client::TranscriptEntry;
pub use config::Credentials;
pub use config::TargetConfig;
pub use config::TargetEnv;
pub use error::ContractError;
pub use scenarios::Scenario;
pub use scenarios::ScenarioReport;
pub use shape::ResponseShape;
