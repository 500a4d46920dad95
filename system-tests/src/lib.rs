// system-tests/src/lib.rs
// ============================================================================
// Module: OpenAM Contract System Tests Library
// Description: Shared configuration for authenticate contract system tests.
// Purpose: Provide artifact settings shared by the stub and live suites.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries in
//! `system-tests/tests`. Target configuration (endpoint and credentials) lives
//! in `openam-contract`; this crate only configures where test artifacts go.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
