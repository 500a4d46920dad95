// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Artifact configuration for OpenAM contract system tests.
// Purpose: Provide typed access to artifact settings and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! System-test artifact configuration is read from environment variables and
//! mapped into a small typed structure for reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
