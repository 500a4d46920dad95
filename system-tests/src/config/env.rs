// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed artifact configuration for system tests.
// Purpose: Centralize env parsing and the artifact overwrite policy.
// Dependencies: openam-contract
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement; invalid or
//! empty values fail closed. An explicit run root is never reused unless
//! overwriting is allowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use openam_contract::config::read_env_strict;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Allow reusing a non-empty artifact directory (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "OPENAM_SYSTEM_TEST_RUN_ROOT",
            Self::AllowOverwrite => "OPENAM_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override; each test writes to a subdirectory.
    pub run_root: Option<PathBuf>,
    /// Allow reusing a non-empty artifact directory.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or is not a recognized boolean.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let allow_overwrite = parse_bool_env(
            SystemTestEnv::AllowOverwrite.as_str(),
            read_env_nonempty(SystemTestEnv::AllowOverwrite.as_str())?,
        )?;
        Ok(Self {
            run_root,
            allow_overwrite,
        })
    }

    /// Resolves the artifact directory for `test_name`.
    ///
    /// Without a run root, a fresh timestamped directory under
    /// `target/system-tests` is used.
    ///
    /// # Errors
    ///
    /// Returns an error when the resolved directory already has content and
    /// overwriting is not allowed.
    pub fn artifact_dir(&self, test_name: &str) -> Result<PathBuf, String> {
        let Some(run_root) = &self.run_root else {
            return Ok(default_run_root().join(test_name));
        };
        let dir = run_root.join(test_name);
        if !self.allow_overwrite && has_entries(&dir) {
            return Err(format!(
                "{} already has artifacts; set {} to reuse it",
                dir.display(),
                SystemTestEnv::AllowOverwrite.as_str()
            ));
        }
        Ok(dir)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a boolean environment variable; unset means false.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

/// Returns a fresh timestamped root under `target/system-tests`.
fn default_run_root() -> PathBuf {
    let stamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}"))
}

/// Returns true when `dir` exists and contains at least one entry.
fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}
