// crates/openam-contract/src/config.rs
// ============================================================================
// Module: Target Configuration
// Description: Environment-backed configuration for the authenticate target.
// Purpose: Centralize env parsing with strict UTF-8 and URI validation.
// Dependencies: url
// ============================================================================

//! ## Overview
//! The target endpoint and credentials are read once per run from the
//! environment. Values are parsed with strict UTF-8 enforcement and empty
//! values fail closed. [`TargetConfig::from_lookup`] accepts any lookup so
//! callers can layer overrides (for example CLI flags) over the environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ContractError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for target configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnv {
    /// Base endpoint, for example `https://am.example.com/openam/json`.
    OpenamUri,
    /// Valid username for the target realm.
    Username,
    /// Valid password for [`TargetEnv::Username`].
    Password,
    /// Optional client timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl TargetEnv {
    /// All keys in load order.
    pub const ALL: [Self; 4] =
        [Self::OpenamUri, Self::Username, Self::Password, Self::TimeoutSeconds];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenamUri => "OPENAM_URI",
            Self::Username => "USERNAME",
            Self::Password => "PASSWORD",
            Self::TimeoutSeconds => "OPENAM_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Username/password pair presented to the authenticate endpoint.
///
/// # Invariants
/// - Immutable once built; wrong-credential variants are new values.
/// - `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username sent in headers or the `NameCallback`.
    username: String,
    /// Password sent in headers or the `PasswordCallback`.
    password: String,
}

impl Credentials {
    /// Builds a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns a copy with the username replaced.
    #[must_use]
    pub fn with_username(&self, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: self.password.clone(),
        }
    }

    /// Returns a copy with the password replaced.
    #[must_use]
    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            username: self.username.clone(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed target configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Base endpoint; `/authenticate` is appended to it.
    pub base_uri: Url,
    /// Valid credentials for the target.
    pub credentials: Credentials,
    /// Optional client timeout override. `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl TargetConfig {
    /// Builds a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidUri`] when the base URI is not an
    /// absolute `http`/`https` URL.
    pub fn new(base_uri: &str, credentials: Credentials) -> Result<Self, ContractError> {
        Ok(Self {
            base_uri: parse_base_uri(base_uri)?,
            credentials,
            timeout: None,
        })
    }

    /// Returns a copy with the timeout override set.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing, a value is not
    /// valid UTF-8, is empty, or fails validation.
    pub fn load() -> Result<Self, ContractError> {
        Self::from_lookup(read_env_strict)
    }

    /// Loads configuration from an arbitrary lookup keyed by env var name.
    ///
    /// # Errors
    ///
    /// Returns an error when a required value is missing, empty, or invalid,
    /// or when the lookup itself fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContractError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |key: TargetEnv| read_nonempty(&lookup, key.as_str());
        let require = |key: TargetEnv| {
            read(key)?.ok_or_else(|| ContractError::Config(format!("{} must be set", key.as_str())))
        };
        let base_uri = parse_base_uri(&require(TargetEnv::OpenamUri)?)?;
        let username = require(TargetEnv::Username)?;
        let password = require(TargetEnv::Password)?;
        let timeout = read(TargetEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(TargetEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            base_uri,
            credentials: Credentials::new(username, password),
            timeout,
        })
    }

    /// Returns the authenticate endpoint URL for this target.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidUri`] when the joined URL is invalid.
    pub fn authenticate_url(&self) -> Result<Url, ContractError> {
        authenticate_url(&self.base_uri)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a value through `lookup` and rejects empty values.
fn read_nonempty<F>(lookup: &F, name: &str) -> Result<Option<String>, ContractError>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    match lookup(name).map_err(ContractError::Config)? {
        Some(value) if value.trim().is_empty() => {
            Err(ContractError::Config(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value in seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ContractError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ContractError::Config(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ContractError::Config(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses and validates a base endpoint URI.
///
/// # Errors
///
/// Returns [`ContractError::InvalidUri`] when the value is not an absolute
/// `http`/`https` URL with a host, or carries a query or fragment.
pub fn parse_base_uri(raw: &str) -> Result<Url, ContractError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ContractError::InvalidUri(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ContractError::InvalidUri(format!("{raw}: scheme must be http or https")));
    }
    if url.host().is_none() {
        return Err(ContractError::InvalidUri(format!("{raw}: missing host")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ContractError::InvalidUri(format!("{raw}: query and fragment not allowed")));
    }
    Ok(url)
}

/// Appends `/authenticate` to a base endpoint, collapsing a trailing slash.
///
/// # Errors
///
/// Returns [`ContractError::InvalidUri`] when the joined URL does not parse.
pub fn authenticate_url(base: &Url) -> Result<Url, ContractError> {
    let joined = format!("{}/authenticate", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|err| ContractError::InvalidUri(format!("{joined}: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
