use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Serialize, Serializer};

/// Error type for version parsing
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version format")]
    InvalidFormat,
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Represents a version requirement range using semver constraints.
///
/// Bare versions follow Cargo's caret semantics; use `=` for an exact match
/// and `~` for patch-level ranges.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", "~0.4", "=2.0.0")
    constraint: String,
    /// The parsed semver requirement
    req: VersionReq,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let req = VersionReq::parse(constraint)
            .map_err(|e| VersionError::ParseError(format!("Invalid version constraint '{}': {}", constraint, e)))?;
        Ok(Self {
            constraint: constraint.to_string(),
            req,
        })
    }

    /// Checks if a specific `semver::Version` satisfies this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    /// Returns a reference to the underlying `semver::VersionReq`.
    pub fn semver_req(&self) -> &VersionReq {
        &self.req
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

/// Ranges serialize as their constraint string in diagnostics output.
impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.constraint)
    }
}

/// Pure range-satisfaction check used at graph admission.
///
/// Malformed version or range strings yield a definite `false` rather than an
/// error, so callers treat them uniformly with an ordinary version mismatch.
pub fn satisfies(version: &str, range: &str) -> bool {
    let version = match Version::parse(version) {
        Ok(v) => v,
        Err(_) => return false,
    };
    match VersionReq::parse(range) {
        Ok(req) => req.matches(&version),
        Err(_) => false,
    }
}
