//! Release version value
//!
//! Versions are written the way tags are: a leading `v` followed by a full semantic
//! version (`v0.18.0`, `v0.18.0-rc1`). All projections are derived from the parsed value.

use crate::core::error::{ReleaseError, ReleaseResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
  raw: String,
  parsed: semver::Version,
}

impl Version {
  /// Parse `vMAJOR.MINOR.PATCH[-PRE][+BUILD]`
  pub fn parse(input: &str) -> ReleaseResult<Self> {
    let invalid = |reason: &str| ReleaseError::InvalidVersion {
      input: input.to_string(),
      reason: reason.to_string(),
    };

    let rest = input.strip_prefix('v').ok_or_else(|| invalid("must start with 'v'"))?;
    let parsed = semver::Version::parse(rest).map_err(|e| invalid(&e.to_string()))?;
    if parsed.minor == u64::MAX {
      return Err(invalid("minor version leaves no room for a next release cycle"));
    }

    Ok(Self {
      raw: input.to_string(),
      parsed,
    })
  }

  fn from_parts(major: u64, minor: u64, patch: u64) -> Self {
    let parsed = semver::Version::new(major, minor, patch);
    Self {
      raw: format!("v{}", parsed),
      parsed,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Version without the leading `v` (`0.18.0-rc1`), as package managers spell it
  pub fn number(&self) -> &str {
    &self.raw[1..]
  }

  /// `v1`
  pub fn major(&self) -> String {
    format!("v{}", self.parsed.major)
  }

  /// `2`
  pub fn minor(&self) -> String {
    self.parsed.minor.to_string()
  }

  /// `3`
  pub fn patch(&self) -> String {
    self.parsed.patch.to_string()
  }

  /// `v1.2`
  pub fn major_minor(&self) -> String {
    format!("v{}.{}", self.parsed.major, self.parsed.minor)
  }

  /// `v1.2.3`, dropping prerelease and build metadata
  pub fn major_minor_patch(&self) -> String {
    format!("v{}.{}.{}", self.parsed.major, self.parsed.minor, self.parsed.patch)
  }

  /// Prerelease label without the dash (`rc1`), if any
  pub fn prerelease(&self) -> Option<&str> {
    if self.parsed.pre.is_empty() {
      None
    } else {
      Some(self.parsed.pre.as_str())
    }
  }

  pub fn is_prerelease(&self) -> bool {
    !self.parsed.pre.is_empty()
  }

  /// True for `vX.Y.Z` with `Z != 0`, whether or not it is a prerelease
  pub fn is_patch(&self) -> bool {
    self.parsed.patch != 0
  }

  fn next_minor(&self) -> ReleaseResult<u64> {
    self.parsed.minor.checked_add(1).ok_or_else(|| ReleaseError::InvalidVersion {
      input: self.raw.clone(),
      reason: "minor version leaves no room for a next release cycle".to_string(),
    })
  }

  /// `v1.3` for `v1.2.x`
  pub fn next_major_minor(&self) -> ReleaseResult<String> {
    Ok(format!("v{}.{}", self.parsed.major, self.next_minor()?))
  }

  /// First release of the next cycle, `v1.3.0`
  pub fn next(&self) -> ReleaseResult<Version> {
    Ok(Self::from_parts(self.parsed.major, self.next_minor()?, 0))
  }

  /// Development label of the next cycle, `v1.3.0-dev`
  pub fn dev(&self) -> ReleaseResult<String> {
    Ok(format!("{}.0-dev", self.next_major_minor()?))
  }

  /// `v1.2.2` for `v1.2.3`; `None` for the first release of a cycle
  pub fn previous_patch(&self) -> Option<Version> {
    self
      .parsed
      .patch
      .checked_sub(1)
      .map(|patch| Self::from_parts(self.parsed.major, self.parsed.minor, patch))
  }
}

impl FromStr for Version {
  type Err = ReleaseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.raw)
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Version {
  /// Semantic precedence; build metadata only breaks ties
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .parsed
      .cmp_precedence(&other.parsed)
      .then_with(|| self.raw.cmp(&other.raw))
  }
}
