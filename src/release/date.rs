use crate::core::error::{ReleaseError, ReleaseResult};
use chrono::{Local, NaiveDate};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day a release is (or was) published
///
/// Announcements dated after today are advance notices; anything else is
/// reported as already published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
  /// Parse `YYYY-MM-DD`, defaulting to `today` when no date is given
  pub fn resolve(input: Option<&str>, today: NaiveDate) -> ReleaseResult<Self> {
    match input {
      None => Ok(Self(today)),
      Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map(Self).map_err(|e| {
        ReleaseError::with_help(
          format!("Invalid release date '{}': {}", s, e),
          "Dates are written as YYYY-MM-DD, e.g. --date 2024-03-01",
        )
      }),
    }
  }

  pub fn today() -> NaiveDate {
    Local::now().date_naive()
  }

  pub fn is_advance_notice(&self, today: NaiveDate) -> bool {
    self.0 > today
  }
}

impl fmt::Display for ReleaseDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(DATE_FORMAT))
  }
}
