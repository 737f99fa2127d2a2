//! Release stages
//!
//! Every stage implements [`Action`]: a read-only `check` that classifies how far the
//! external systems already are, and a `run` that performs get-or-create mutations until
//! the goal state holds. Actions keep no state between invocations.

pub mod downstream;
pub mod merge_branch;
pub mod notify_bifrost;
pub mod prepare_branch;
pub mod prepare_next;
pub mod probes;
pub mod promote;
pub mod publish_distributions;
pub mod publish_github;
pub mod tag;
pub mod workflow;

pub use downstream::DownstreamUpdate;
pub use merge_branch::MergeBranch;
pub use notify_bifrost::NotifyBifrost;
pub use prepare_branch::PrepareBranch;
pub use prepare_next::PrepareNext;
pub use promote::Promote;
pub use publish_distributions::PublishToDistributions;
pub use publish_github::PublishToGitHub;
pub use tag::Tag;
pub use workflow::WorkflowDispatch;

use crate::core::error::ReleaseResult;
use std::fmt;

/// How far an unfinished action is from its goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  /// An external asynchronous process is still running; re-poll later
  Wait,
  /// A precondition does not hold yet; `run` or a human can resolve it
  Incomplete,
  /// An external process finished badly or an expected artifact is missing
  Failure,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Severity::Wait => "wait",
      Severity::Incomplete => "incomplete",
      Severity::Failure => "failure",
    };
    write!(f, "{}", s)
  }
}

/// A classified unfinished state, naming the resource at fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
  pub severity: Severity,
  pub message: String,
}

/// Result of [`Action::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
  Complete,
  Pending(Pending),
}

impl CheckOutcome {
  pub fn wait(message: impl Into<String>) -> Self {
    Self::pending(Severity::Wait, message)
  }

  pub fn incomplete(message: impl Into<String>) -> Self {
    Self::pending(Severity::Incomplete, message)
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self::pending(Severity::Failure, message)
  }

  fn pending(severity: Severity, message: impl Into<String>) -> Self {
    CheckOutcome::Pending(Pending {
      severity,
      message: message.into(),
    })
  }

  /// Severity of a pending outcome, `None` when complete
  pub fn severity(&self) -> Option<Severity> {
    match self {
      CheckOutcome::Complete => None,
      CheckOutcome::Pending(p) => Some(p.severity),
    }
  }
}

/// Propagate a pending outcome out of a check, continuing only on `Complete`
///
/// ```ignore
/// check_step!(probes::check_runs(host, repo, "master")?);
/// ```
#[macro_export]
macro_rules! check_step {
  ($outcome:expr) => {
    match $outcome {
      $crate::actions::CheckOutcome::Complete => {}
      pending => return Ok(pending),
    }
  };
}

/// One idempotent unit of release work
pub trait Action {
  /// Subcommand-style name (e.g. "prepare-branch")
  fn name(&self) -> &str;

  /// One-line description of what `run` does, logged before running
  fn description(&self) -> &str;

  /// Inspect external state without mutating it
  fn check(&self) -> ReleaseResult<CheckOutcome>;

  /// Converge external state toward the goal; safe to call repeatedly
  fn run(&self) -> ReleaseResult<()>;
}
