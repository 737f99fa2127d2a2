//! Check-run-check driver for a single action
//!
//! One invocation runs at most one `run()`. Only `Wait` outcomes observed after the run
//! are polled again; every other unfinished outcome ends the invocation as
//! [`ReleaseError::Pending`].

use crate::actions::{Action, CheckOutcome, Pending, Severity};
use crate::core::error::{PendingError, ReleaseError, ReleaseResult};
use std::time::Duration;

/// Operator switches for the individual phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
  pub skip_check_before: bool,
  pub skip_run: bool,
  pub skip_check_after: bool,
  pub skip_wait: bool,
}

/// Delays used while waiting for an action to converge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
  /// Slept once before the first post-check
  pub initial_delay: Duration,
  /// First delay between two `Wait` polls
  pub interval: Duration,
  /// Growth applied to the delay after every poll
  pub factor: f64,
  /// Upper bound for the delay between polls
  pub ceiling: Duration,
}

impl Default for BackoffPolicy {
  fn default() -> Self {
    Self {
      initial_delay: Duration::from_secs(10),
      interval: Duration::from_secs(10),
      factor: 2.0,
      ceiling: Duration::from_secs(60),
    }
  }
}

impl BackoffPolicy {
  /// Unbounded sequence of delays between polls, starting at `interval`
  pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
    std::iter::successors(Some(self.interval.min(self.ceiling)), move |prev| {
      Some(prev.mul_f64(self.factor).min(self.ceiling))
    })
  }
}

pub trait Sleeper {
  fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
  fn sleep(&self, duration: Duration) {
    std::thread::sleep(duration);
  }
}

/// How an invocation ended successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  /// The pre-check found the goal state; `run()` was not called
  AlreadyComplete,
  /// The post-check confirmed the goal state
  Converged,
  /// The post-check was skipped, so nothing was verified
  Unverified,
}

pub struct Executor<'a> {
  options: ExecuteOptions,
  backoff: BackoffPolicy,
  sleeper: &'a dyn Sleeper,
}

impl<'a> Executor<'a> {
  pub fn new(options: ExecuteOptions, backoff: BackoffPolicy, sleeper: &'a dyn Sleeper) -> Self {
    Self {
      options,
      backoff,
      sleeper,
    }
  }

  pub fn execute(&self, action: &dyn Action) -> ReleaseResult<Completion> {
    let name = action.name();

    if self.options.skip_check_before {
      tracing::info!(action = name, "skipping check before run");
    } else {
      tracing::info!(action = name, "checking before run");
      match action.check()? {
        CheckOutcome::Complete => {
          println!("✅ {} is already complete", name);
          return Ok(Completion::AlreadyComplete);
        }
        CheckOutcome::Pending(p) if p.severity == Severity::Incomplete => {
          tracing::info!(action = name, "{}", p.message);
        }
        CheckOutcome::Pending(p) => return Err(pending(name, p)),
      }
    }

    if self.options.skip_run {
      tracing::info!(action = name, "skipping run");
    } else {
      tracing::info!(action = name, "{}", action.description());
      action.run()?;
    }

    if self.options.skip_check_after {
      tracing::info!(action = name, "skipping check after run");
      return Ok(Completion::Unverified);
    }

    tracing::info!(action = name, "checking after run");
    self.sleeper.sleep(self.backoff.initial_delay);
    let mut delays = self.backoff.delays();
    loop {
      match action.check()? {
        CheckOutcome::Complete => {
          println!("✅ {} is complete", name);
          return Ok(Completion::Converged);
        }
        CheckOutcome::Pending(p) if p.severity == Severity::Wait && !self.options.skip_wait => {
          // successors() never ends, the fallback only satisfies the type
          let delay = delays.next().unwrap_or(self.backoff.ceiling);
          tracing::warn!(action = name, "{}; checking again in {:?}", p.message, delay);
          self.sleeper.sleep(delay);
        }
        CheckOutcome::Pending(p) => return Err(pending(name, p)),
      }
    }
  }
}

fn pending(action: &str, p: Pending) -> ReleaseError {
  tracing::warn!(action, severity = %p.severity, "{}", p.message);
  ReleaseError::Pending(PendingError {
    action: action.to_string(),
    severity: p.severity,
    message: p.message,
  })
}
