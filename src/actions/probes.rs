//! Read-only probes shared by the release stages
//!
//! Every message names the resource it is about so the operator can act on it.

use super::CheckOutcome;
use crate::check_step;
use crate::core::error::ReleaseResult;
use crate::github::SourceHost;
use crate::release::repos::RepoRef;
use regex::Regex;

/// Classify the check runs reported for `reference`
///
/// Failed checks win over running ones: a red check needs a human even while others are
/// still going.
pub fn check_runs(host: &dyn SourceHost, repo: &RepoRef, reference: &str) -> ReleaseResult<CheckOutcome> {
  let runs = host.list_check_runs(repo, reference)?;
  tracing::debug!("{} check runs on {}@{}", runs.len(), repo, reference);

  if let Some(failed) = runs.iter().find(|r| r.is_completed() && !r.is_successful()) {
    return Ok(CheckOutcome::failure(format!(
      "check {} on {}@{} is not successful ({})",
      failed.name, repo, reference, failed.url
    )));
  }
  if let Some(running) = runs.iter().find(|r| !r.is_completed()) {
    return Ok(CheckOutcome::wait(format!(
      "check {} on {}@{} has not completed yet ({})",
      running.name, repo, reference, running.url
    )));
  }
  Ok(CheckOutcome::Complete)
}

/// Pull request from `head` exists, is green, and (optionally) merged
pub fn check_pull_request(
  host: &dyn SourceHost,
  repo: &RepoRef,
  head: &str,
  must_be_merged: bool,
) -> ReleaseResult<CheckOutcome> {
  let Some(pr) = host.get_pull_request(repo, head)? else {
    return Ok(CheckOutcome::incomplete(format!(
      "pull request for {} in {} does not exist",
      head, repo
    )));
  };
  check_step!(check_runs(host, repo, head)?);
  if must_be_merged && !pr.merged {
    return Ok(CheckOutcome::incomplete(format!("{} is not merged", pr.url)));
  }
  Ok(CheckOutcome::Complete)
}

/// A workflow whose finished run must mention something in one job's log
#[derive(Debug, Clone)]
pub struct WorkflowProbe {
  pub repo: RepoRef,
  pub file: String,
  /// Restrict to runs on this branch (or tag)
  pub branch: Option<String>,
  pub job: String,
  pub pattern: Regex,
}

impl WorkflowProbe {
  /// Classify the latest run of the workflow
  pub fn check(&self, host: &dyn SourceHost) -> ReleaseResult<CheckOutcome> {
    let Some(run) = host.get_latest_workflow_run(&self.repo, &self.file, self.branch.as_deref())? else {
      return Ok(CheckOutcome::incomplete(format!(
        "no run of {} found in {}{}",
        self.file,
        self.repo,
        self.branch.as_ref().map(|b| format!("@{}", b)).unwrap_or_default()
      )));
    };
    if !run.is_completed() {
      return Ok(CheckOutcome::wait(format!(
        "{} run {} is {} ({})",
        self.file, run.id, run.status, run.url
      )));
    }
    if !run.succeeded() {
      return Ok(CheckOutcome::failure(format!(
        "{} run {} concluded {} ({})",
        self.file,
        run.id,
        run.conclusion.as_deref().unwrap_or("without a conclusion"),
        run.url
      )));
    }

    let logs = host.get_workflow_run_logs(&self.repo, run.id)?;
    let Some(log) = logs.job(&self.job) else {
      return Ok(CheckOutcome::failure(format!(
        "job '{}' not found in {} run {} ({})",
        self.job, self.file, run.id, run.logs_url
      )));
    };
    if !self.pattern.is_match(log) {
      return Ok(CheckOutcome::incomplete(format!(
        "job '{}' of {} run {} does not mention '{}' ({})",
        self.job, self.file, run.id, self.pattern, run.url
      )));
    }
    Ok(CheckOutcome::Complete)
  }

  /// Whether a new run must be dispatched
  ///
  /// False while the latest run is still going or once a run has matched; a failed or
  /// unrelated latest run asks for a new one.
  pub fn needs_dispatch(&self, host: &dyn SourceHost) -> ReleaseResult<bool> {
    Ok(match self.check(host)? {
      CheckOutcome::Complete => false,
      outcome => outcome.severity() != Some(super::Severity::Wait),
    })
  }
}

/// Regex matching `text` literally
pub fn literal(text: &str) -> ReleaseResult<Regex> {
  Ok(Regex::new(&regex::escape(text))?)
}
