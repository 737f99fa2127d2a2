//! Values returned by the source host, decoupled from the REST wire format

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
  pub name: String,
  pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestState {
  Open,
  Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
  pub number: u64,
  pub url: String,
  pub head: String,
  pub base: String,
  pub title: String,
  pub body: String,
  pub state: PullRequestState,
  pub draft: bool,
  pub merged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
  pub head: String,
  pub base: String,
  pub title: String,
  pub body: String,
  pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
  pub number: u64,
  pub url: String,
  pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
  pub id: u64,
  pub url: String,
  pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
  pub name: String,
  pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub tag: String,
  pub name: String,
  pub url: String,
  pub body: String,
  pub prerelease: bool,
  pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
  pub tag: String,
  pub name: String,
  pub body: String,
  pub prerelease: bool,
  /// Mark as the repository's latest release
  pub make_latest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
  pub name: String,
  pub status: String,
  pub conclusion: Option<String>,
  pub url: String,
}

impl CheckRun {
  pub fn is_completed(&self) -> bool {
    self.status == "completed"
  }

  /// `success`, `skipped` and `neutral` do not block a release
  pub fn is_successful(&self) -> bool {
    matches!(self.conclusion.as_deref(), Some("success" | "skipped" | "neutral"))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
  pub id: u64,
  pub status: String,
  pub conclusion: Option<String>,
  pub url: String,
  pub logs_url: String,
}

impl WorkflowRun {
  pub fn is_completed(&self) -> bool {
    self.status == "completed"
  }

  pub fn succeeded(&self) -> bool {
    self.conclusion.as_deref() == Some("success")
  }
}

/// Raw log text of a workflow run, keyed by job name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowLogs {
  pub jobs: BTreeMap<String, String>,
}

impl WorkflowLogs {
  pub fn job(&self, name: &str) -> Option<&str> {
    self.jobs.get(name).map(String::as_str)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
  pub sha: String,
  pub message: String,
}

impl CommitSummary {
  /// `abc1234 subject line`
  pub fn one_line(&self) -> String {
    let short = &self.sha[..self.sha.len().min(7)];
    let subject = self.message.lines().next().unwrap_or_default();
    format!("{} {}", short, subject)
  }
}

// ============================================================================
// REST wire format
// ============================================================================

#[derive(Deserialize)]
pub(crate) struct WireSha {
  pub sha: String,
}

#[derive(Deserialize)]
pub(crate) struct WireBranch {
  pub name: String,
  pub commit: WireSha,
}

impl From<WireBranch> for Branch {
  fn from(w: WireBranch) -> Self {
    Branch {
      name: w.name,
      sha: w.commit.sha,
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireRef {
  #[serde(rename = "ref")]
  pub reference: String,
  pub object: WireSha,
}

#[derive(Deserialize)]
pub(crate) struct WireRefName {
  #[serde(rename = "ref")]
  pub reference: String,
}

#[derive(Deserialize)]
pub(crate) struct WirePullRequest {
  pub number: u64,
  pub html_url: String,
  pub title: String,
  #[serde(default)]
  pub body: Option<String>,
  pub state: String,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub merged_at: Option<String>,
  pub head: WireRefName,
  pub base: WireRefName,
}

impl From<WirePullRequest> for PullRequest {
  fn from(w: WirePullRequest) -> Self {
    PullRequest {
      number: w.number,
      url: w.html_url,
      head: w.head.reference,
      base: w.base.reference,
      title: w.title,
      body: w.body.unwrap_or_default(),
      state: if w.state == "open" {
        PullRequestState::Open
      } else {
        PullRequestState::Closed
      },
      draft: w.draft,
      merged: w.merged_at.is_some(),
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireIssue {
  pub number: u64,
  pub html_url: String,
  pub title: String,
  #[serde(default)]
  pub pull_request: Option<serde_json::Value>,
}

impl From<WireIssue> for Issue {
  fn from(w: WireIssue) -> Self {
    Issue {
      number: w.number,
      url: w.html_url,
      title: w.title,
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireSearch<T> {
  pub items: Vec<T>,
}

#[derive(Deserialize)]
pub(crate) struct WireComment {
  pub id: u64,
  pub html_url: String,
  #[serde(default)]
  pub body: Option<String>,
}

impl From<WireComment> for IssueComment {
  fn from(w: WireComment) -> Self {
    IssueComment {
      id: w.id,
      url: w.html_url,
      body: w.body.unwrap_or_default(),
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireContent {
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub encoding: String,
}

#[derive(Deserialize)]
pub(crate) struct WireAsset {
  pub name: String,
  pub browser_download_url: String,
}

#[derive(Deserialize)]
pub(crate) struct WireRelease {
  pub tag_name: String,
  #[serde(default)]
  pub name: Option<String>,
  pub html_url: String,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(default)]
  pub prerelease: bool,
  #[serde(default)]
  pub assets: Vec<WireAsset>,
}

impl From<WireRelease> for Release {
  fn from(w: WireRelease) -> Self {
    Release {
      name: w.name.unwrap_or_else(|| w.tag_name.clone()),
      tag: w.tag_name,
      url: w.html_url,
      body: w.body.unwrap_or_default(),
      prerelease: w.prerelease,
      assets: w
        .assets
        .into_iter()
        .map(|a| Asset {
          name: a.name,
          url: a.browser_download_url,
        })
        .collect(),
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireCheckRun {
  pub name: String,
  pub status: String,
  #[serde(default)]
  pub conclusion: Option<String>,
  #[serde(default)]
  pub html_url: Option<String>,
}

impl From<WireCheckRun> for CheckRun {
  fn from(w: WireCheckRun) -> Self {
    CheckRun {
      name: w.name,
      status: w.status,
      conclusion: w.conclusion,
      url: w.html_url.unwrap_or_default(),
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireCheckRuns {
  pub check_runs: Vec<WireCheckRun>,
}

#[derive(Deserialize)]
pub(crate) struct WireWorkflowRun {
  pub id: u64,
  pub status: String,
  #[serde(default)]
  pub conclusion: Option<String>,
  pub html_url: String,
  pub logs_url: String,
}

impl From<WireWorkflowRun> for WorkflowRun {
  fn from(w: WireWorkflowRun) -> Self {
    WorkflowRun {
      id: w.id,
      status: w.status,
      conclusion: w.conclusion,
      url: w.html_url,
      logs_url: w.logs_url,
    }
  }
}

#[derive(Deserialize)]
pub(crate) struct WireWorkflowRuns {
  pub workflow_runs: Vec<WireWorkflowRun>,
}

#[derive(Deserialize)]
pub(crate) struct WireJob {
  pub id: u64,
  pub name: String,
}

#[derive(Deserialize)]
pub(crate) struct WireJobs {
  pub jobs: Vec<WireJob>,
}

#[derive(Deserialize)]
pub(crate) struct WireCommitDetail {
  pub message: String,
}

#[derive(Deserialize)]
pub(crate) struct WireCommit {
  pub sha: String,
  pub commit: WireCommitDetail,
}

#[derive(Deserialize)]
pub(crate) struct WireComparison {
  pub commits: Vec<WireCommit>,
}

#[derive(Deserialize)]
pub(crate) struct WireErrorBody {
  pub message: String,
}
