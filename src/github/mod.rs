//! Source hosting adapter
//!
//! [`SourceHost`] is the only way actions touch the hosting service. Implementors
//! provide the primitive get/create calls; the `get_or_create_*` helpers are shared so
//! every backend gets the same "look first, create only when absent" behavior.

pub mod client;
pub mod types;

pub use client::GitHubClient;
pub use types::*;

use crate::core::error::ReleaseResult;
use crate::release::repos::RepoRef;

pub trait SourceHost {
  fn get_branch(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<Branch>>;

  /// Create `name` pointing at the head of `source`
  fn create_branch(&self, repo: &RepoRef, name: &str, source: &str) -> ReleaseResult<Branch>;

  fn get_or_create_branch(&self, repo: &RepoRef, name: &str, source: &str) -> ReleaseResult<Branch> {
    if let Some(branch) = self.get_branch(repo, name)? {
      return Ok(branch);
    }
    tracing::info!("creating branch {} from {} in {}", name, source, repo);
    self.create_branch(repo, name, source)
  }

  /// Most recent pull request (any state) whose head is `head`
  fn get_pull_request(&self, repo: &RepoRef, head: &str) -> ReleaseResult<Option<PullRequest>>;

  fn create_pull_request(&self, repo: &RepoRef, pr: &NewPullRequest) -> ReleaseResult<PullRequest>;

  fn get_or_create_pull_request(&self, repo: &RepoRef, pr: &NewPullRequest) -> ReleaseResult<PullRequest> {
    if let Some(existing) = self.get_pull_request(repo, &pr.head)? {
      return Ok(existing);
    }
    tracing::info!("opening pull request {} -> {} in {}", pr.head, pr.base, repo);
    self.create_pull_request(repo, pr)
  }

  fn update_pull_request_body(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<PullRequest>;

  /// Issue whose title is exactly `title`
  fn get_issue(&self, repo: &RepoRef, title: &str) -> ReleaseResult<Option<Issue>>;

  fn create_issue(&self, repo: &RepoRef, title: &str, body: &str) -> ReleaseResult<Issue>;

  fn get_or_create_issue(&self, repo: &RepoRef, title: &str, body: &str) -> ReleaseResult<Issue> {
    if let Some(issue) = self.get_issue(repo, title)? {
      return Ok(issue);
    }
    tracing::info!("opening issue '{}' in {}", title, repo);
    self.create_issue(repo, title, body)
  }

  /// Comment on issue `number` whose body is exactly `body`
  fn get_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<Option<IssueComment>>;

  fn create_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<IssueComment>;

  fn get_or_create_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<IssueComment> {
    if let Some(comment) = self.get_issue_comment(repo, number, body)? {
      return Ok(comment);
    }
    tracing::info!("commenting on {}#{}", repo, number);
    self.create_issue_comment(repo, number, body)
  }

  /// Decoded content of `path` at `reference`
  fn get_file(&self, repo: &RepoRef, path: &str, reference: &str) -> ReleaseResult<Option<String>>;

  fn get_tag(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<TagRef>>;

  fn get_release(&self, repo: &RepoRef, tag: &str) -> ReleaseResult<Option<Release>>;

  fn get_latest_release(&self, repo: &RepoRef) -> ReleaseResult<Option<Release>>;

  fn create_release(&self, repo: &RepoRef, release: &NewRelease) -> ReleaseResult<Release>;

  fn list_check_runs(&self, repo: &RepoRef, reference: &str) -> ReleaseResult<Vec<CheckRun>>;

  fn trigger_workflow(
    &self,
    repo: &RepoRef,
    file: &str,
    reference: &str,
    inputs: &[(String, String)],
  ) -> ReleaseResult<()>;

  /// Newest run of workflow `file`, optionally restricted to runs on `branch`
  fn get_latest_workflow_run(
    &self,
    repo: &RepoRef,
    file: &str,
    branch: Option<&str>,
  ) -> ReleaseResult<Option<WorkflowRun>>;

  fn get_workflow_run_logs(&self, repo: &RepoRef, run_id: u64) -> ReleaseResult<WorkflowLogs>;

  /// Commits reachable from `head` but not from `base`
  fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> ReleaseResult<Vec<CommitSummary>>;
}
