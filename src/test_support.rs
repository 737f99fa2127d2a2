//! In-memory adapters for unit tests
//!
//! `FakeHost` keeps branches (with file trees), pull requests, issues, comments, tags,
//! releases, check runs and workflow runs, and logs every mutation so tests can assert
//! that nothing was created twice. `FakeVcs` checkouts read from and push back into a
//! shared `FakeHost`.

use crate::actions::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::executor::Sleeper;
use crate::core::vcs::{Checkout, LocalCommand, TagInfo, VersionControl};
use crate::github::*;
use crate::matrix::{Message, Messaging};
use crate::release::repos::{RepoRef, Repos};
use crate::release::version::Version;
use crate::ui::Confirm;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

pub type Files = BTreeMap<String, String>;

#[derive(Default)]
struct HostState {
  next_id: u64,
  branches: HashMap<(RepoRef, String), (String, Files)>,
  pulls: Vec<(RepoRef, PullRequest)>,
  issues: Vec<(RepoRef, Issue)>,
  comments: Vec<(RepoRef, u64, IssueComment)>,
  tags: HashMap<(RepoRef, String), String>,
  releases: Vec<(RepoRef, Release)>,
  latest: HashMap<RepoRef, String>,
  check_runs: HashMap<(RepoRef, String), Vec<CheckRun>>,
  workflow_runs: Vec<(RepoRef, String, Option<String>, WorkflowRun)>,
  logs: HashMap<u64, WorkflowLogs>,
  comparisons: HashMap<(RepoRef, String, String), Vec<CommitSummary>>,
  dispatches: Vec<(RepoRef, String, String, Vec<(String, String)>)>,
  mutations: Vec<String>,
}

impl HostState {
  fn id(&mut self) -> u64 {
    self.next_id += 1;
    self.next_id
  }

  fn sha(&mut self) -> String {
    format!("{:040x}", self.id())
  }
}

#[derive(Default)]
pub struct FakeHost {
  state: RefCell<HostState>,
}

fn key(repo: &RepoRef, name: &str) -> (RepoRef, String) {
  (repo.clone(), name.to_string())
}

impl FakeHost {
  pub fn new() -> Rc<Self> {
    Rc::new(Self::default())
  }

  // ------------------------------------------------------------------
  // Seeding
  // ------------------------------------------------------------------

  pub fn seed_branch(&self, repo: &RepoRef, name: &str, files: &[(&str, &str)]) -> String {
    let mut s = self.state.borrow_mut();
    let sha = s.sha();
    let files = files.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect();
    s.branches.insert(key(repo, name), (sha.clone(), files));
    sha
  }

  pub fn set_file(&self, repo: &RepoRef, branch: &str, path: &str, content: &str) {
    let mut s = self.state.borrow_mut();
    let sha = s.sha();
    let entry = s
      .branches
      .get_mut(&key(repo, branch))
      .unwrap_or_else(|| panic!("branch {} not seeded in {}", branch, repo));
    entry.0 = sha;
    entry.1.insert(path.to_string(), content.to_string());
  }

  pub fn seed_tag(&self, repo: &RepoRef, name: &str) {
    let mut s = self.state.borrow_mut();
    let sha = s.sha();
    s.tags.insert(key(repo, name), sha);
  }

  pub fn seed_issue(&self, repo: &RepoRef, title: &str) -> u64 {
    let mut s = self.state.borrow_mut();
    let number = s.id();
    s.issues.push((
      repo.clone(),
      Issue {
        number,
        url: repo.web_url(&format!("issues/{}", number)),
        title: title.to_string(),
      },
    ));
    number
  }

  pub fn seed_comment(&self, repo: &RepoRef, issue: u64, body: &str) {
    let mut s = self.state.borrow_mut();
    let id = s.id();
    s.comments.push((
      repo.clone(),
      issue,
      IssueComment {
        id,
        url: repo.web_url(&format!("issues/{}#issuecomment-{}", issue, id)),
        body: body.to_string(),
      },
    ));
  }

  pub fn seed_release(&self, repo: &RepoRef, tag: &str, body: &str, latest: bool) {
    let mut s = self.state.borrow_mut();
    s.releases.push((repo.clone(), fake_release(repo, tag, body, false)));
    if latest {
      s.latest.insert(repo.clone(), tag.to_string());
    }
  }

  pub fn seed_pull_request(&self, repo: &RepoRef, head: &str, base: &str, merged: bool) -> PullRequest {
    let pr = self
      .create_pull_request(
        repo,
        &NewPullRequest {
          head: head.to_string(),
          base: base.to_string(),
          title: format!("{} into {}", head, base),
          body: String::new(),
          draft: false,
        },
      )
      .unwrap_or_else(|e| panic!("seeding pull request failed: {}", e));
    if merged {
      self.merge(repo, head);
    }
    self.clear_mutations();
    self.pull_request(repo, head).unwrap_or(pr)
  }

  /// Mark the pull request from `head` as merged
  pub fn merge(&self, repo: &RepoRef, head: &str) {
    let mut s = self.state.borrow_mut();
    for (r, pr) in s.pulls.iter_mut() {
      if r == repo && pr.head == head {
        pr.merged = true;
        pr.state = PullRequestState::Closed;
      }
    }
  }

  pub fn add_check_run(&self, repo: &RepoRef, reference: &str, name: &str, status: &str, conclusion: Option<&str>) {
    let mut s = self.state.borrow_mut();
    s.check_runs.entry(key(repo, reference)).or_default().push(CheckRun {
      name: name.to_string(),
      status: status.to_string(),
      conclusion: conclusion.map(str::to_string),
      url: repo.web_url(&format!("runs/{}", name)),
    });
  }

  pub fn clear_check_runs(&self, repo: &RepoRef, reference: &str) {
    self.state.borrow_mut().check_runs.remove(&key(repo, reference));
  }

  /// Register a workflow run (newest last) with per-job logs; returns its id
  pub fn add_workflow_run(
    &self,
    repo: &RepoRef,
    file: &str,
    branch: Option<&str>,
    status: &str,
    conclusion: Option<&str>,
    logs: &[(&str, &str)],
  ) -> u64 {
    let mut s = self.state.borrow_mut();
    let id = s.id();
    s.workflow_runs.push((
      repo.clone(),
      file.to_string(),
      branch.map(str::to_string),
      WorkflowRun {
        id,
        status: status.to_string(),
        conclusion: conclusion.map(str::to_string),
        url: repo.web_url(&format!("actions/runs/{}", id)),
        logs_url: repo.web_url(&format!("actions/runs/{}/logs", id)),
      },
    ));
    s.logs.insert(
      id,
      WorkflowLogs {
        jobs: logs.iter().map(|(j, t)| (j.to_string(), t.to_string())).collect(),
      },
    );
    id
  }

  pub fn seed_comparison(&self, repo: &RepoRef, base: &str, head: &str, commits: &[(&str, &str)]) {
    self.state.borrow_mut().comparisons.insert(
      (repo.clone(), base.to_string(), head.to_string()),
      commits
        .iter()
        .map(|(sha, message)| CommitSummary {
          sha: sha.to_string(),
          message: message.to_string(),
        })
        .collect(),
    );
  }

  // ------------------------------------------------------------------
  // Inspection
  // ------------------------------------------------------------------

  /// Every mutating call in order, e.g. `create_branch ipfs/kubo release-v0.1.0`
  pub fn mutations(&self) -> Vec<String> {
    self.state.borrow().mutations.clone()
  }

  pub fn clear_mutations(&self) {
    self.state.borrow_mut().mutations.clear();
  }

  pub fn branch_names(&self, repo: &RepoRef) -> Vec<String> {
    let mut names: Vec<_> = self
      .state
      .borrow()
      .branches
      .keys()
      .filter(|(r, _)| r == repo)
      .map(|(_, n)| n.clone())
      .collect();
    names.sort();
    names
  }

  pub fn branch_files(&self, repo: &RepoRef, branch: &str) -> Option<Files> {
    self.state.borrow().branches.get(&key(repo, branch)).map(|(_, f)| f.clone())
  }

  pub fn pull_requests(&self, repo: &RepoRef) -> Vec<PullRequest> {
    self
      .state
      .borrow()
      .pulls
      .iter()
      .filter(|(r, _)| r == repo)
      .map(|(_, p)| p.clone())
      .collect()
  }

  pub fn pull_request(&self, repo: &RepoRef, head: &str) -> Option<PullRequest> {
    self.pull_requests(repo).into_iter().find(|p| p.head == head)
  }

  pub fn issues(&self, repo: &RepoRef) -> Vec<Issue> {
    self
      .state
      .borrow()
      .issues
      .iter()
      .filter(|(r, _)| r == repo)
      .map(|(_, i)| i.clone())
      .collect()
  }

  pub fn comments(&self, repo: &RepoRef, issue: u64) -> Vec<String> {
    self
      .state
      .borrow()
      .comments
      .iter()
      .filter(|(r, n, _)| r == repo && *n == issue)
      .map(|(_, _, c)| c.body.clone())
      .collect()
  }

  pub fn releases(&self, repo: &RepoRef) -> Vec<Release> {
    self
      .state
      .borrow()
      .releases
      .iter()
      .filter(|(r, _)| r == repo)
      .map(|(_, rel)| rel.clone())
      .collect()
  }

  pub fn latest_release_tag(&self, repo: &RepoRef) -> Option<String> {
    self.state.borrow().latest.get(repo).cloned()
  }

  pub fn has_tag(&self, repo: &RepoRef, name: &str) -> bool {
    self.state.borrow().tags.contains_key(&key(repo, name))
  }

  pub fn dispatches(&self) -> Vec<(RepoRef, String, String, Vec<(String, String)>)> {
    self.state.borrow().dispatches.clone()
  }

  // ------------------------------------------------------------------
  // Used by FakeCheckout
  // ------------------------------------------------------------------

  fn push_branch(&self, repo: &RepoRef, branch: &str, sha: &str, files: Files) {
    let mut s = self.state.borrow_mut();
    s.mutations.push(format!("push_branch {} {}", repo, branch));
    s.branches.insert(key(repo, branch), (sha.to_string(), files));
  }

  fn push_tag(&self, repo: &RepoRef, name: &str, sha: &str) {
    let mut s = self.state.borrow_mut();
    s.mutations.push(format!("push_tag {} {}", repo, name));
    s.tags.insert(key(repo, name), sha.to_string());
  }

  fn next_sha(&self) -> String {
    self.state.borrow_mut().sha()
  }

  fn record(&self, mutation: String) {
    self.state.borrow_mut().mutations.push(mutation);
  }
}

fn fake_release(repo: &RepoRef, tag: &str, body: &str, prerelease: bool) -> Release {
  Release {
    tag: tag.to_string(),
    name: tag.to_string(),
    url: repo.web_url(&format!("releases/tag/{}", tag)),
    body: body.to_string(),
    prerelease,
    assets: Vec::new(),
  }
}

impl SourceHost for FakeHost {
  fn get_branch(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<Branch>> {
    Ok(self.state.borrow().branches.get(&key(repo, name)).map(|(sha, _)| Branch {
      name: name.to_string(),
      sha: sha.clone(),
    }))
  }

  fn create_branch(&self, repo: &RepoRef, name: &str, source: &str) -> ReleaseResult<Branch> {
    let mut s = self.state.borrow_mut();
    let (sha, files) = s
      .branches
      .get(&key(repo, source))
      .cloned()
      .ok_or_else(|| ReleaseError::message(format!("source branch {} not found", source)))?;
    s.mutations.push(format!("create_branch {} {}", repo, name));
    s.branches.insert(key(repo, name), (sha.clone(), files));
    Ok(Branch {
      name: name.to_string(),
      sha,
    })
  }

  fn get_pull_request(&self, repo: &RepoRef, head: &str) -> ReleaseResult<Option<PullRequest>> {
    Ok(self.pull_request(repo, head))
  }

  fn create_pull_request(&self, repo: &RepoRef, pr: &NewPullRequest) -> ReleaseResult<PullRequest> {
    let mut s = self.state.borrow_mut();
    let number = s.id();
    let created = PullRequest {
      number,
      url: repo.web_url(&format!("pull/{}", number)),
      head: pr.head.clone(),
      base: pr.base.clone(),
      title: pr.title.clone(),
      body: pr.body.clone(),
      state: PullRequestState::Open,
      draft: pr.draft,
      merged: false,
    };
    s.mutations.push(format!("create_pull_request {} {} -> {}", repo, pr.head, pr.base));
    s.pulls.push((repo.clone(), created.clone()));
    Ok(created)
  }

  fn update_pull_request_body(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<PullRequest> {
    let mut s = self.state.borrow_mut();
    s.mutations.push(format!("update_pull_request_body {} {}", repo, number));
    let pr = s
      .pulls
      .iter_mut()
      .find(|(r, p)| r == repo && p.number == number)
      .map(|(_, p)| p)
      .ok_or_else(|| ReleaseError::message(format!("pull request {} not found", number)))?;
    pr.body = body.to_string();
    Ok(pr.clone())
  }

  fn get_issue(&self, repo: &RepoRef, title: &str) -> ReleaseResult<Option<Issue>> {
    Ok(self.issues(repo).into_iter().find(|i| i.title == title))
  }

  fn create_issue(&self, repo: &RepoRef, title: &str, _body: &str) -> ReleaseResult<Issue> {
    self.record(format!("create_issue {} {}", repo, title));
    let number = self.seed_issue(repo, title);
    Ok(Issue {
      number,
      url: repo.web_url(&format!("issues/{}", number)),
      title: title.to_string(),
    })
  }

  fn get_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<Option<IssueComment>> {
    Ok(
      self
        .state
        .borrow()
        .comments
        .iter()
        .find(|(r, n, c)| r == repo && *n == number && c.body == body)
        .map(|(_, _, c)| c.clone()),
    )
  }

  fn create_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<IssueComment> {
    self.record(format!("create_issue_comment {} {}", repo, number));
    self.seed_comment(repo, number, body);
    self
      .get_issue_comment(repo, number, body)?
      .ok_or_else(|| ReleaseError::message("comment vanished"))
  }

  fn get_file(&self, repo: &RepoRef, path: &str, reference: &str) -> ReleaseResult<Option<String>> {
    Ok(
      self
        .state
        .borrow()
        .branches
        .get(&key(repo, reference))
        .and_then(|(_, files)| files.get(path).cloned()),
    )
  }

  fn get_tag(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<TagRef>> {
    Ok(self.state.borrow().tags.get(&key(repo, name)).map(|sha| TagRef {
      name: name.to_string(),
      sha: sha.clone(),
    }))
  }

  fn get_release(&self, repo: &RepoRef, tag: &str) -> ReleaseResult<Option<Release>> {
    Ok(self.releases(repo).into_iter().find(|r| r.tag == tag))
  }

  fn get_latest_release(&self, repo: &RepoRef) -> ReleaseResult<Option<Release>> {
    let Some(tag) = self.latest_release_tag(repo) else {
      return Ok(None);
    };
    self.get_release(repo, &tag)
  }

  fn create_release(&self, repo: &RepoRef, release: &NewRelease) -> ReleaseResult<Release> {
    let mut s = self.state.borrow_mut();
    s.mutations.push(format!("create_release {} {}", repo, release.tag));
    let created = fake_release(repo, &release.tag, &release.body, release.prerelease);
    s.releases.push((repo.clone(), created.clone()));
    if release.make_latest {
      s.latest.insert(repo.clone(), release.tag.clone());
    }
    Ok(created)
  }

  fn list_check_runs(&self, repo: &RepoRef, reference: &str) -> ReleaseResult<Vec<CheckRun>> {
    Ok(
      self
        .state
        .borrow()
        .check_runs
        .get(&key(repo, reference))
        .cloned()
        .unwrap_or_default(),
    )
  }

  fn trigger_workflow(
    &self,
    repo: &RepoRef,
    file: &str,
    reference: &str,
    inputs: &[(String, String)],
  ) -> ReleaseResult<()> {
    let mut s = self.state.borrow_mut();
    s.mutations.push(format!("trigger_workflow {} {} {}", repo, file, reference));
    s.dispatches
      .push((repo.clone(), file.to_string(), reference.to_string(), inputs.to_vec()));
    Ok(())
  }

  fn get_latest_workflow_run(
    &self,
    repo: &RepoRef,
    file: &str,
    branch: Option<&str>,
  ) -> ReleaseResult<Option<WorkflowRun>> {
    Ok(
      self
        .state
        .borrow()
        .workflow_runs
        .iter()
        .rev()
        .find(|(r, f, b, _)| r == repo && f == file && (branch.is_none() || b.as_deref() == branch))
        .map(|(_, _, _, run)| run.clone()),
    )
  }

  fn get_workflow_run_logs(&self, _repo: &RepoRef, run_id: u64) -> ReleaseResult<WorkflowLogs> {
    Ok(self.state.borrow().logs.get(&run_id).cloned().unwrap_or_default())
  }

  fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> ReleaseResult<Vec<CommitSummary>> {
    Ok(
      self
        .state
        .borrow()
        .comparisons
        .get(&(repo.clone(), base.to_string(), head.to_string()))
        .cloned()
        .unwrap_or_default(),
    )
  }
}

// ======================================================================
// Version control
// ======================================================================

/// Effect of a local command on the checked-out files; returns the command's stdout
pub type CommandEffect = fn(&mut Files, &LocalCommand) -> String;

pub struct FakeVcs {
  host: Rc<FakeHost>,
  effects: RefCell<HashMap<String, CommandEffect>>,
  commands: Rc<RefCell<Vec<String>>>,
  checkouts: Cell<usize>,
}

impl FakeVcs {
  pub fn new(host: Rc<FakeHost>) -> Self {
    Self {
      host,
      effects: RefCell::new(HashMap::new()),
      commands: Rc::new(RefCell::new(Vec::new())),
      checkouts: Cell::new(0),
    }
  }

  /// Simulate `program` by applying `effect` to the working copy
  pub fn on_command(&self, program: &str, effect: CommandEffect) {
    self.effects.borrow_mut().insert(program.to_string(), effect);
  }

  /// Every local command run so far, rendered as a command line
  pub fn commands(&self) -> Vec<String> {
    self.commands.borrow().clone()
  }

  pub fn checkout_count(&self) -> usize {
    self.checkouts.get()
  }
}

impl VersionControl for FakeVcs {
  fn checkout(&self, repo: &RepoRef, branch: &str, sha: &str) -> ReleaseResult<Box<dyn Checkout>> {
    self.checkouts.set(self.checkouts.get() + 1);
    let files = self
      .host
      .state
      .borrow()
      .branches
      .values()
      .find(|(s, _)| s == sha)
      .map(|(_, f)| f.clone())
      .ok_or_else(|| ReleaseError::message(format!("commit {} not found in {}", sha, repo)))?;

    Ok(Box::new(FakeCheckout {
      host: self.host.clone(),
      repo: repo.clone(),
      branch: branch.to_string(),
      path: PathBuf::from(format!("/fake/{}/{}", repo, branch)),
      base: files.clone(),
      files: RefCell::new(files),
      head: RefCell::new(sha.to_string()),
      effects: self.effects.borrow().clone(),
      commands: self.commands.clone(),
    }))
  }
}

pub struct FakeCheckout {
  host: Rc<FakeHost>,
  repo: RepoRef,
  branch: String,
  path: PathBuf,
  base: Files,
  files: RefCell<Files>,
  head: RefCell<String>,
  effects: HashMap<String, CommandEffect>,
  commands: Rc<RefCell<Vec<String>>>,
}

impl Checkout for FakeCheckout {
  fn path(&self) -> &Path {
    &self.path
  }

  fn branch(&self) -> &str {
    &self.branch
  }

  fn read_file(&self, rel: &str) -> ReleaseResult<Option<String>> {
    Ok(self.files.borrow().get(rel).cloned())
  }

  fn write_file(&self, rel: &str, content: &str) -> ReleaseResult<()> {
    self.files.borrow_mut().insert(rel.to_string(), content.to_string());
    Ok(())
  }

  fn run(&self, command: &LocalCommand) -> ReleaseResult<String> {
    self.commands.borrow_mut().push(command.to_string());
    Ok(match self.effects.get(&command.program) {
      Some(effect) => effect(&mut self.files.borrow_mut(), command),
      None => String::new(),
    })
  }

  fn commit(&self, _pathspec: &str, _message: &str) -> ReleaseResult<Option<String>> {
    if *self.files.borrow() == self.base {
      return Ok(None);
    }
    let sha = self.host.next_sha();
    *self.head.borrow_mut() = sha.clone();
    Ok(Some(sha))
  }

  fn tag(&self, target: &str, name: &str, _message: &str) -> ReleaseResult<TagInfo> {
    Ok(TagInfo {
      name: name.to_string(),
      sha: self.host.next_sha(),
      target: target.to_string(),
      signature: None,
    })
  }

  fn push_branch(&self) -> ReleaseResult<()> {
    let head = self.head.borrow().clone();
    self
      .host
      .push_branch(&self.repo, &self.branch, &head, self.files.borrow().clone());
    Ok(())
  }

  fn push_tag(&self, name: &str) -> ReleaseResult<()> {
    let head = self.head.borrow().clone();
    self.host.push_tag(&self.repo, name, &head);
    Ok(())
  }
}

// ======================================================================
// Operator, chat, executor fakes
// ======================================================================

/// Answers confirmations from a script; answers `false` once the script runs out
#[derive(Default)]
pub struct ScriptedConfirm {
  answers: RefCell<VecDeque<bool>>,
  prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
  pub fn new(answers: &[bool]) -> Self {
    Self {
      answers: RefCell::new(answers.iter().copied().collect()),
      prompts: RefCell::new(Vec::new()),
    }
  }

  pub fn always_yes() -> Self {
    Self::new(&[true; 16])
  }

  pub fn prompts(&self) -> Vec<String> {
    self.prompts.borrow().clone()
  }
}

impl Confirm for ScriptedConfirm {
  fn confirm(&self, prompt: &str) -> ReleaseResult<bool> {
    self.prompts.borrow_mut().push(prompt.to_string());
    Ok(self.answers.borrow_mut().pop_front().unwrap_or(false))
  }
}

#[derive(Default)]
pub struct FakeMatrix {
  pub messages: RefCell<Vec<Message>>,
}

impl FakeMatrix {
  pub fn post(&self, sender: &str, body: &str) {
    self.messages.borrow_mut().push(Message {
      sender: sender.to_string(),
      body: body.to_string(),
    });
  }
}

impl Messaging for FakeMatrix {
  fn room_id(&self, alias: &str) -> ReleaseResult<String> {
    Ok(format!("!{}", alias.trim_start_matches('#')))
  }

  fn latest_messages_by(
    &self,
    _alias: &str,
    sender: &str,
    limit: usize,
    contains: Option<&str>,
  ) -> ReleaseResult<Vec<Message>> {
    Ok(
      self
        .messages
        .borrow()
        .iter()
        .rev()
        .filter(|m| m.sender == sender)
        .take(limit)
        .filter(|m| contains.is_none_or(|c| m.body.contains(c)))
        .cloned()
        .collect(),
    )
  }
}

/// Action whose check results and run result are scripted in advance
pub struct ScriptedAction {
  checks: RefCell<VecDeque<ReleaseResult<CheckOutcome>>>,
  run_result: RefCell<Option<ReleaseError>>,
  pub check_calls: Cell<usize>,
  pub run_calls: Cell<usize>,
}

impl ScriptedAction {
  pub fn new(checks: Vec<ReleaseResult<CheckOutcome>>) -> Self {
    Self {
      checks: RefCell::new(checks.into()),
      run_result: RefCell::new(None),
      check_calls: Cell::new(0),
      run_calls: Cell::new(0),
    }
  }

  pub fn failing_run(self, err: ReleaseError) -> Self {
    *self.run_result.borrow_mut() = Some(err);
    self
  }
}

impl Action for ScriptedAction {
  fn name(&self) -> &str {
    "scripted"
  }

  fn description(&self) -> &str {
    "replays scripted outcomes"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    self.check_calls.set(self.check_calls.get() + 1);
    self
      .checks
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(|| panic!("check called more often than scripted ({} calls)", self.check_calls.get()))
  }

  fn run(&self) -> ReleaseResult<()> {
    self.run_calls.set(self.run_calls.get() + 1);
    match self.run_result.borrow_mut().take() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

/// Records requested sleeps instead of sleeping
#[derive(Default)]
pub struct RecordingSleeper {
  pub slept: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
  fn sleep(&self, duration: Duration) {
    self.slept.borrow_mut().push(duration);
  }
}

/// Fakes wired together for action tests
pub struct Harness {
  pub host: Rc<FakeHost>,
  pub vcs: FakeVcs,
  pub confirm: ScriptedConfirm,
  pub repos: Repos,
}

impl Harness {
  pub fn new(answers: &[bool]) -> Self {
    let host = FakeHost::new();
    Self {
      vcs: FakeVcs::new(host.clone()),
      host,
      confirm: ScriptedConfirm::new(answers),
      repos: Repos::default(),
    }
  }

  pub fn ctx(&self, version: &str) -> ReleaseContext<'_> {
    let version = Version::parse(version).unwrap_or_else(|e| panic!("bad test version: {}", e));
    ReleaseContext::new(&*self.host, &self.vcs, &self.confirm, &self.repos, version)
  }

  pub fn kubo(&self) -> RepoRef {
    self.repos.project.repo()
  }
}
