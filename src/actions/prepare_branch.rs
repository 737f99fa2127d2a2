//! Version branches and pull requests that open a release
//!
//! For every release a `release-vX.Y.Z` branch (from the default branch, or from the
//! previous patch's branch) carries the bumped version into the long-lived release
//! branch. The first release of a cycle also moves the default branch to the next
//! development version.

use super::probes::check_pull_request;
use super::{Action, CheckOutcome};
use crate::check_step;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::{self, LocalCommand};
use crate::github::{CommitSummary, NewPullRequest, PullRequest};
use crate::ui::confirm;
use regex::Regex;

const VERSION_FILE: &str = "version.go";
const CHANGELOG_PLACEHOLDER: &str = "### 📝 Changelog\n\n### 👨‍👩‍👧‍👦 Contributors\n";

pub struct PrepareBranch<'a> {
  ctx: ReleaseContext<'a>,
}

/// One "set the version on a branch and propose it" step
struct VersionUpdate {
  branch: String,
  source: String,
  number: String,
  base: String,
  title: String,
  body: String,
  draft: bool,
}

impl<'a> PrepareBranch<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> Self {
    Self { ctx }
  }

  fn release_update(&self) -> VersionUpdate {
    let project = self.ctx.project();
    let version = &self.ctx.version;
    let source = match version.previous_patch() {
      Some(previous) if version.is_patch() => project.version_release_branch(&previous),
      _ => project.default_branch.clone(),
    };
    VersionUpdate {
      branch: project.version_release_branch(version),
      source,
      number: version.number().to_string(),
      base: project.release_branch.clone(),
      title: format!("Release: {} [skip changelog]", version.major_minor_patch()),
      body: format!("This PR creates release {}", version.major_minor_patch()),
      draft: version.is_prerelease(),
    }
  }

  fn dev_update(&self) -> ReleaseResult<VersionUpdate> {
    let project = self.ctx.project();
    let version = &self.ctx.version;
    let dev = version.dev()?;
    Ok(VersionUpdate {
      branch: project.version_update_branch(version),
      source: project.default_branch.clone(),
      number: dev.trim_start_matches('v').to_string(),
      base: project.default_branch.clone(),
      title: format!("Update Version: {} [skip changelog]", version.major_minor()),
      body: format!("This PR updates version as part of the {} release", version.major_minor()),
      draft: false,
    })
  }

  /// Get-or-create the branch, set the version constant on it, get-or-create the PR
  fn apply(&self, update: &VersionUpdate) -> ReleaseResult<PullRequest> {
    let repo = self.ctx.project_repo();
    let branch = self
      .ctx
      .host
      .get_or_create_branch(&repo, &update.branch, &update.source)?;

    let checkout = self.ctx.vcs.checkout(&repo, &update.branch, &branch.sha)?;
    let current = checkout.read_file(VERSION_FILE)?.ok_or_else(|| {
      ReleaseError::message(format!(
        "{} not found",
        repo.web_url(&format!("tree/{}/{}", update.branch, VERSION_FILE))
      ))
    })?;
    let bumped = set_version_number(&current, &update.number)?;
    if bumped != current {
      checkout.write_file(VERSION_FILE, &bumped)?;
    }
    vcs::commit_and_push(checkout.as_ref(), VERSION_FILE, "chore: update version")?;
    drop(checkout);

    self.ctx.host.get_or_create_pull_request(
      &repo,
      &NewPullRequest {
        head: update.branch.clone(),
        base: update.base.clone(),
        title: update.title.clone(),
        body: update.body.clone(),
        draft: update.draft,
      },
    )
  }

  /// PR description: `foreword` plus the project and library commits the release leaves out
  fn pr_body(&self, branch: &str, foreword: &str) -> ReleaseResult<String> {
    let project = self.ctx.project();
    let repo = project.repo();
    let boxo = &self.ctx.repos.boxo;

    let project_commits = self.ctx.host.compare(&repo, branch, &project.default_branch)?;

    let go_mod = self
      .ctx
      .host
      .get_file(&repo, "go.mod", branch)?
      .ok_or_else(|| ReleaseError::message(format!("{} not found", repo.web_url(&format!("tree/{}/go.mod", branch)))))?;
    let module = format!("github.com/{}/{}", boxo.owner, boxo.name);
    let boxo_ref = library_ref(&go_mod, &module).ok_or_else(|| {
      ReleaseError::message(format!(
        "{} version not found in {}",
        module,
        repo.web_url(&format!("tree/{}/go.mod", branch))
      ))
    })?;
    let boxo_commits = self
      .ctx
      .host
      .compare(&boxo.repo(), &boxo_ref, &boxo.default_branch)?;

    Ok(format!(
      "{}\n\n---\n\n#### {} commits **NOT** included in this release\n\n{}\n\n#### {} commits **NOT** included in this release\n\n{}",
      foreword,
      capitalize(&project.name),
      code_block(&project_commits),
      capitalize(&boxo.name),
      code_block(&boxo_commits)
    ))
  }

  /// Replace the changelog placeholder with the generated release log on `branch`
  fn write_release_log(&self, branch: &str) -> ReleaseResult<()> {
    let repo = self.ctx.project_repo();
    let version = &self.ctx.version;
    let path = self.ctx.project().changelog_path(version);

    let head = self
      .ctx
      .host
      .get_branch(&repo, branch)?
      .ok_or_else(|| ReleaseError::message(format!("branch {} does not exist in {}", branch, repo)))?;
    let checkout = self.ctx.vcs.checkout(&repo, branch, &head.sha)?;
    let changelog = checkout.read_file(&path)?.ok_or_else(|| {
      ReleaseError::with_help(
        format!("{} not found", repo.web_url(&format!("tree/{}/{}", branch, path))),
        "The changelog is created by `prepare-next` of the previous release.",
      )
    })?;
    if !changelog.contains(CHANGELOG_PLACEHOLDER) {
      tracing::info!("{} already has a release log", path);
      return Ok(());
    }

    println!("⏳ Generating the release log, this takes a while");
    let log = checkout.run(&LocalCommand::new("./bin/mkreleaselog", Vec::<String>::new()))?;
    if log.trim().is_empty() {
      return Err(ReleaseError::message("./bin/mkreleaselog produced no output"));
    }
    checkout.write_file(&path, &changelog.replacen(CHANGELOG_PLACEHOLDER, &log, 1))?;
    vcs::commit_and_push(
      checkout.as_ref(),
      &path,
      &format!("chore: update changelog for {}", version.major_minor()),
    )?;
    Ok(())
  }
}

/// Set `const CurrentVersionNumber = "..."` to `number`
fn set_version_number(source: &str, number: &str) -> ReleaseResult<String> {
  let re = Regex::new(r#"const CurrentVersionNumber = ".*""#)?;
  if !re.is_match(source) {
    return Err(ReleaseError::message(format!(
      "CurrentVersionNumber not found in {}",
      VERSION_FILE
    )));
  }
  let replacement = format!("const CurrentVersionNumber = \"{}\"", number);
  Ok(re.replace_all(source, regex::NoExpand(&replacement)).into_owned())
}

/// Branch, tag or commit of `module` pinned in go.mod (the commit of a pseudo-version)
fn library_ref(go_mod: &str, module: &str) -> Option<String> {
  let version = go_mod
    .lines()
    .map(str::trim)
    .filter(|line| line.starts_with(module))
    .find_map(|line| line.split_whitespace().nth(1))?;
  Some(match version.split('-').nth(2) {
    Some(commit) => commit.to_string(),
    None => version.to_string(),
  })
}

fn code_block(commits: &[CommitSummary]) -> String {
  let mut block = String::from("```\n");
  for commit in commits {
    block.push_str(&commit.one_line());
    block.push('\n');
  }
  block.push_str("```");
  block
}

fn capitalize(name: &str) -> String {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

impl Action for PrepareBranch<'_> {
  fn name(&self) -> &str {
    "prepare-branch"
  }

  fn description(&self) -> &str {
    "Preparing the release branch and version pull requests"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let project = self.ctx.project();
    let repo = project.repo();
    let version = &self.ctx.version;
    let final_release = !version.is_prerelease();

    check_step!(check_pull_request(
      self.ctx.host,
      &repo,
      &project.version_release_branch(version),
      final_release
    )?);
    if !version.is_patch() {
      check_step!(check_pull_request(
        self.ctx.host,
        &repo,
        &project.version_update_branch(version),
        final_release
      )?);
    }
    Ok(CheckOutcome::Complete)
  }

  fn run(&self) -> ReleaseResult<()> {
    let repo = self.ctx.project_repo();
    let version = &self.ctx.version;

    let release = self.release_update();
    let pr = self.apply(&release)?;
    let body = self.pr_body(&release.branch, &release.body)?;
    let pr = if pr.body != body {
      self.ctx.host.update_pull_request_body(&repo, pr.number, &body)?
    } else {
      pr
    };
    println!("💁 Your release PR is ready at {}", pr.url);

    confirm::require(
      self.ctx.confirm,
      &format!(
        "If needed, check out the {} branch of {} and cherry-pick commits from {} using:\n\n\
git cherry-pick -x <commit>\n\n\
Please approve after all the required commits are cherry-picked.",
        release.branch,
        repo,
        self.ctx.project().default_branch
      ),
      &format!("Cherry-picking commits to {}", repo.web_url(&format!("tree/{}", release.branch))),
    )?;

    if !version.is_prerelease() {
      self.write_release_log(&release.branch)?;
      println!("Use a merge commit to merge this PR! You'll have to tag it after the merge.");
      confirm::confirm_merged(self.ctx.confirm, &pr)?;
    }

    if !version.is_patch() {
      let pr = self.apply(&self.dev_update()?)?;
      if version.is_prerelease() {
        println!("💁 Version update PR ready at {}. Do not merge it.", pr.url);
      } else {
        confirm::confirm_merged(self.ctx.confirm, &pr)?;
      }
    }
    Ok(())
  }
}
