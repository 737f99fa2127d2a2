use super::probes::{check_pull_request, check_runs};
use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::{self, LocalCommand};
use crate::github::NewPullRequest;
use crate::release::repos::RepoConfig;

const VERSIONS_FILE: &str = "dists/kubo/versions";

/// Add the release to the distributions site
///
/// Once the versions file on the default branch lists the release, the site build on
/// that branch is what remains to watch.
pub struct PublishToDistributions<'a> {
  ctx: ReleaseContext<'a>,
  target: &'a RepoConfig,
}

impl<'a> PublishToDistributions<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> Self {
    let repos = ctx.repos;
    Self {
      target: &repos.distributions,
      ctx,
    }
  }

  fn head(&self) -> String {
    format!("publish-kubo-{}", self.ctx.version)
  }

  /// `None` when the versions file is missing at `reference`
  fn lists_version(&self, reference: &str) -> ReleaseResult<Option<bool>> {
    let content = self
      .ctx
      .host
      .get_file(&self.target.repo(), VERSIONS_FILE, reference)?;
    let version = self.ctx.version.as_str();
    Ok(content.map(|c| c.lines().any(|line| line.trim() == version)))
  }
}

impl Action for PublishToDistributions<'_> {
  fn name(&self) -> &str {
    "publish-to-distributions"
  }

  fn description(&self) -> &str {
    "Publishing to dist.ipfs.tech"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let repo = self.target.repo();
    if self.lists_version(&self.target.default_branch)? == Some(true) {
      return check_runs(self.ctx.host, &repo, &self.target.default_branch);
    }
    check_pull_request(self.ctx.host, &repo, &self.head(), true)
  }

  fn run(&self) -> ReleaseResult<()> {
    let repo = self.target.repo();
    let version = &self.ctx.version;
    if self.lists_version(&self.target.default_branch)? == Some(true) {
      tracing::info!("{} in {} already lists {}", VERSIONS_FILE, repo, version);
      return Ok(());
    }

    let head = self.head();
    let branch = self
      .ctx
      .host
      .get_or_create_branch(&repo, &head, &self.target.default_branch)?;
    if self.lists_version(&head)? != Some(true) {
      vcs::run_and_push(
        self.ctx.vcs,
        &repo,
        &head,
        &branch.sha,
        "dists/*/versions",
        "chore: update dists/kubo/versions",
        &[LocalCommand::new(
          "./dist.sh",
          ["add-version".to_string(), "kubo".to_string(), version.to_string()],
        )],
      )?;
    }

    let pr = self.ctx.host.get_or_create_pull_request(
      &repo,
      &NewPullRequest {
        head,
        base: self.target.default_branch.clone(),
        title: format!("Publish Kubo: {}", version),
        body: format!("This PR initiates publishing of Kubo {}", version),
        draft: false,
      },
    )?;
    println!("💁 Your distributions PR is ready at {}", pr.url);
    Ok(())
  }
}
