use super::probes::check_pull_request;
use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::github::NewPullRequest;
use crate::ui::confirm;

/// Bring the release branch back into the default branch
pub struct MergeBranch<'a> {
  ctx: ReleaseContext<'a>,
}

impl<'a> MergeBranch<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> Self {
    Self { ctx }
  }

  fn head(&self) -> String {
    self.ctx.project().release_merge_branch(&self.ctx.version)
  }
}

impl Action for MergeBranch<'_> {
  fn name(&self) -> &str {
    "merge-branch"
  }

  fn description(&self) -> &str {
    "Merging the release branch into the default branch"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    check_pull_request(self.ctx.host, &self.ctx.project_repo(), &self.head(), true)
  }

  fn run(&self) -> ReleaseResult<()> {
    let project = self.ctx.project();
    let repo = project.repo();
    let version = &self.ctx.version;
    let head = self.head();

    self
      .ctx
      .host
      .get_or_create_branch(&repo, &head, &project.release_branch)?;
    let pr = self.ctx.host.get_or_create_pull_request(
      &repo,
      &NewPullRequest {
        head,
        base: project.default_branch.clone(),
        title: format!("Merge Release: {} [skip changelog]", version),
        body: format!(
          "This PR merges the release branch {} to {}",
          version, project.default_branch
        ),
        draft: false,
      },
    )?;
    println!("💁 Your merge PR is ready at {}", pr.url);
    confirm::confirm_merged(self.ctx.confirm, &pr)
  }
}
