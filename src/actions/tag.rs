use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::ui::confirm;

/// Cut the release tag from the head of the tag source branch
pub struct Tag<'a> {
  ctx: ReleaseContext<'a>,
}

impl<'a> Tag<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> Self {
    Self { ctx }
  }
}

impl Action for Tag<'_> {
  fn name(&self) -> &str {
    "tag"
  }

  fn description(&self) -> &str {
    "Creating and pushing the release tag"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let repo = self.ctx.project_repo();
    let version = &self.ctx.version;
    Ok(match self.ctx.host.get_tag(&repo, version.as_str())? {
      Some(_) => CheckOutcome::Complete,
      None => CheckOutcome::incomplete(format!("tag {} does not exist in {}", version, repo)),
    })
  }

  fn run(&self) -> ReleaseResult<()> {
    let repo = self.ctx.project_repo();
    let version = &self.ctx.version;

    if let Some(tag) = self.ctx.host.get_tag(&repo, version.as_str())? {
      tracing::info!("tag {} already points at {}", tag.name, tag.sha);
      return Ok(());
    }

    let source = self.ctx.project().tag_source_branch(version);
    let branch = self.ctx.host.get_branch(&repo, &source)?.ok_or_else(|| {
      ReleaseError::with_help(
        format!("branch {} does not exist in {}", source, repo),
        "Run `prepare-branch` for this version first.",
      )
    })?;

    let checkout = self.ctx.vcs.checkout(&repo, &branch.name, &branch.sha)?;
    let tag = checkout.tag(&branch.sha, version.as_str(), &format!("Release {}", version))?;

    println!("🏷️  Tag {} ({}) on {}@{}", tag.name, tag.sha, branch.name, branch.sha);
    match &tag.signature {
      Some(signature) => println!("{}", signature),
      None => println!("⚠️  The tag is not signed"),
    }

    confirm::require(
      self.ctx.confirm,
      &format!("Push tag {} to {}?", tag.name, repo),
      &format!("Pushing tag {}", tag.name),
    )?;
    checkout.push_tag(&tag.name)?;
    println!("✅ Pushed {}", repo.web_url(&format!("releases/tag/{}", tag.name)));
    Ok(())
  }
}
