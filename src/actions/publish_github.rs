use super::probes::{literal, WorkflowProbe};
use super::{Action, CheckOutcome};
use crate::check_step;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::github::NewRelease;
use crate::release::version::Version;

const OVERVIEW_LINK: &str = "- [Overview](#overview)\n";

/// Publish the GitHub release and sync its assets to the distribution site
pub struct PublishToGitHub<'a> {
  ctx: ReleaseContext<'a>,
  sync: WorkflowProbe,
}

impl<'a> PublishToGitHub<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> ReleaseResult<Self> {
    let project = ctx.project();
    let sync = WorkflowProbe {
      repo: project.repo(),
      file: project.sync_assets_workflow.clone(),
      branch: Some(project.default_branch.clone()),
      job: project.sync_assets_job.clone(),
      pattern: literal(ctx.version.as_str())?,
    };
    Ok(Self { ctx, sync })
  }

  fn release_body(&self) -> ReleaseResult<String> {
    let project = self.ctx.project();
    let version = &self.ctx.version;
    let changelog = project.changelog_path(version);

    if version.is_prerelease() {
      let url = project
        .repo()
        .web_url(&format!("blob/{}/{}", project.version_release_branch(version), changelog));
      return Ok(format!("Changelog: [{}]({})", changelog, url));
    }

    let content = self
      .ctx
      .host
      .get_file(&project.repo(), &changelog, &project.release_branch)?
      .ok_or_else(|| {
        ReleaseError::with_help(
          format!("{} does not exist on {}", changelog, project.release_branch),
          "The changelog is created by `prepare-next` and filled in by `prepare-branch`.",
        )
      })?;
    Ok(changelog_section(&content, version))
  }

  /// Whether `version` should become the repository's latest release
  fn is_newest(&self) -> ReleaseResult<bool> {
    let version = &self.ctx.version;
    if version.is_prerelease() {
      return Ok(false);
    }
    let Some(latest) = self.ctx.host.get_latest_release(&self.ctx.project_repo())? else {
      return Ok(true);
    };
    Ok(match Version::parse(&latest.tag) {
      Ok(latest) => *version >= latest,
      Err(_) => {
        tracing::warn!("latest release tag {} is not a version", latest.tag);
        true
      }
    })
  }
}

/// Release notes for `version`: the changelog text after its overview link, ending at
/// the previous patch's section
fn changelog_section(content: &str, version: &Version) -> String {
  let body = content
    .split_once(OVERVIEW_LINK)
    .map(|(_, rest)| rest)
    .unwrap_or(content);
  let body = match version.previous_patch() {
    Some(previous) => {
      let heading = format!("## {}\n", previous.major_minor_patch());
      body.split_once(&heading).map(|(head, _)| head).unwrap_or(body)
    }
    None => body,
  };
  body.trim().to_string()
}

impl Action for PublishToGitHub<'_> {
  fn name(&self) -> &str {
    "publish-to-github"
  }

  fn description(&self) -> &str {
    "Publishing the GitHub release"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let repo = self.ctx.project_repo();
    let version = &self.ctx.version;
    if self.ctx.host.get_release(&repo, version.as_str())?.is_none() {
      return Ok(CheckOutcome::incomplete(format!(
        "release {} does not exist in {}",
        version, repo
      )));
    }
    check_step!(self.sync.check(self.ctx.host)?);
    Ok(CheckOutcome::Complete)
  }

  fn run(&self) -> ReleaseResult<()> {
    let project = self.ctx.project();
    let repo = project.repo();
    let version = &self.ctx.version;

    let release = match self.ctx.host.get_release(&repo, version.as_str())? {
      Some(existing) => existing,
      None => self.ctx.host.create_release(
        &repo,
        &NewRelease {
          tag: version.to_string(),
          name: version.to_string(),
          body: self.release_body()?,
          prerelease: version.is_prerelease(),
          make_latest: self.is_newest()?,
        },
      )?,
    };
    println!("📦 Release {} is at {}", release.tag, release.url);

    if self.sync.needs_dispatch(self.ctx.host)? {
      self
        .ctx
        .host
        .trigger_workflow(&repo, &self.sync.file, &project.default_branch, &[])?;
      println!("🚀 Dispatched {} to sync release assets", self.sync.file);
    }
    Ok(())
  }
}
