use super::probes::check_pull_request;
use super::{Action, CheckOutcome};
use crate::check_step;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::{self, LocalCommand};
use crate::github::NewPullRequest;
use crate::release::date::ReleaseDate;
use crate::release::repos::RepoConfig;

/// Pull request bumping the release in a dependent repository
///
/// The change is made by running commands in a working copy of the head branch; a
/// marker string in one file tells whether the change is already there.
pub struct DownstreamUpdate<'a> {
  ctx: ReleaseContext<'a>,
  name: &'static str,
  description: &'static str,
  target: &'a RepoConfig,
  head: String,
  title: String,
  body: String,
  draft: bool,
  /// File that contains `marker` once updated
  file: String,
  marker: String,
  /// Paths committed after the commands ran
  pathspec: String,
  commands: Vec<LocalCommand>,
}

impl<'a> DownstreamUpdate<'a> {
  /// Interoperability test suite (`npm install go-ipfs@<v> --save-dev`)
  pub fn interop(ctx: ReleaseContext<'a>) -> Self {
    let version = ctx.version.clone();
    let repos = ctx.repos;
    Self {
      name: "update-interop",
      description: "Updating the interop test suite",
      target: &repos.interop,
      head: format!("update-kubo-{}", version.major_minor()),
      title: format!("Update Kubo: {}", version.major_minor()),
      body: format!("This PR updates Kubo to {}", version.major_minor()),
      draft: version.is_prerelease(),
      file: "package.json".to_string(),
      marker: format!("\"^{}\"", version.number()),
      pathspec: "package*.json".to_string(),
      commands: vec![LocalCommand::new(
        "npm",
        ["install".to_string(), format!("go-ipfs@{}", version), "--save-dev".to_string()],
      )],
      ctx,
    }
  }

  /// Desktop application (`npm install go-ipfs@<v> --save`)
  pub fn desktop(ctx: ReleaseContext<'a>) -> Self {
    let version = ctx.version.clone();
    let repos = ctx.repos;
    Self {
      name: "update-ipfs-desktop",
      description: "Updating IPFS Desktop",
      target: &repos.ipfs_desktop,
      head: format!("update-kubo-{}", version.major_minor()),
      title: format!("Update Kubo: {}", version.major_minor()),
      body: format!("This PR updates Kubo to {}", version.major_minor()),
      draft: version.is_prerelease(),
      file: "package.json".to_string(),
      marker: format!("{}\"", version.number()),
      pathspec: "package*.json".to_string(),
      commands: vec![LocalCommand::new(
        "npm",
        ["install".to_string(), format!("go-ipfs@{}", version), "--save".to_string()],
      )],
      ctx,
    }
  }

  /// Release note entry on the blog, dated `date`
  pub fn blog(ctx: ReleaseContext<'a>, date: ReleaseDate) -> Self {
    let version = ctx.version.clone();
    let repos = ctx.repos;
    let file = "src/_blog/releasenotes.md".to_string();
    let script = format!(
      r#"echo "---
$(cat '{file}' |
  head -n-2 |
  tail -n+2 |
  yq --yaml-output --indentless '.data |= [
    {{
      "title": "Just released: Kubo {number}!",
      "date": "{date}",
      "publish_date": null,
      "path": "{url}",
      "tags": [
        "go-ipfs",
        "kubo"
      ]
    }}
  ] + .')
---" > '{file}'"#,
      file = file,
      number = version.number(),
      date = date,
      url = ctx.project().release_url(&version),
    );
    Self {
      name: "update-ipfs-blog",
      description: "Adding the release note to the blog",
      target: &repos.ipfs_blog,
      head: format!("update-kubo-{}", version.major_minor()),
      title: format!("Add release note: Kubo {}", version),
      body: format!("This PR adds a release note for the {} Kubo release.", version),
      draft: false,
      marker: format!("Kubo {}!", version.number()),
      pathspec: file.clone(),
      file,
      commands: vec![LocalCommand::new("bash", ["-c".to_string(), script])],
      ctx,
    }
  }

  fn has_marker(&self, reference: &str) -> ReleaseResult<Option<bool>> {
    let content = self.ctx.host.get_file(&self.target.repo(), &self.file, reference)?;
    Ok(content.map(|c| c.contains(&self.marker)))
  }
}

impl Action for DownstreamUpdate<'_> {
  fn name(&self) -> &str {
    self.name
  }

  fn description(&self) -> &str {
    self.description
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let repo = self.target.repo();
    if self.has_marker(&self.target.default_branch)? == Some(true) {
      return Ok(CheckOutcome::Complete);
    }
    match self.has_marker(&self.head)? {
      None => {
        return Ok(CheckOutcome::incomplete(format!(
          "{} not found on {} in {}",
          self.file, self.head, repo
        )))
      }
      Some(false) => {
        return Ok(CheckOutcome::incomplete(format!(
          "{} on {} in {} does not contain {}",
          self.file, self.head, repo, self.marker
        )))
      }
      Some(true) => {}
    }
    check_step!(check_pull_request(self.ctx.host, &repo, &self.head, false)?);
    Ok(CheckOutcome::Complete)
  }

  fn run(&self) -> ReleaseResult<()> {
    let repo = self.target.repo();
    if self.has_marker(&self.target.default_branch)? == Some(true) {
      tracing::info!("{} in {} already contains {}", self.file, repo, self.marker);
      return Ok(());
    }

    let branch = self
      .ctx
      .host
      .get_or_create_branch(&repo, &self.head, &self.target.default_branch)?;
    if self.has_marker(&self.head)? != Some(true) {
      vcs::run_and_push(
        self.ctx.vcs,
        &repo,
        &self.head,
        &branch.sha,
        &self.pathspec,
        &format!("chore: update {}", self.file),
        &self.commands,
      )?;
    }

    let pr = self.ctx.host.get_or_create_pull_request(
      &repo,
      &NewPullRequest {
        head: self.head.clone(),
        base: self.target.default_branch.clone(),
        title: self.title.clone(),
        body: self.body.clone(),
        draft: self.draft,
      },
    )?;
    println!("💁 {} is ready at {}", self.title, pr.url);
    Ok(())
  }
}
