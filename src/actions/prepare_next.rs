use super::probes::check_pull_request;
use super::{Action, CheckOutcome};
use crate::check_step;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::{self, Checkout};
use crate::github::NewPullRequest;
use crate::release::version::Version;
use crate::ui::confirm;

const ISSUE_TEMPLATE: &str = "docs/RELEASE_ISSUE_TEMPLATE.md";
const CHANGELOG_INDEX: &str = "CHANGELOG.md";

/// Open the next cycle: its release issue and an empty changelog
pub struct PrepareNext<'a> {
  ctx: ReleaseContext<'a>,
  next: Version,
}

impl<'a> PrepareNext<'a> {
  pub fn new(ctx: ReleaseContext<'a>) -> ReleaseResult<Self> {
    let next = ctx.version.next()?;
    Ok(Self { ctx, next })
  }

  fn issue_body(&self) -> ReleaseResult<String> {
    let project = self.ctx.project();
    let template = self
      .ctx
      .host
      .get_file(&project.repo(), ISSUE_TEMPLATE, &project.default_branch)?
      .ok_or_else(|| {
        ReleaseError::message(format!(
          "{} not found",
          project
            .repo()
            .web_url(&format!("tree/{}/{}", project.default_branch, ISSUE_TEMPLATE))
        ))
      })?;
    Ok(
      template
        .replace("vX.Y.Z", &self.next.major_minor_patch())
        .replace("vX.Y", &self.next.major_minor()),
    )
  }

  /// Write the changelog skeleton and link it from the index, each only when missing
  fn write_changelog(&self, checkout: &dyn Checkout) -> ReleaseResult<()> {
    let next = &self.next;
    let path = self.ctx.project().changelog_path(next);
    if checkout.read_file(&path)?.is_none() {
      checkout.write_file(&path, &changelog_skeleton(next))?;
    }

    let index = checkout.read_file(CHANGELOG_INDEX)?.unwrap_or_default();
    if !index.contains(&next.major_minor()) {
      let link = format!("- [{}]({})", next.major_minor(), path);
      checkout.write_file(CHANGELOG_INDEX, &insert_line(&index, 3, &link))?;
    }
    Ok(())
  }
}

fn changelog_skeleton(next: &Version) -> String {
  let mm = next.major_minor();
  format!(
    "# Kubo changelog {mm}\n\n\
- [{mm}.0](#{anchor}0)\n\n\
## {mm}.0\n\n\
- [Overview](#overview)\n\
- [🔦 Highlights](#-highlights)\n\
- [📝 Changelog](#-changelog)\n\
- [👨‍👩‍👧‍👦 Contributors](#-contributors)\n\n\
### Overview\n\n\
### 🔦 Highlights\n\n\
### 📝 Changelog\n\n\
### 👨‍👩‍👧‍👦 Contributors\n",
    mm = mm,
    anchor = format!("{}{}", next.major(), next.minor()),
  )
}

/// Insert `line` so it becomes line number `at` (1-based), appending when the text is shorter
fn insert_line(text: &str, at: usize, line: &str) -> String {
  let mut lines: Vec<&str> = text.lines().collect();
  let index = (at - 1).min(lines.len());
  lines.insert(index, line);
  let mut out = lines.join("\n");
  out.push('\n');
  out
}

impl Action for PrepareNext<'_> {
  fn name(&self) -> &str {
    "prepare-next"
  }

  fn description(&self) -> &str {
    "Opening the next release issue and changelog"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let project = self.ctx.project();
    let repo = project.repo();
    let title = project.release_issue_title(&self.next);
    if self.ctx.host.get_issue(&repo, &title)?.is_none() {
      return Ok(CheckOutcome::incomplete(format!(
        "issue '{}' not found in {}",
        title,
        repo.web_url("issues")
      )));
    }
    check_step!(check_pull_request(
      self.ctx.host,
      &repo,
      &project.changelog_branch(&self.next),
      true
    )?);
    Ok(CheckOutcome::Complete)
  }

  fn run(&self) -> ReleaseResult<()> {
    let project = self.ctx.project();
    let repo = project.repo();
    let next = &self.next;

    let issue = self
      .ctx
      .host
      .get_or_create_issue(&repo, &project.release_issue_title(next), &self.issue_body()?)?;
    println!("📋 Next release issue: {}", issue.url);

    let head = project.changelog_branch(next);
    let branch = self
      .ctx
      .host
      .get_or_create_branch(&repo, &head, &project.default_branch)?;
    let checkout = self.ctx.vcs.checkout(&repo, &head, &branch.sha)?;
    self.write_changelog(checkout.as_ref())?;
    vcs::commit_and_push(checkout.as_ref(), ".", "chore: create next changelog")?;
    drop(checkout);

    let pr = self.ctx.host.get_or_create_pull_request(
      &repo,
      &NewPullRequest {
        head,
        base: project.default_branch.clone(),
        title: format!("Create Changelog: {}", next.major_minor()),
        body: format!("This PR creates changelog: {}", next.major_minor()),
        draft: false,
      },
    )?;
    println!("💁 Your changelog PR is ready at {}", pr.url);
    confirm::confirm_merged(self.ctx.confirm, &pr)
  }
}
