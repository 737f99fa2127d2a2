use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::matrix::Messaging;
use crate::ui::confirm;

const DISCUSS_MARKER: &str = "- 💬 [Discuss]";
/// How far back the announcer's messages are searched
const MATRIX_LOOKBACK: usize = 10;

/// Chat room where the release announcement is expected
pub struct Chat<'a> {
  pub client: &'a dyn Messaging,
  pub room: &'a str,
  /// Account that relays forum posts into the room
  pub announcer: &'a str,
}

/// Announce the release on the release issue and the community channels
///
/// Only the issue comment is automated. The forum post and social posts are operator
/// steps confirmed at the prompt; the chat room and release notes show whether they
/// happened.
pub struct Promote<'a> {
  ctx: ReleaseContext<'a>,
  chat: Option<Chat<'a>>,
}

impl<'a> Promote<'a> {
  pub fn new(ctx: ReleaseContext<'a>, chat: Option<Chat<'a>>) -> Self {
    Self { ctx, chat }
  }

  fn post_title(&self) -> String {
    format!("Kubo {} is out!", self.ctx.version)
  }

  fn post_body(&self) -> String {
    let version = &self.ctx.version;
    let project = self.ctx.project();
    format!(
      "## Kubo {v} is out!\n\n\
See:\n\
- Code: {release}\n\
- Binaries: https://dist.ipfs.tech/kubo/{v}/\n\
- Docker: `docker pull {owner}/{name}:{v}`\n\
- Release Notes: {notes}",
      v = version,
      release = project.release_url(version),
      owner = project.owner,
      name = project.name,
      notes = project.repo().web_url(&format!(
        "blob/{}/{}",
        project.version_release_branch(version),
        project.changelog_path(version)
      )),
    )
  }

  fn issue_comment(&self) -> String {
    let version = &self.ctx.version;
    let project = self.ctx.project();
    if version.is_prerelease() {
      format!(
        "Early testers ping for {} testing 😄.\n\n\
You're getting this message because you're listed [here]({}). \
Please update this list if you no longer want to be included.",
        version,
        project
          .repo()
          .web_url(&format!("blob/{}/docs/EARLY_TESTERS.md#who-has-signed-up", project.default_branch))
      )
    } else {
      format!("🎉 Kubo [{}]({}) is out!", version, project.release_url(version))
    }
  }

  fn highlights(&self) -> ReleaseResult<Vec<String>> {
    let project = self.ctx.project();
    let path = project.changelog_path(&self.ctx.version);
    let content = self
      .ctx
      .host
      .get_file(&project.repo(), &path, &project.release_branch)?
      .ok_or_else(|| {
        ReleaseError::message(format!(
          "{} not found",
          project.repo().web_url(&format!("blob/{}/{}", project.release_branch, path))
        ))
      })?;
    Ok(
      content
        .lines()
        .filter_map(|line| line.strip_prefix("##### "))
        .map(str::to_string)
        .collect(),
    )
  }
}

impl Action for Promote<'_> {
  fn name(&self) -> &str {
    "promote"
  }

  fn description(&self) -> &str {
    "Promoting the release"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let project = self.ctx.project();
    let repo = project.repo();
    let version = &self.ctx.version;
    let title = project.release_issue_title(version);

    let Some(issue) = self.ctx.host.get_issue(&repo, &title)? else {
      return Ok(CheckOutcome::failure(format!(
        "issue '{}' not found in {}",
        title,
        repo.web_url("issues")
      )));
    };
    if self
      .ctx
      .host
      .get_issue_comment(&repo, issue.number, &self.issue_comment())?
      .is_none()
    {
      return Ok(CheckOutcome::incomplete(format!(
        "release comment not found on {}",
        issue.url
      )));
    }

    match &self.chat {
      Some(chat) => {
        let title = self.post_title();
        let found = chat
          .client
          .latest_messages_by(chat.room, chat.announcer, MATRIX_LOOKBACK, Some(&title))?;
        if found.is_empty() {
          return Ok(CheckOutcome::incomplete(format!(
            "post '{}' not found in https://matrix.to/#/{}",
            title, chat.room
          )));
        }
      }
      None => tracing::warn!("skipping the Matrix check, no client configured"),
    }

    if !version.is_prerelease() {
      let Some(release) = self.ctx.host.get_release(&repo, version.as_str())? else {
        return Ok(CheckOutcome::failure(format!(
          "release {} not found in {}",
          version,
          repo.web_url("releases")
        )));
      };
      if !release.body.contains(DISCUSS_MARKER) {
        return Ok(CheckOutcome::incomplete(format!(
          "{} does not contain a discuss link",
          release.url
        )));
      }
    }
    Ok(CheckOutcome::Complete)
  }

  fn run(&self) -> ReleaseResult<()> {
    let project = self.ctx.project();
    let repo = project.repo();
    let version = &self.ctx.version;
    let url = project.release_url(version);
    let title = project.release_issue_title(version);
    let confirm = self.ctx.confirm;

    let issue = self.ctx.host.get_issue(&repo, &title)?.ok_or_else(|| {
      ReleaseError::message(format!("issue '{}' not found in {}", title, repo.web_url("issues")))
    })?;
    let comment = self
      .ctx
      .host
      .get_or_create_issue_comment(&repo, issue.number, &self.issue_comment())?;
    println!("💬 {}", comment.url);

    confirm::require(
      confirm,
      &format!(
        "Please go to https://discuss.ipfs.tech and create a new topic:\n\
Title: {}\n\
Category: News\n\
Tags: kubo, go-ipfs\n\
Body:\n{}\n\n\
Remember to pin the topic globally, then approve once the post is up.",
        self.post_title(),
        self.post_body()
      ),
      "The forum post",
    )?;

    if version.is_prerelease() {
      return Ok(());
    }

    confirm::require(
      confirm,
      &format!(
        "Go to {} and add the link to the forum post to the top of the release notes:\n\
{} (https://discuss.ipfs.tech/t/kubo-{}-is-out/XXXX)\n\n\
Approve once the link is in.",
        url,
        DISCUSS_MARKER,
        version.as_str().replace('.', "-")
      ),
      "The discuss link",
    )?;

    if version.is_patch() {
      return Ok(());
    }

    confirm::require(
      confirm,
      &format!(
        "Please go to https://www.reddit.com/r/ipfs/new/ and create a new \"Link\" post:\n\
Url: {}\n\n\
Approve once the post is up.",
        url
      ),
      "The Reddit post",
    )?;

    let highlights = self.highlights()?;
    confirm::require(
      confirm,
      &format!(
        "Please ask the marketing team to post the following:\n\n\
#Kubo {} was just released!\n{}\n{}\n\n\
Approve once the post is up.",
        version,
        highlights.join("\n"),
        url
      ),
      "The social media post",
    )
  }
}
