use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::date::ReleaseDate;
use chrono::NaiveDate;

/// Tell the infrastructure team a rollout is coming (or has happened)
///
/// A date in the future is an advance notice: only the rollout issue is opened. Once the
/// date has passed, a comment records that the release was published.
pub struct NotifyBifrost<'a> {
  ctx: ReleaseContext<'a>,
  date: ReleaseDate,
  today: NaiveDate,
}

impl<'a> NotifyBifrost<'a> {
  pub fn new(ctx: ReleaseContext<'a>, date: ReleaseDate, today: NaiveDate) -> Self {
    Self { ctx, date, today }
  }

  fn title(&self) -> String {
    format!(
      "Rollout Kubo {} to a Cluster, Gateway and Bootstrapper bank",
      self.ctx.version.major_minor_patch()
    )
  }

  fn body(&self) -> String {
    format!(
      "A new Kubo release process - {} - is starting on {}",
      self.ctx.version.major_minor_patch(),
      self.date
    )
  }

  fn comment(&self) -> String {
    format!(
      "A new Kubo release - {} - was published on {}",
      self.ctx.version, self.date
    )
  }
}

impl Action for NotifyBifrost<'_> {
  fn name(&self) -> &str {
    "notify-bifrost"
  }

  fn description(&self) -> &str {
    "Notifying the infrastructure team"
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    let repo = self.ctx.repos.bifrost.repo();
    let Some(issue) = self.ctx.host.get_issue(&repo, &self.title())? else {
      return Ok(CheckOutcome::incomplete(format!(
        "issue '{}' not found in {}",
        self.title(),
        repo
      )));
    };
    if self.date.is_advance_notice(self.today) {
      return Ok(CheckOutcome::Complete);
    }
    Ok(
      match self.ctx.host.get_issue_comment(&repo, issue.number, &self.comment())? {
        Some(_) => CheckOutcome::Complete,
        None => CheckOutcome::incomplete(format!("comment '{}' not found on {}", self.comment(), issue.url)),
      },
    )
  }

  fn run(&self) -> ReleaseResult<()> {
    let repo = self.ctx.repos.bifrost.repo();
    let issue = self.ctx.host.get_or_create_issue(&repo, &self.title(), &self.body())?;
    println!("📣 Rollout issue: {}", issue.url);

    if self.date.is_advance_notice(self.today) {
      tracing::info!("{} is in the future, not announcing the publication yet", self.date);
      return Ok(());
    }
    self
      .ctx
      .host
      .get_or_create_issue_comment(&repo, issue.number, &self.comment())?;
    Ok(())
  }
}
