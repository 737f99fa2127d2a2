mod actions;
mod commands;
mod core;
mod github;
mod matrix;
mod release;
mod ui;

#[cfg(test)]
mod test_support;

use crate::commands::{ReleaseArgs, Stage};
use crate::core::config::ReleaserConfig;
use crate::core::error::{ReleaseError, ReleaseResult, print_error};
use crate::core::executor::ExecuteOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive a release and its downstream rollouts through resumable stages
///
/// Every stage checks the external state first, runs only when something is
/// missing, and checks again until the state converges.
#[derive(Parser)]
#[command(name = "releaser")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Config file (default: releaser.toml, .releaser.toml or .config/releaser.toml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
  #[arg(short = 'l', long, default_value = "info", global = true)]
  log_level: String,

  /// Skip the check before running a stage
  #[arg(long, visible_alias = "scb", global = true)]
  skip_check_before: bool,

  /// Skip running a stage (check only)
  #[arg(long, visible_alias = "sr", global = true)]
  skip_run: bool,

  /// Skip the check after running a stage
  #[arg(long, visible_alias = "sca", global = true)]
  skip_check_after: bool,

  /// Stop at the first check that is still waiting instead of polling
  #[arg(long, visible_alias = "sw", global = true)]
  skip_wait: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run one stage of a release
  Release {
    /// Version being released (vX.Y.Z or vX.Y.Z-rcN)
    #[arg(long)]
    version: String,

    /// Release date as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,

    /// Do not look for the announcement in Matrix
    #[arg(long, env = "NO_MATRIX", value_parser = clap::builder::FalseyValueParser::new())]
    skip_matrix: bool,

    #[command(subcommand)]
    stage: Stage,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let rust_log = std::env::var("RUST_LOG").ok();
  if let Err(err) = crate::core::logging::init(&cli.log_level, rust_log.as_deref()) {
    handle_error(err);
  }

  if let Err(err) = run(cli) {
    handle_error(err);
  }
}

fn run(cli: Cli) -> ReleaseResult<()> {
  let workspace_root = std::env::current_dir()?;

  // Config and environment are read once, here
  let mut config = ReleaserConfig::load(cli.config.as_deref(), &workspace_root)?;
  config.apply_env(|key| std::env::var(key).ok());

  let options = ExecuteOptions {
    skip_check_before: cli.skip_check_before,
    skip_run: cli.skip_run,
    skip_check_after: cli.skip_check_after,
    skip_wait: cli.skip_wait,
  };

  match cli.command {
    Commands::Release {
      version,
      date,
      skip_matrix,
      stage,
    } => commands::run_release(
      &config,
      options,
      &ReleaseArgs {
        version,
        date,
        skip_matrix,
        stage,
      },
    ),
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
