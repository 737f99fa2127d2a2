//! Error types for releaser with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to operators. Classified action outcomes that end an
//! invocation (`Wait`, `Incomplete`, `Failure`) are carried as [`PendingError`] so the
//! exit status tells scripts whether re-running later can help.

use crate::actions::Severity;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for releaser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, declined confirmation)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// An action reached a state that needs manual intervention
  Failure = 3,
  /// An action is waiting on something outside this invocation
  Pending = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for releaser
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Remote API errors (source hosting, chat)
  Api(ApiError),

  /// Version string is not a valid semantic version
  InvalidVersion { input: String, reason: String },

  /// Action stopped in a classified, unfinished state
  Pending(PendingError),

  /// Operator did not approve a confirmation prompt
  Declined { what: String },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Confirmation for `what` was not given
  pub fn declined(what: impl Into<String>) -> Self {
    ReleaseError::Declined { what: what.into() }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Api(_) => ExitCode::System,
      ReleaseError::InvalidVersion { .. } => ExitCode::User,
      ReleaseError::Pending(p) => match p.severity {
        Severity::Failure => ExitCode::Failure,
        Severity::Wait | Severity::Incomplete => ExitCode::Pending,
      },
      ReleaseError::Declined { .. } => ExitCode::User,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Api(e) => e.help_message(),
      ReleaseError::InvalidVersion { .. } => {
        Some("Versions look like v0.18.0 or v0.18.0-rc1 (leading 'v', three numeric components).".to_string())
      }
      ReleaseError::Pending(p) => p.help_message(),
      ReleaseError::Declined { .. } => {
        Some("Nothing was rolled back. Re-run the same command once the step is done.".to_string())
      }
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Api(e) => write!(f, "{}", e),
      ReleaseError::InvalidVersion { input, reason } => {
        write!(f, "Invalid version '{}': {}", input, reason)
      }
      ReleaseError::Pending(p) => write!(f, "{}", p),
      ReleaseError::Declined { what } => write!(f, "🚨 {} was not confirmed", what),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<base64::DecodeError> for ReleaseError {
  fn from(err: base64::DecodeError) -> Self {
    ReleaseError::message(format!("Base64 decode error: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Invalid pattern: {}", err))
  }
}

impl From<reqwest::Error> for ReleaseError {
  fn from(err: reqwest::Error) -> Self {
    ReleaseError::Api(ApiError::Transport {
      url: err.url().map(|u| u.to_string()).unwrap_or_default(),
      reason: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit --config path does not exist
  NotFound { path: PathBuf },

  /// A credential needed by an adapter is not set
  MissingCredential { field: String, env: String },

  /// A value is present but unusable
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop --config to use releaser.toml from the current directory, or defaults.".to_string())
      }
      ConfigError::MissingCredential { env, .. } => Some(format!("Export {} before running this command.", env)),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::MissingCredential { field, env } => {
        write!(f, "Missing credential '{}' (env var {} must be set)", field, env)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Local command run inside a working copy failed
  LocalCommandFailed { command: String, status: String, stderr: String },

  /// Push failed
  PushFailed { remote: String, refspec: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote branch moved. Re-run the command; it starts from the current branch head.".to_string())
        } else if reason.contains("403") || reason.contains("denied") {
          Some("Check that GITHUB_TOKEN has push access to the repository.".to_string())
        } else {
          None
        }
      }
      GitError::LocalCommandFailed { command, .. } => Some(format!(
        "The working copy was discarded. Make sure '{}' runs cleanly on the branch and re-run.",
        command
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::LocalCommandFailed { command, status, stderr } => {
        write!(f, "Command '{}' failed ({})\n{}", command, status, stderr)
      }
      GitError::PushFailed { remote, refspec, reason } => {
        write!(f, "Push of {} to {} failed: {}", refspec, remote, reason)
      }
    }
  }
}

/// Remote API errors
#[derive(Debug)]
pub enum ApiError {
  /// Server answered with a non-success status
  Status {
    method: String,
    url: String,
    status: u16,
    message: String,
  },

  /// Request never produced a response (DNS, TLS, connection, body decoding)
  Transport { url: String, reason: String },
}

impl ApiError {
  fn help_message(&self) -> Option<String> {
    match self {
      ApiError::Status { status: 401, .. } => Some("The token was rejected. Check GITHUB_TOKEN / MATRIX_TOKEN.".to_string()),
      ApiError::Status { status: 403, .. } => {
        Some("Forbidden or rate limited. Check token scopes, or wait and re-run.".to_string())
      }
      ApiError::Status { status: 422, .. } => {
        Some("The request was rejected as invalid; the resource may be in an unexpected state.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Status {
        method,
        url,
        status,
        message,
      } => write!(f, "{} {} returned {}: {}", method, url, status, message),
      ApiError::Transport { url, reason } => write!(f, "Request to {} failed: {}", url, reason),
    }
  }
}

/// An action finished the invocation without reaching its goal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingError {
  pub action: String,
  pub severity: Severity,
  pub message: String,
}

impl PendingError {
  fn help_message(&self) -> Option<String> {
    Some(match self.severity {
      Severity::Wait => format!(
        "Something is still running. Re-run `releaser release ... {}` later to keep waiting.",
        self.action
      ),
      Severity::Incomplete => format!(
        "Resolve the missing step above, then re-run `{}`; finished steps are skipped.",
        self.action
      ),
      Severity::Failure => "This needs manual intervention: fix the resource named above, then re-run.".to_string(),
    })
  }
}

impl fmt::Display for PendingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} [{}]: {}", self.action, self.severity, self.message)
  }
}

/// Result type alias for releaser
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
