use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::executor::BackoffPolicy;
use crate::release::repos::Repos;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for releaser
///
/// Searched in order: releaser.toml, .releaser.toml, .config/releaser.toml.
/// Credentials normally come from the environment and are merged in once by
/// [`ReleaserConfig::apply_env`]; nothing downstream reads the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaserConfig {
  #[serde(default)]
  pub github: GitHubConfig,
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub matrix: MatrixConfig,
  #[serde(default)]
  pub backoff: BackoffConfig,
  #[serde(default)]
  pub repos: Repos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
  /// REST API root (override for GitHub Enterprise or tests)
  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Personal access token; never written back to disk
  #[serde(default, skip_serializing)]
  pub token: Option<String>,
}

fn default_api_url() -> String {
  "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      token: None,
    }
  }
}

/// Identity and transport for local working copies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  /// Remotes are `<remote_base>/<owner>/<repo>`
  #[serde(default = "default_remote_base")]
  pub remote_base: String,

  #[serde(default = "default_user_name")]
  pub user_name: String,

  #[serde(default = "default_user_email")]
  pub user_email: String,

  /// GPG key used to sign tags; unsigned annotated tags when absent
  #[serde(default)]
  pub signing_key: Option<String>,
}

fn default_remote_base() -> String {
  "https://github.com".to_string()
}

fn default_user_name() -> String {
  "Kubo Releaser".to_string()
}

fn default_user_email() -> String {
  "noreply+kuboreleaser@ipfs.tech".to_string()
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote_base: default_remote_base(),
      user_name: default_user_name(),
      user_email: default_user_email(),
      signing_key: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
  #[serde(default = "default_homeserver")]
  pub homeserver: String,

  /// Room the release announcement is expected in
  #[serde(default = "default_room")]
  pub room: String,

  /// Account that posts the announcement
  #[serde(default = "default_announcer")]
  pub announcer: String,

  #[serde(default)]
  pub user: Option<String>,

  #[serde(default, skip_serializing)]
  pub access_token: Option<String>,

  #[serde(default, skip_serializing)]
  pub password: Option<String>,
}

fn default_homeserver() -> String {
  "https://matrix-client.matrix.org".to_string()
}

fn default_room() -> String {
  "#ipfs-chatter:ipfs.io".to_string()
}

fn default_announcer() -> String {
  "@ipfsbot:matrix.org".to_string()
}

impl Default for MatrixConfig {
  fn default() -> Self {
    Self {
      homeserver: default_homeserver(),
      room: default_room(),
      announcer: default_announcer(),
      user: None,
      access_token: None,
      password: None,
    }
  }
}

impl MatrixConfig {
  /// Whether any credential is available to talk to the homeserver
  pub fn has_credentials(&self) -> bool {
    self.access_token.is_some() || (self.user.is_some() && self.password.is_some())
  }
}

/// Polling schedule for the post-run convergence loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
  #[serde(default = "default_initial_delay_secs")]
  pub initial_delay_secs: u64,

  #[serde(default = "default_interval_secs")]
  pub interval_secs: u64,

  #[serde(default = "default_factor")]
  pub factor: f64,

  #[serde(default = "default_ceiling_secs")]
  pub ceiling_secs: u64,
}

fn default_initial_delay_secs() -> u64 {
  10
}

fn default_interval_secs() -> u64 {
  10
}

fn default_factor() -> f64 {
  2.0
}

fn default_ceiling_secs() -> u64 {
  60
}

impl Default for BackoffConfig {
  fn default() -> Self {
    Self {
      initial_delay_secs: default_initial_delay_secs(),
      interval_secs: default_interval_secs(),
      factor: default_factor(),
      ceiling_secs: default_ceiling_secs(),
    }
  }
}

impl BackoffConfig {
  pub fn validate(&self) -> ReleaseResult<()> {
    if !self.factor.is_finite() || self.factor < 1.0 {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "backoff.factor".to_string(),
        reason: format!("must be at least 1.0 (got {})", self.factor),
      }));
    }
    if self.ceiling_secs < self.interval_secs {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "backoff.ceiling_secs".to_string(),
        reason: format!(
          "must not be below backoff.interval_secs ({} < {})",
          self.ceiling_secs, self.interval_secs
        ),
      }));
    }
    Ok(())
  }

  pub fn policy(&self) -> BackoffPolicy {
    BackoffPolicy {
      initial_delay: Duration::from_secs(self.initial_delay_secs),
      interval: Duration::from_secs(self.interval_secs),
      factor: self.factor,
      ceiling: Duration::from_secs(self.ceiling_secs),
    }
  }
}

impl ReleaserConfig {
  /// Find config file in search order: releaser.toml, .releaser.toml, .config/releaser.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("releaser.toml"),
      path.join(".releaser.toml"),
      path.join(".config").join("releaser.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit file, or search `dir`; defaults when nothing is found
  pub fn load(explicit: Option<&Path>, dir: &Path) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(p) if !p.exists() => {
        return Err(ReleaseError::Config(ConfigError::NotFound { path: p.to_path_buf() }));
      }
      Some(p) => Some(p.to_path_buf()),
      None => Self::find_config_path(dir),
    };

    let Some(config_path) = config_path else {
      tracing::debug!("no releaser.toml found under {}, using defaults", dir.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;
    tracing::debug!("loaded config from {}", config_path.display());

    Ok(config)
  }

  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaserConfig = toml_edit::de::from_str(content)?;
    config.backoff.validate()?;
    Ok(config)
  }

  /// Merge credentials and endpoint overrides from an environment lookup
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(v) = get("GITHUB_TOKEN") {
      self.github.token = Some(v);
    }
    if let Some(v) = get("GITHUB_API_URL") {
      self.github.api_url = v;
    }
    if let Some(v) = get("GITHUB_USER_NAME") {
      self.git.user_name = v;
    }
    if let Some(v) = get("GITHUB_USER_EMAIL") {
      self.git.user_email = v;
    }
    if let Some(v) = get("GIT_REMOTE_BASE") {
      self.git.remote_base = v;
    }
    if let Some(v) = get("GPG_KEY_ID") {
      self.git.signing_key = Some(v);
    }
    if let Some(v) = get("MATRIX_URL") {
      self.matrix.homeserver = v;
    }
    if let Some(v) = get("MATRIX_USER") {
      self.matrix.user = Some(v);
    }
    if let Some(v) = get("MATRIX_TOKEN") {
      self.matrix.access_token = Some(v);
    }
    if let Some(v) = get("MATRIX_PASSWORD") {
      self.matrix.password = Some(v);
    }
  }

  /// GitHub token, required by the REST client and authenticated pushes
  pub fn github_token(&self) -> ReleaseResult<&str> {
    self.github.token.as_deref().ok_or_else(|| {
      ReleaseError::Config(ConfigError::MissingCredential {
        field: "github.token".to_string(),
        env: "GITHUB_TOKEN".to_string(),
      })
    })
  }
}
