//! Core engine for releaser
//!
//! - **config**: releaser.toml + environment, resolved once at start-up
//! - **context**: adapters and release-wide values shared by every action
//! - **error**: error types with contextual help messages and exit codes
//! - **executor**: check → run → poll-check reconciliation loop
//! - **logging**: tracing subscriber setup
//! - **vcs**: scoped git working copies (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod vcs;
