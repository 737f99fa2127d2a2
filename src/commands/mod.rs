//! CLI commands for releaser
//!
//! - **release**: drive one release stage through check, run and check again
//!
//! Commands receive the already-loaded [`ReleaserConfig`](crate::core::config::ReleaserConfig)
//! and build their adapters from it.

pub mod release;

pub use release::{ReleaseArgs, Stage, run_release};
