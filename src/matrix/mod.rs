//! Chat adapter (Matrix client-server API)

pub mod client;

pub use client::MatrixClient;

use crate::core::error::ReleaseResult;

/// A text message in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub sender: String,
  pub body: String,
}

pub trait Messaging {
  /// Resolve `#alias:server` to the internal `!id:server`
  fn room_id(&self, alias: &str) -> ReleaseResult<String>;

  /// Newest `limit` messages posted by `sender` in `alias`, newest first,
  /// keeping only those whose body contains `contains` when given
  fn latest_messages_by(
    &self,
    alias: &str,
    sender: &str,
    limit: usize,
    contains: Option<&str>,
  ) -> ReleaseResult<Vec<Message>>;
}
