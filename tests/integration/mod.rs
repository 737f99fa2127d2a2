//! Integration tests driving the compiled `releaser` binary against a mock GitHub API

mod helpers;
mod test_cli;
mod test_tag;
