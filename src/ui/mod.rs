pub mod confirm;

pub use confirm::{Confirm, StdinConfirm};
