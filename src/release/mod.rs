//! Per-release parameters: the version being released, its date, and the
//! repositories and branch names derived from them.

pub mod date;
pub mod repos;
pub mod version;

pub use date::ReleaseDate;
pub use version::Version;
