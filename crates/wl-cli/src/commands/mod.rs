//! CLI subcommand implementations.

pub mod daily;
pub mod events;
pub mod log;
pub mod places;
pub mod resolve;
pub mod summary;
pub mod task;
pub mod util;
