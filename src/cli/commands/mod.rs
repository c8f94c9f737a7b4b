//! CLI command implementations

pub mod cache;
pub mod compile;
pub mod config;

pub use cache::execute as cache;
pub use compile::execute as compile;
pub use config::execute as config;
