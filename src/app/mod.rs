//! Application layer: configuration, batch execution, and exports.

pub mod config;
pub mod export;
pub mod runner;

pub use config::Config;
