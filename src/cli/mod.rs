//! CLI module graph.

pub mod algorithms;
pub mod command;
pub mod compare;
pub mod config;
pub mod detect;
pub mod diagnostic;
pub mod epochs;
pub mod info;
pub mod init;
pub mod output;
pub mod paths;
