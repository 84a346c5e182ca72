pub mod cli;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod report;
pub mod session;
pub mod util;

pub use error::ExtractError;
