pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod metrics;
pub mod payload;
pub mod types;
