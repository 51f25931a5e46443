pub mod types;
pub mod cache;
pub mod config;
pub mod error;
pub mod stats;
