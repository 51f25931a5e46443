pub mod query;
pub mod matcher;
pub mod engine;
pub mod history;
