//! # prsumma
//!
//! An HTTP service that summarises GitHub pull requests with a locally hosted LLM.
//!
//! ## Flow
//!
//! - **Fetch**: title and body of a pull request from the GitHub REST API
//! - **Summarise**: one non-streaming call to an Ollama model loaded at startup
//! - **Store** (optional): one `(pr_number, summary)` row in PostgreSQL

pub mod agent;
pub mod config;
pub mod db;
pub mod github;
pub mod server;
pub mod storage;
pub mod summary;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use server::AppState;
pub use summary::SummaryRecord;
