//! skill-learner - learn from how a documentation skill is used
//!
//! Scans usage/feedback logs and error logs for module names, API identifiers
//! and failure reports, keeps running counts in a JSON file inside the skill
//! directory, and turns the most frequent patterns into Markdown suggestions
//! for improving the skill's reference docs.

pub mod cli;
pub mod config;
pub mod error_log;
pub mod feedback;
pub mod patterns;
pub mod store;
pub mod suggest;
pub mod util;
