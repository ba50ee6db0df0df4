//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod courses;
mod import;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use courses::{run_courses, run_outline};
pub use import::run_import;
pub use serve::{router, run_serve};
