//! CLI command implementations.

mod batch;
mod config;
mod respond;
mod search;
mod serve;

pub use batch::run_batch;
pub use config::run_config;
pub use respond::run_respond;
pub use search::run_search;
pub use serve::run_serve;
