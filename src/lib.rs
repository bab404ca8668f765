//! Commentary - LLM-backed replies to YouTube comments
//!
//! A small pipeline that reads a viewer comment and drafts the creator's reply.
//!
//! # Overview
//!
//! Every comment goes through the same stages:
//! - a filter decides whether the comment deserves a reply at all
//! - a router sorts accepted comments into praise or questions
//! - praise gets a short thank-you styled after the creator's past replies
//! - questions are researched on the web and in the channel's video transcripts,
//!   merged into one brief, and answered from that brief only
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Completion service abstraction, OpenAI-compatible client, retry policy
//! - `transcript` - Keyword lookup over the transcript corpus
//! - `exemplars` - Style exemplars (past comment/reply pairs)
//! - `agents` - One type per pipeline stage
//! - `coordinator` - Runs a comment through the stages
//!
//! # Example
//!
//! ```rust,no_run
//! use commentary::config::Settings;
//! use commentary::coordinator::Coordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let coordinator = Coordinator::new(&settings)?;
//!
//!     let outcome = coordinator.process("What is a good GATE score?").await?;
//!     println!("{}", outcome.response);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod exemplars;
pub mod llm;
pub mod resource;
pub mod transcript;

pub use error::{CommentaryError, Result};
