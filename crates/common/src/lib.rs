//! Common utilities and shared types for reportd.
//!
//! This crate provides foundational components used across all reportd crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Storage**: Local filesystem backend for report attachments
//!
//! # Example
//!
//! ```no_run
//! use reportd_common::{Config, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use storage::{AttachmentStorage, LocalStorage, StoredFile, generate_storage_key};
