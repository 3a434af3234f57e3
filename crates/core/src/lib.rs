//! Core business logic for reportd.

pub mod services;

pub use services::*;
