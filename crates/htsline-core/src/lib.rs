//! # htsline-core
//!
//! Core types, traits, and abstractions for htsline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other htsline crates depend on: the shared error type, the
//! classification and rate data model, the backend trait seams, and the
//! centralized defaults.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
