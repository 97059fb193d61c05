//! Core types and utilities for hookpin
//!
//! This is the foundation crate (Layer 0) that all other hookpin crates depend on.
//! It provides:
//! - Base error types
//! - File type identification (identify-style tags)
//!
//! This crate has no dependencies on other hookpin crates.

pub mod error;
pub mod identify;

pub use error::{Error, Result};
pub use identify::{is_known_tag, tags_for_name, tags_for_path};
