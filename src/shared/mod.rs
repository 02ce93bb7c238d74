//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod duration;
pub mod error;
