//! Unified error types for odr.
//!
//! Errors from the compound file reader, XML and ZIP collaborators are folded
//! into one enum so callers match on a single type.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
