//! Common types shared by the storage layer, the document model and the
//! HTML translator.

// Submodule declarations
pub mod error;
pub mod path;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use path::Path;
