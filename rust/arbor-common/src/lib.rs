//! Core definitions (error type, result alias, verification macros), relied upon
//! by all arbor-* crates.

pub mod error;
pub mod result;

pub use result::Result;
