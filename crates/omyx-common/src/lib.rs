//! omyx-common: Shared types and errors used across all omyx crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use error::{OmyxError, Result};
pub use entities::{LayerMatrix, LayerType};
