//! cuecards Core Engine
//!
//! Caption parsing, annotation capability, segmentation and persistence helpers.

pub mod annotations;
pub mod captions;
pub mod fs;
pub mod process;
pub mod segmentation;
pub mod settings;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
