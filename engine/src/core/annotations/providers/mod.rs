//! Annotator Implementations
//!
//! Concrete implementations of the Annotator trait.

mod command;
mod json_file;
mod punctuation;

pub use command::CommandAnnotator;
pub use json_file::JsonFileAnnotator;
pub use punctuation::PunctuationAnnotator;
