//! Reading field/data documents and writing reports.

mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{load_document, load_form_document, parse_document_str};
pub use output::{OutputDestination, OutputOptions, emit};
