//! Phase 2 (spec.md §4.2): a single recursive tree-sitter-c walk per file
//! producing FILE/FUNCTION/STRUCT/FIELD/VARIABLE entities.

mod extractor;

pub use extractor::{extract_file, ExtractionOutput};
