//! Phase 1 of the pipeline (spec.md §4.1): locate macro call sites in the
//! original source, run the external preprocessor, and recover the text
//! each macro expanded to.

mod annotate;
mod compile_commands;
mod expander;
mod macro_locator;
mod subprocess;

pub use annotate::{build_annotated_stream, AnnotatedLine};
pub use compile_commands::{load_compile_commands, CompileCommand};
pub use expander::{canonicalize_head, expand_macros, MacroEntry};
pub use macro_locator::{locate_macro_sites, MacroSite};
pub use subprocess::{rewrite_arguments, run_preprocessor};

use std::collections::HashMap;
use std::path::Path;

use crate::config::PreprocessorConfig;
use crate::error::PreprocessResult;
use crate::types::FileId;

/// Canonicalized macro expansions for one source tree, keyed by the file
/// they were found in. Consulted by the relation extractors (spec.md §4.4,
/// §4.5) whenever a call/assignment/return site is itself a macro
/// invocation.
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    by_file: HashMap<FileId, Vec<MacroEntry>>,
}

impl MacroTable {
    pub fn insert(&mut self, file: FileId, entries: Vec<MacroEntry>) {
        self.by_file.entry(file).or_default().extend(entries);
    }

    /// Find the macro entry whose span contains the given point, if any.
    pub fn lookup(&self, file: FileId, line: u32, column: u32) -> Option<&MacroEntry> {
        self.by_file
            .get(&file)?
            .iter()
            .find(|entry| entry.site_span.contains_point(line, column))
    }
}

/// Run the full macro-locate-and-expand phase for one file.
///
/// `original_source` is the raw (un-preprocessed) file contents;
/// `compile_command` is the matching entry from compile_commands.json, if
/// any — files with no compile command are skipped per spec.md §7 and this
/// returns `Ok(Vec::new())`.
pub fn process_file(
    path: &Path,
    file_id: FileId,
    original_source: &str,
    compile_command: Option<&CompileCommand>,
    config: &PreprocessorConfig,
) -> PreprocessResult<Vec<MacroEntry>> {
    let sites = locate_macro_sites(original_source);
    if sites.is_empty() {
        return Ok(Vec::new());
    }

    let Some(command) = compile_command else {
        tracing::warn!(target: "preprocess", path = %path.display(), "no compile command; skipping macro expansion");
        return Ok(Vec::new());
    };

    let preprocessed = run_preprocessor(command, config)?;
    let annotated = build_annotated_stream(&preprocessed);
    let entries = expand_macros(path, &sites, original_source, &annotated);
    let _ = file_id; // file identity carried by caller via MacroTable::insert
    Ok(entries)
}
