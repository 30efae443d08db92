//! Extract command: the spec's single real work command. Runs an
//! incremental update against a prior snapshot in `<output>` when one
//! exists, or a full extraction otherwise; `--force` always does a full
//! extraction and overwrites whatever is already there.

use std::path::Path;

use crate::config::Settings;
use crate::pipeline;

pub fn run_extract(source: &Path, output: &Path, force: bool, threads: Option<usize>) {
    let mut settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });
    settings.output_path = output.to_path_buf();
    if let Some(threads) = threads {
        settings.extraction.parallel_threads = threads;
    }

    crate::logging::init_with_config(&settings.logging);

    let report = pipeline::run_incremental(source, &settings, output, force).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        for suggestion in e.recovery_suggestions() {
            eprintln!("  - {suggestion}");
        }
        std::process::exit(1);
    });

    if let Err(e) = pipeline::ensure_output_written(output, &report.snapshot) {
        eprintln!("Error writing graph to '{}': {e}", output.display());
        std::process::exit(1);
    }

    println!(
        "Extracted {} entities, {} relations ({} files processed, {} files removed)",
        report.snapshot.entities.len(),
        report.snapshot.relations.len(),
        report.files_processed,
        report.files_removed,
    );
}
