//! Rewrites a compile command's arguments per spec.md §6's Subprocess
//! Contract and invokes the external preprocessor.

use std::process::Command;

use tempfile::NamedTempFile;

use crate::config::PreprocessorConfig;
use crate::error::{PreprocessError, PreprocessResult};
use crate::preprocess::compile_commands::CompileCommand;

/// Rewrite a compile command's argument list into a pure preprocessing
/// invocation:
/// - drop `-c` and its paired `-o <file>` (or `-o<file>`)
/// - drop flags named in `strip_flags` / prefixed by `strip_flag_prefixes`
/// - append `-E` so the compiler only preprocesses
pub fn rewrite_arguments(arguments: &[String], config: &PreprocessorConfig) -> Vec<String> {
    let mut out = Vec::with_capacity(arguments.len() + 1);
    let mut iter = arguments.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == "-c" {
            continue;
        }
        if arg == "-o" {
            iter.next(); // drop the paired output path
            continue;
        }
        if let Some(rest) = arg.strip_prefix("-o") {
            if !rest.is_empty() {
                continue;
            }
        }
        if config.strip_flags.iter().any(|f| f == arg) {
            continue;
        }
        if config.strip_flag_prefixes.iter().any(|p| arg.starts_with(p.as_str())) {
            continue;
        }
        out.push(arg.clone());
    }

    for dir in &config.extra_include_dirs {
        out.push("-I".to_string());
        out.push(dir.to_string_lossy().into_owned());
    }

    out.push("-E".to_string());
    out
}

/// Run the preprocessor for `command`, returning its stdout. Non-zero exit
/// is a `PreprocessError::SubprocessFailed`, matching the "warn and skip"
/// handling in spec.md §7 (callers decide whether to skip this file).
pub fn run_preprocessor(command: &CompileCommand, config: &PreprocessorConfig) -> PreprocessResult<String> {
    let Some((compiler, rest)) = command.arguments.split_first() else {
        return Err(PreprocessError::NoCompileCommand { path: command.file.clone() });
    };

    let args = rewrite_arguments(rest, config);

    // A managed temp file keeps the preprocessed output out of the source
    // tree even though we read it back via captured stdout; some
    // preprocessors refuse to emit to stdout with certain flag
    // combinations, so we always pass an explicit -o as a fallback sink.
    let temp = NamedTempFile::new().map_err(|e| PreprocessError::SpawnFailed {
        path: command.file.clone(),
        source: e,
    })?;

    let output = Command::new(compiler)
        .args(&args)
        .arg("-o")
        .arg(temp.path())
        .current_dir(&command.directory)
        .output()
        .map_err(|e| PreprocessError::SpawnFailed { path: command.file.clone(), source: e })?;

    if !output.status.success() {
        return Err(PreprocessError::SubprocessFailed {
            path: command.file.clone(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    std::fs::read_to_string(temp.path()).map_err(|e| PreprocessError::SpawnFailed {
        path: command.file.clone(),
        source: e,
    })
}
