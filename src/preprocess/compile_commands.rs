//! Loads `compile_commands.json`, the JSON Compilation Database format
//! consumed per spec.md §6. Keeps only the first entry per file, since a
//! build system occasionally emits duplicates (e.g. a file compiled into
//! two targets with identical flags) and spec.md defines the first record
//! as authoritative.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GraphError, GraphResult};

#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    directory: PathBuf,
    file: PathBuf,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompileCommand {
    pub directory: PathBuf,
    pub file: PathBuf,
    pub arguments: Vec<String>,
}

pub fn load_compile_commands(path: &Path) -> GraphResult<HashMap<PathBuf, CompileCommand>> {
    let text = std::fs::read_to_string(path).map_err(|e| GraphError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: Vec<RawEntry> = serde_json::from_str(&text).map_err(|e| GraphError::LoadError {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mut result = HashMap::new();
    for entry in raw {
        let canonical = crate::paths::normalize(&entry.directory.join(&entry.file));
        let canonical = PathBuf::from(canonical);
        if result.contains_key(&canonical) {
            continue;
        }
        let arguments = entry
            .arguments
            .unwrap_or_else(|| split_command_line(entry.command.as_deref().unwrap_or("")));
        result.insert(
            canonical.clone(),
            CompileCommand { directory: entry.directory, file: canonical, arguments },
        );
    }
    Ok(result)
}

/// Splits a shell-quoted command string into arguments. This is a plain
/// whitespace split with minimal quote handling — compile databases that
/// need full shell semantics should emit `arguments` instead of `command`.
fn split_command_line(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_char = '"';

    for ch in command.chars() {
        match ch {
            '"' | '\'' if !in_quotes => {
                in_quotes = true;
                quote_char = ch;
            }
            c if in_quotes && c == quote_char => {
                in_quotes = false;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_and_dedups_first_entry_per_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.c");
        std::fs::write(&src, "").unwrap();

        let db = dir.path().join("compile_commands.json");
        std::fs::write(
            &db,
            format!(
                r#"[
                  {{"directory": "{d}", "file": "a.c", "arguments": ["cc", "-c", "a.c", "-o", "a.o"]}},
                  {{"directory": "{d}", "file": "a.c", "arguments": ["cc", "-DDUPLICATE"]}}
                ]"#,
                d = dir.path().display()
            ),
        )
        .unwrap();

        let commands = load_compile_commands(&db).unwrap();
        assert_eq!(commands.len(), 1);
        let (_, cmd) = commands.iter().next().unwrap();
        assert!(cmd.arguments.contains(&"-c".to_string()));
    }

    #[test]
    fn splits_quoted_command_string() {
        let args = split_command_line(r#"cc -DFOO="bar baz" -c a.c"#);
        assert_eq!(args, vec!["cc", "-DFOO=bar baz", "-c", "a.c"]);
    }
}
