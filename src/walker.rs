//! Discovers `.c`/`.h` files to extract, ported from the teacher's
//! `src/indexing/walker.rs`: `ignore::WalkBuilder` respecting `.gitignore`,
//! a custom `.ckg-ignore` file, and the configured ignore-pattern
//! overrides.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config::ExtractionConfig;

pub struct FileWalker<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> FileWalker<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false)
            .add_custom_ignore_filename(".ckg-ignore");

        let mut override_builder = ignore::overrides::OverrideBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!(target: "walker", pattern, error = %e, "invalid ignore pattern");
            }
        }
        if let Ok(overrides) = override_builder.build() {
            builder.overrides(overrides);
        }

        builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();
                match path.extension().and_then(|e| e.to_str()) {
                    Some("c") | Some("h") => Some(path.to_path_buf()),
                    _ => None,
                }
            })
            .collect()
    }
}
