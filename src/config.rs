//! Layered configuration for the extraction pipeline.
//!
//! Sources, lowest to highest precedence: built-in defaults, the workspace
//! `.ckg/settings.toml`, then `CKG_`-prefixed environment variables with
//! `__` separating nested keys (e.g. `CKG_EXTRACTION__PARALLEL_THREADS=8`).
//! Modeled directly on the teacher's `src/config.rs`.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub preprocessor: PreprocessorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Directory names that mark a candidate project root when searching
    /// for quoted-include targets, per spec.md §4.3.
    #[serde(default = "default_project_root_markers")]
    pub project_root_markers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PreprocessorConfig {
    /// Compiler flags stripped before invoking the preprocessor, beyond the
    /// always-stripped `-c`/`-o` pair (spec.md §6 Subprocess Contract).
    #[serde(default = "default_strip_flags")]
    pub strip_flags: Vec<String>,

    /// Flag prefixes stripped regardless of exact value (e.g. `-ftls-model=`).
    #[serde(default = "default_strip_flag_prefixes")]
    pub strip_flag_prefixes: Vec<String>,

    #[serde(default)]
    pub extra_include_dirs: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 { 1 }
fn default_output_path() -> PathBuf { PathBuf::from(".ckg/graph") }
fn default_parallel_threads() -> usize { num_cpus::get() }
fn default_log_level() -> String { "warn".to_string() }

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "build/**".to_string(),
        ".git/**".to_string(),
        "*.generated.c".to_string(),
    ]
}

fn default_project_root_markers() -> Vec<String> {
    vec!["include".to_string(), "src".to_string(), "lib".to_string()]
}

fn default_strip_flags() -> Vec<String> {
    vec!["-fgnu89-inline".to_string()]
}

fn default_strip_flag_prefixes() -> Vec<String> {
    vec!["-ftls-model=".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            output_path: default_output_path(),
            extraction: ExtractionConfig::default(),
            preprocessor: PreprocessorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: default_ignore_patterns(),
            project_root_markers: default_project_root_markers(),
        }
    }
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            strip_flags: default_strip_flags(),
            strip_flag_prefixes: default_strip_flag_prefixes(),
            extra_include_dirs: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { default: default_log_level(), modules: HashMap::new() }
    }
}

const CONFIG_DIR: &str = ".ckg";
const ENV_PREFIX: &str = "CKG_";

impl Settings {
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
    }

    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(|a| a.to_path_buf())
    }

    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        if !config_path.exists() {
            return Err(format!(
                "No settings.toml found. Run 'ckg init' to create {}.",
                config_path.display()
            ));
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("cannot read configuration file: {e}"))?;
        toml::from_str::<Settings>(&content)
            .map_err(|e| format!("configuration file is corrupted: {e}\nRun 'ckg init --force' to regenerate."))?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");
        if !force && config_path.exists() {
            return Err("configuration file already exists; use --force to overwrite".into());
        }
        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.extraction.parallel_threads > 0);
        assert_eq!(settings.extraction.project_root_markers, vec!["include", "src", "lib"]);
    }

    #[test]
    fn load_from_toml_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
version = 2

[extraction]
parallel_threads = 4
ignore_patterns = ["vendor/**"]
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.extraction.parallel_threads, 4);
        assert_eq!(settings.extraction.ignore_patterns, vec!["vendor/**"]);
        // unspecified sections keep their defaults
        assert_eq!(settings.preprocessor.strip_flags, vec!["-fgnu89-inline"]);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = Settings::default();
        settings.extraction.parallel_threads = 2;
        settings.save(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.extraction.parallel_threads, 2);
    }

    #[test]
    fn env_override_takes_precedence() {
        let dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&dir).unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            dir.path().join(CONFIG_DIR).join("settings.toml"),
            "[extraction]\nparallel_threads = 4\n",
        )
        .unwrap();

        unsafe {
            std::env::set_var("CKG_EXTRACTION__PARALLEL_THREADS", "16");
        }

        let settings = Settings::load().unwrap();
        assert_eq!(settings.extraction.parallel_threads, 16);

        unsafe {
            std::env::remove_var("CKG_EXTRACTION__PARALLEL_THREADS");
        }
        std::env::set_current_dir(original_dir).unwrap();
    }
}
