//! Structured error types for the extraction pipeline.
//!
//! Layered the way the teacher layers errors (`IndexError`/`ParseError`/
//! `StorageError` in its `error.rs`): one top-level enum plus a couple of
//! collaborator-specific enums, each with `thiserror` messages and, where it
//! helps an operator, recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FileId;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("failed to read '{path}': {source}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("failed to write '{path}': {source}")]
    FileWrite { path: PathBuf, source: std::io::Error },

    #[error("failed to parse C source '{path}': {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("failed to persist graph to '{path}': {source}")]
    PersistenceError { path: PathBuf, source: Box<dyn std::error::Error + Send + Sync> },

    #[error("failed to load graph from '{path}': {source}")]
    LoadError { path: PathBuf, source: Box<dyn std::error::Error + Send + Sync> },

    #[error("snapshot at '{path}' is corrupted: {reason}")]
    SnapshotCorrupted { path: PathBuf, reason: String },

    #[error("file id {id:?} not found in snapshot; it may have been removed since the last run")]
    FileNotFound { id: FileId },

    #[error("invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("{0}")]
    General(String),
}

impl GraphError {
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::SnapshotCorrupted { .. } => vec![
                "Run 'ckg extract --force' to rebuild the snapshot from scratch",
                "Check for disk errors or an interrupted previous run",
            ],
            Self::LoadError { .. } | Self::PersistenceError { .. } => vec![
                "Run 'ckg extract --force' if the problem persists",
            ],
            Self::FileRead { .. } => vec![
                "Check that the file exists and is readable",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'ckg init --force' to regenerate the default configuration",
            ],
            _ => vec![],
        }
    }
}

/// Preprocessor subprocess failures, per spec.md §7 ("warn and skip").
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("no compile command found for '{path}'")]
    NoCompileCommand { path: PathBuf },

    #[error("preprocessor exited with status {status} for '{path}': {stderr}")]
    SubprocessFailed { path: PathBuf, status: i32, stderr: String },

    #[error("failed to launch preprocessor for '{path}': {source}")]
    SpawnFailed { path: PathBuf, source: std::io::Error },

    #[error("macro anchor not found for expansion at {path}:{line}")]
    AnchorNotFound { path: PathBuf, line: u32 },
}

/// VCS collaborator failures.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("'{path}' is not inside a git working tree")]
    NotARepository { path: PathBuf },

    #[error("git query failed: {0}")]
    Git(#[from] git2::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
pub type PreprocessResult<T> = Result<T, PreprocessError>;
pub type VcsResult<T> = Result<T, VcsError>;

/// Adds file-path/message context to an arbitrary error, the way the
/// teacher's `ErrorContext` trait does in its `error.rs`.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T, GraphError>;
    fn with_path(self, path: &std::path::Path) -> Result<T, GraphError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, GraphError> {
        self.map_err(|e| GraphError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, GraphError> {
        self.map_err(|e| GraphError::General(format!("error processing '{}': {e}", path.display())))
    }
}
