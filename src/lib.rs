//! Code knowledge graph extraction for C source trees: parses each file
//! with `tree-sitter-c`, expands macro-wrapped call sites through the
//! system preprocessor, resolves names against a visibility closure built
//! from the include graph, and persists the resulting entity/relation graph.

pub mod ast;
pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod incremental;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod preprocess;
pub mod relate;
pub mod relation;
pub mod resolve;
pub mod types;
pub mod vcs;
pub mod visibility;
pub mod walker;

pub use config::Settings;
pub use entity::Entity;
pub use error::{GraphError, GraphResult};
pub use graph::{GraphBuilder, GraphPersistence, GraphSnapshot};
pub use relation::{Relation, RelationKind};
pub use types::{EntityId, FileId};
