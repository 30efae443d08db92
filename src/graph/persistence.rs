//! Persists a `GraphSnapshot` and the two human-readable outputs named in
//! spec.md §6 (`entity.json`, `relation.json`), all written atomically
//! (write to a `.tmp` path, then rename) the way the teacher's
//! `IndexPersistence` (`src/storage/persistence.rs`) does, so a killed run
//! never leaves a corrupted snapshot.

use std::fs;
use std::path::PathBuf;

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphSnapshot;

pub struct GraphPersistence {
    output_dir: PathBuf,
}

impl GraphPersistence {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.output_dir.join("index.snapshot.json")
    }

    fn entity_path(&self) -> PathBuf {
        self.output_dir.join("entity.json")
    }

    fn relation_path(&self) -> PathBuf {
        self.output_dir.join("relation.json")
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }

    #[must_use = "persistence errors should be handled"]
    pub fn save(&self, snapshot: &GraphSnapshot) -> GraphResult<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| GraphError::FileWrite {
            path: self.output_dir.clone(),
            source: e,
        })?;

        write_atomic(&self.snapshot_path(), &serde_json::to_vec_pretty(snapshot).map_err(|e| {
            GraphError::PersistenceError { path: self.snapshot_path(), source: Box::new(e) }
        })?)?;

        write_atomic(&self.entity_path(), &serde_json::to_vec_pretty(&snapshot.entities).map_err(|e| {
            GraphError::PersistenceError { path: self.entity_path(), source: Box::new(e) }
        })?)?;

        write_atomic(&self.relation_path(), &serde_json::to_vec_pretty(&snapshot.relations).map_err(|e| {
            GraphError::PersistenceError { path: self.relation_path(), source: Box::new(e) }
        })?)?;

        Ok(())
    }

    #[must_use = "load errors should be handled"]
    pub fn load(&self) -> GraphResult<GraphSnapshot> {
        let data = fs::read(self.snapshot_path()).map_err(|e| GraphError::FileRead {
            path: self.snapshot_path(),
            source: e,
        })?;
        serde_json::from_slice(&data).map_err(|e| GraphError::SnapshotCorrupted {
            path: self.snapshot_path(),
            reason: e.to_string(),
        })
    }

    pub fn clear(&self) -> std::io::Result<()> {
        if self.exists() {
            fs::remove_file(self.snapshot_path())?;
        }
        Ok(())
    }
}

fn write_atomic(path: &PathBuf, data: &[u8]) -> GraphResult<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data).map_err(|e| GraphError::FileWrite { path: temp_path.clone(), source: e })?;
    fs::rename(&temp_path, path).map_err(|e| GraphError::FileWrite { path: path.clone(), source: e })?;
    Ok(())
}
