//! Graph store & dedup (spec.md §4.6): accumulates entities and relations
//! in insertion order, applying the composite-key dedup rule so a relation
//! is recorded at most once per `(head, tail, kind, context_var_id)`.

mod persistence;

pub use persistence::GraphPersistence;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::relation::Relation;
use crate::types::{EntityId, FileId, IdCounter};

/// The plain, serializable snapshot of the whole graph — modeled on the
/// teacher's `IndexData` (`src/storage/index_data.rs`): a few vectors and
/// counters rather than a database, so persistence stays a single
/// serialize/deserialize call.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    pub file_paths: Vec<(FileId, String)>,
    pub entity_counter: u32,
    /// Commit OID the snapshot was taken at, used by the incremental engine
    /// to ask the VCS collaborator "what changed since then".
    pub vcs_commit: Option<String>,
}

pub struct GraphBuilder {
    entities: Vec<Entity>,
    relations: Vec<Relation>,
    seen_relations: HashSet<(EntityId, EntityId, crate::relation::RelationKind, Option<EntityId>)>,
    pub counter: IdCounter,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self { entities: Vec::new(), relations: Vec::new(), seen_relations: HashSet::new(), counter: IdCounter::default() }
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut seen = HashSet::new();
        for relation in &snapshot.relations {
            seen.insert(relation.dedup_key());
        }
        Self {
            entities: snapshot.entities,
            relations: snapshot.relations,
            seen_relations: seen,
            counter: IdCounter::resume_after(snapshot.entity_counter),
        }
    }

    pub fn add_entities(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.entities.extend(entities);
    }

    /// Inserts `relation` unless an entry with the same dedup key was
    /// already recorded; first occurrence wins, per spec.md §4.6.
    pub fn add_relation(&mut self, relation: Relation) {
        if self.seen_relations.insert(relation.dedup_key()) {
            self.relations.push(relation);
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Removes every entity and relation touching `files` — the cascade
    /// delete step of spec.md §4.7's incremental update engine.
    pub fn remove_files(&mut self, files: &HashSet<FileId>) {
        let removed_ids: HashSet<EntityId> = self
            .entities
            .iter()
            .filter(|e| e.file().map(|f| files.contains(&f)).unwrap_or(false))
            .map(|e| e.id())
            .collect();

        self.entities.retain(|e| !e.file().map(|f| files.contains(&f)).unwrap_or(false));
        self.relations.retain(|r| !removed_ids.contains(&r.head) && !removed_ids.contains(&r.tail));
        self.seen_relations.retain(|(head, tail, _, _)| !removed_ids.contains(head) && !removed_ids.contains(tail));
    }

    pub fn into_snapshot(self, file_paths: Vec<(FileId, String)>, vcs_commit: Option<String>) -> GraphSnapshot {
        GraphSnapshot {
            entities: self.entities,
            relations: self.relations,
            file_paths,
            entity_counter: self.counter.peek_next().saturating_sub(1),
            vcs_commit,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FunctionEntity;
    use crate::relation::RelationKind;
    use crate::types::Span;

    fn func(id: u32, file: u32) -> Entity {
        Entity::Function(FunctionEntity {
            id: EntityId::new(id).unwrap(),
            file: FileId::new(file).unwrap(),
            name: "f".into(),
            return_type: "void".into(),
            span: Span::new(1, 0, 1, 1),
            is_static: false,
        })
    }

    #[test]
    fn duplicate_relation_inserted_once() {
        let mut builder = GraphBuilder::new();
        let a = EntityId::new(1).unwrap();
        let b = EntityId::new(2).unwrap();
        builder.add_relation(Relation::new(a, b, RelationKind::Calls));
        builder.add_relation(Relation::new(a, b, RelationKind::Calls));
        assert_eq!(builder.relations().len(), 1);
    }

    #[test]
    fn distinct_context_var_creates_distinct_relation() {
        let mut builder = GraphBuilder::new();
        let a = EntityId::new(1).unwrap();
        let b = EntityId::new(2).unwrap();
        let ctx1 = EntityId::new(3).unwrap();
        let ctx2 = EntityId::new(4).unwrap();
        builder.add_relation(Relation::with_context(a, b, RelationKind::Calls, ctx1));
        builder.add_relation(Relation::with_context(a, b, RelationKind::Calls, ctx2));
        assert_eq!(builder.relations().len(), 2);
    }

    #[test]
    fn remove_files_cascades_to_relations() {
        let mut builder = GraphBuilder::new();
        builder.add_entities([func(1, 1), func(2, 2)]);
        builder.add_relation(Relation::new(EntityId::new(1).unwrap(), EntityId::new(2).unwrap(), RelationKind::Calls));

        let mut files = HashSet::new();
        files.insert(FileId::new(1).unwrap());
        builder.remove_files(&files);

        assert_eq!(builder.entities().len(), 1);
        assert!(builder.relations().is_empty());
    }
}
