//! Incremental update engine (spec.md §4.7): partitions a VCS change set
//! against a prior snapshot's known files, cascades deletes, and resumes
//! the id counter so ids already handed to downstream consumers never
//! change across re-runs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::entity::{Entity, Scope};
use crate::graph::GraphBuilder;
use crate::types::{EntityId, FileId, IdCounter};
use crate::vcs::ChangeSet;

#[derive(Debug, Default)]
pub struct IncrementalPlan {
    pub added: Vec<PathBuf>,
    pub modified: Vec<(FileId, PathBuf)>,
    pub removed: Vec<FileId>,
    pub unchanged: Vec<FileId>,
}

/// `known_files` maps a previously extracted file's canonical path to its
/// `FileId`. Every path in `changeset.changed` not in `known_files` is new;
/// every known path in `changeset.changed` is modified; every known path in
/// `changeset.removed` (or simply missing from disk) is removed; everything
/// else carries over unchanged.
pub fn partition(changeset: &ChangeSet, known_files: &HashMap<PathBuf, FileId>) -> IncrementalPlan {
    let mut plan = IncrementalPlan::default();
    let mut touched = std::collections::HashSet::new();

    for path in &changeset.changed {
        touched.insert(path.clone());
        match known_files.get(path) {
            Some(&id) => plan.modified.push((id, path.clone())),
            None => plan.added.push(path.clone()),
        }
    }

    for path in &changeset.removed {
        touched.insert(path.clone());
        if let Some(&id) = known_files.get(path) {
            plan.removed.push(id);
        }
    }

    for (path, &id) in known_files {
        if !touched.contains(path) {
            plan.unchanged.push(id);
        }
    }

    plan
}

/// Applies the delete half of the plan to `builder`: cascade-deletes every
/// entity and relation belonging to a removed file, and also every entity
/// and relation belonging to a *modified* file, since the caller is about
/// to re-extract and merge that file's entities back in fresh. Without
/// this, a modified file's stale entities would linger forever and every
/// incremental run would duplicate them (spec.md §4.7 step 4).
pub fn apply_removals(builder: &mut GraphBuilder, plan: &IncrementalPlan) {
    let mut files: std::collections::HashSet<FileId> = plan.removed.iter().copied().collect();
    files.extend(plan.modified.iter().map(|(id, _)| *id));
    if files.is_empty() {
        return;
    }
    builder.remove_files(&files);
}

/// Finds every file, *outside* `touched_files`, that holds a relation edge
/// into or out of an entity belonging to `touched_files`. Must be called
/// before `apply_removals`, while those relations still exist.
///
/// An incremental run only re-walks the added/modified files in the plan.
/// If an unmodified file's entity has, say, a `CALLS` edge into a function
/// that lives in a modified file, `apply_removals`'s cascade delete (it
/// drops every relation touching either endpoint) throws that edge away
/// too — and since the unmodified file is never re-walked, the edge never
/// comes back. The caller folds this set into the files it re-walks so
/// those relations get re-extracted against the post-reconciliation ids,
/// keeping a no-op incremental re-run idempotent (spec.md §4.7 step 4, §8).
pub fn files_with_edges_into(builder: &GraphBuilder, touched_files: &std::collections::HashSet<FileId>) -> std::collections::HashSet<FileId> {
    let entity_file: HashMap<EntityId, FileId> = builder.entities().iter().filter_map(|e| e.file().map(|f| (e.id(), f))).collect();

    let mut referencing = std::collections::HashSet::new();
    for relation in builder.relations() {
        let head_file = entity_file.get(&relation.head).copied();
        let tail_file = entity_file.get(&relation.tail).copied();

        let head_touched = head_file.map(|f| touched_files.contains(&f)).unwrap_or(false);
        let tail_touched = tail_file.map(|f| touched_files.contains(&f)).unwrap_or(false);

        if tail_touched {
            if let Some(hf) = head_file {
                if !touched_files.contains(&hf) {
                    referencing.insert(hf);
                }
            }
        }
        if head_touched {
            if let Some(tf) = tail_file {
                if !touched_files.contains(&tf) {
                    referencing.insert(tf);
                }
            }
        }
    }
    referencing
}

/// Captures a modified file's entities *before* `apply_removals` deletes
/// them, keyed by `FileId`, so `reconcile_entities` can match re-extracted
/// entities against them afterwards.
pub fn snapshot_modified_entities(builder: &GraphBuilder, plan: &IncrementalPlan) -> HashMap<FileId, Vec<Entity>> {
    plan.modified
        .iter()
        .map(|(id, _)| (*id, builder.entities().iter().filter(|e| e.file() == Some(*id)).cloned().collect()))
        .collect()
}

/// Reconciles a single file's freshly extracted entities against that
/// file's previous entities (spec.md §4.7 step 4): a `FILE` entity keeps
/// its id (it's the same file); any other entity whose `(kind, name,
/// scope)` signature matches a previous entity inherits that entity's id,
/// so relations and ids already handed to downstream consumers survive the
/// file being re-extracted. Entities with no match get a fresh id from
/// `counter`; unmatched previous entities were already cascade-deleted by
/// `apply_removals` and simply don't reappear.
pub fn reconcile_entities(new_entities: Vec<Entity>, old_entities: Option<&[Entity]>, counter: &mut IdCounter) -> Vec<Entity> {
    let old_entities: &[Entity] = match old_entities {
        Some(old) if !old.is_empty() => old,
        _ => &[],
    };

    let old_file_id: HashMap<FileId, EntityId> = old_entities
        .iter()
        .filter_map(|e| match e {
            Entity::File(f) => Some((f.file_id, f.id)),
            _ => None,
        })
        .collect();

    let old_by_sig: HashMap<(&'static str, String, Scope), EntityId> =
        old_entities.iter().filter_map(|e| e.signature(old_entities).map(|sig| (sig, e.id()))).collect();

    let mut remap: HashMap<EntityId, EntityId> = HashMap::new();
    for e in &new_entities {
        let reused = match e {
            Entity::File(f) => old_file_id.get(&f.file_id).copied(),
            _ => e.signature(&new_entities).and_then(|sig| old_by_sig.get(&sig).copied()),
        };
        remap.insert(e.id(), reused.unwrap_or_else(|| counter.next_entity()));
    }

    new_entities
        .into_iter()
        .map(|e| {
            let new_id = remap[&e.id()];
            e.reassign(new_id, &remap)
        })
        .collect()
}
