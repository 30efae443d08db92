//! Orchestrates the phases in spec.md §2 into one run: discover files,
//! locate/expand macros, extract entities, build the visibility graph,
//! extract relations, resolve names, and persist the resulting graph.
//!
//! Scheduling follows spec.md §5's "single-threaded cooperative" model:
//! per-file extraction runs across a `rayon` pool, and every merge into the
//! shared `GraphBuilder` happens back on the orchestrating thread.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ast;
use crate::config::Settings;
use crate::entity::Entity;
use crate::error::{ErrorContext, GraphError, GraphResult};
use crate::graph::{GraphBuilder, GraphPersistence, GraphSnapshot};
use crate::incremental::{self, IncrementalPlan};
use crate::preprocess::{self, CompileCommand, MacroTable};
use crate::relate::{self, FunctionSites};
use crate::resolve::Indices;
use crate::types::{EntityId, FileId, IdCounter};
use crate::vcs::{self, ChangeSet};
use crate::visibility::{self, IncludeGraph, VisibilityEngine};
use crate::walker::FileWalker;

pub struct RunReport {
    pub snapshot: GraphSnapshot,
    pub files_processed: usize,
    pub files_removed: usize,
}

/// Runs a full extraction over every `.c`/`.h` file under `root`.
pub fn run_full(root: &Path, settings: &Settings) -> GraphResult<RunReport> {
    let walker = FileWalker::new(&settings.extraction);
    let paths = walker.walk(root);

    let mut file_ids = HashMap::new();
    let mut file_counter: u32 = 0;
    for path in &paths {
        file_counter += 1;
        file_ids.insert(crate::paths::normalize(path), FileId::new(file_counter).unwrap());
    }

    let builder = GraphBuilder::new();
    run_over_files(root, settings, builder, &paths, &file_ids, &HashMap::new())
}

/// Runs an incremental update against a previously persisted snapshot,
/// falling back to a full extraction when `force` is set or no snapshot
/// exists yet.
pub fn run_incremental(root: &Path, settings: &Settings, output_dir: &Path, force: bool) -> GraphResult<RunReport> {
    let persistence = GraphPersistence::new(output_dir.to_path_buf());
    if force || !persistence.exists() {
        let report = run_full(root, settings)?;
        return Ok(report);
    }

    let snapshot = persistence.load()?;
    let known_files: HashMap<PathBuf, FileId> = snapshot
        .file_paths
        .iter()
        .map(|(id, path)| (PathBuf::from(path), *id))
        .collect();

    let repo = vcs::ensure_repo(root).map_err(GraphError::from)?;
    let changes = vcs::changes_since(&repo, snapshot.vcs_commit.as_deref()).map_err(GraphError::from)?;
    let mut plan = incremental::partition(&changes, &known_files);

    if plan.added.is_empty() && plan.modified.is_empty() && plan.removed.is_empty() {
        tracing::info!(target: "incremental", "no changes since last snapshot");
        return Ok(RunReport { files_processed: 0, files_removed: 0, snapshot });
    }

    let mut builder = GraphBuilder::from_snapshot(snapshot);

    let mut touched_files: HashSet<FileId> = plan.removed.iter().copied().collect();
    touched_files.extend(plan.modified.iter().map(|(id, _)| *id));

    // Any unmodified file with an edge into a touched entity must be
    // re-walked too, or `apply_removals`'s cascade delete loses that edge
    // for good (spec.md §4.7 step 4). Fold it into `modified` so its
    // entities get reconciled against their old ids rather than duplicated.
    let known_paths_by_id: HashMap<FileId, PathBuf> = known_files.iter().map(|(path, id)| (*id, path.clone())).collect();
    for file_id in incremental::files_with_edges_into(&builder, &touched_files) {
        if touched_files.contains(&file_id) {
            continue;
        }
        if let Some(path) = known_paths_by_id.get(&file_id) {
            plan.modified.push((file_id, path.clone()));
            touched_files.insert(file_id);
        }
    }

    let old_entities_by_file = incremental::snapshot_modified_entities(&builder, &plan);
    incremental::apply_removals(&mut builder, &plan);

    let mut file_ids = known_files.clone();
    let mut next_id = file_ids.values().map(|f| f.value()).max().unwrap_or(0);
    let mut touched_paths = Vec::new();
    for path in plan.added.iter() {
        next_id += 1;
        file_ids.insert(path.clone(), FileId::new(next_id).unwrap());
        touched_paths.push(path.clone());
    }
    for (id, path) in plan.modified.iter() {
        file_ids.insert(path.clone(), *id);
        touched_paths.push(path.clone());
    }

    let mut report = run_over_files(root, settings, builder, &touched_paths, &file_ids, &old_entities_by_file)?;
    report.files_removed = plan.removed.len();
    Ok(report)
}

fn run_over_files(
    root: &Path,
    settings: &Settings,
    mut builder: GraphBuilder,
    touched_paths: &[PathBuf],
    file_ids: &HashMap<PathBuf, FileId>,
    old_entities_by_file: &HashMap<FileId, Vec<Entity>>,
) -> GraphResult<RunReport> {
    let compile_commands = load_compile_commands_if_present(root);
    let project_roots = visibility::detect_project_roots(root, &settings.extraction.project_root_markers);

    struct FileWork {
        path: PathBuf,
        file_id: FileId,
        source: String,
        entities: Vec<Entity>,
        includes: Vec<PathBuf>,
        sites: FunctionSites,
        macros: Vec<crate::preprocess::MacroEntry>,
    }

    let work: Vec<FileWork> = touched_paths
        .par_iter()
        .filter_map(|path| {
            let canonical = crate::paths::normalize(path);
            let file_id = *file_ids.get(&PathBuf::from(&canonical))?;
            let source = std::fs::read_to_string(path).ok()?;

            let mut local_counter = IdCounter::default();
            let extraction = ast::extract_file(file_id, &canonical, &source, &mut local_counter).ok()?;

            let includes = visibility::resolve_includes(&source, path.parent().unwrap_or(Path::new(".")), &project_roots);
            let sites = relate::collect_file_sites(file_id, &source);

            let command = compile_commands.get(&canonical.clone().into());
            let macros = preprocess::process_file(path, file_id, &source, command, &settings.preprocessor)
                .unwrap_or_default();

            Some(FileWork { path: path.clone(), file_id, source, entities: extraction.entities, includes, sites, macros })
        })
        .collect();

    let mut include_graph = IncludeGraph::new();
    let mut macro_table = MacroTable::default();
    let mut all_sites: Vec<(FileId, FunctionSites)> = Vec::new();
    let mut siblings: HashMap<FileId, FileId> = HashMap::new();

    for item in work {
        // Re-number entities from this file's local counter space into the
        // shared builder counter, reusing prior ids where this file was
        // modified rather than added (spec.md §4.7 step 4).
        let old_entities = old_entities_by_file.get(&item.file_id).map(|v| v.as_slice());
        let reconciled = incremental::reconcile_entities(item.entities, old_entities, &mut builder.counter);
        builder.add_entities(reconciled);

        for include_target in &item.includes {
            if let Some(&to) = file_ids.get(&PathBuf::from(crate::paths::normalize(include_target))) {
                include_graph.add_include(item.file_id, to);
            }
        }
        for candidate in visibility::sibling_candidates(&item.path) {
            if let Some(&to) = file_ids.get(&PathBuf::from(crate::paths::normalize(&candidate))) {
                siblings.insert(item.file_id, to);
                siblings.insert(to, item.file_id);
                break;
            }
        }

        macro_table.insert(item.file_id, item.macros);
        all_sites.push((item.file_id, item.sites));
        let _ = item.source;
    }

    let entities = builder.entities().to_vec();
    let indices = Indices::build(&entities);

    let mut visibility_engine = VisibilityEngine::new(&include_graph, &siblings);
    let visibility: HashMap<FileId, crate::resolve::VisibleFiles> =
        file_ids.values().map(|&file_id| (file_id, visibility_engine.visible_from(file_id))).collect();
    let empty_visible = crate::resolve::VisibleFiles::new();

    let functions: HashSet<EntityId> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::Function(f) => Some(f.id),
            _ => None,
        })
        .collect();

    let function_ids_by_name: HashMap<String, EntityId> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::Function(f) => Some((f.name.clone(), f.id)),
            _ => None,
        })
        .collect();

    let file_entity_ids: HashMap<FileId, EntityId> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::File(f) => Some((f.file_id, f.id)),
            _ => None,
        })
        .collect();

    for relation in relate::contains::extract(&entities) {
        builder.add_relation(relation);
    }
    for relation in relate::has_member::extract(&entities) {
        builder.add_relation(relation);
    }
    for relation in relate::has_parameter_variable::extract(&entities) {
        builder.add_relation(relation);
    }
    for relation in relate::type_of::extract(&entities, &indices, &visibility) {
        builder.add_relation(relation);
    }
    for relation in relate::includes::extract(&include_graph, &file_entity_ids) {
        builder.add_relation(relation);
    }

    let mut assigned_relations = Vec::new();
    for (file_id, sites) in &all_sites {
        let visible = visibility.get(file_id).unwrap_or(&empty_visible);
        assigned_relations.extend(relate::assigned_to::extract(*file_id, &sites.assignments, &indices, visible));
    }
    let assigned_functions = relate::assigned_to::assigned_functions(&assigned_relations, &functions);
    for relation in assigned_relations {
        builder.add_relation(relation);
    }

    for (file_id, sites) in &all_sites {
        let visible = visibility.get(file_id).unwrap_or(&empty_visible);
        for relation in relate::calls::extract(
            *file_id,
            &sites.calls,
            &indices,
            visible,
            &macro_table,
            &function_ids_by_name,
            &functions,
            &assigned_functions,
        ) {
            builder.add_relation(relation);
        }
        for relation in relate::returns::extract(*file_id, &sites.returns, &indices, &function_ids_by_name, visible) {
            builder.add_relation(relation);
        }
    }

    let files_processed = touched_paths.len();

    let file_paths: Vec<(FileId, String)> = file_ids.iter().map(|(p, id)| (*id, p.to_string_lossy().into_owned())).collect();
    let vcs_commit = vcs::ensure_repo(root).ok().and_then(|repo| vcs::head_oid(&repo));
    let snapshot = builder.into_snapshot(file_paths, vcs_commit);

    Ok(RunReport { snapshot, files_processed, files_removed: 0 })
}

fn load_compile_commands_if_present(root: &Path) -> HashMap<PathBuf, CompileCommand> {
    let path = root.join("compile_commands.json");
    if !path.exists() {
        return HashMap::new();
    }
    preprocess::load_compile_commands(&path).unwrap_or_else(|e| {
        tracing::warn!(target: "preprocess", error = %e, "failed to load compile_commands.json");
        HashMap::new()
    })
}

pub fn ensure_output_written(output_dir: &Path, snapshot: &GraphSnapshot) -> GraphResult<()> {
    let persistence = GraphPersistence::new(output_dir.to_path_buf());
    persistence.save(snapshot).with_path(output_dir)
}
