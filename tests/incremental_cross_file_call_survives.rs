//! An unmodified file's `CALLS` edge into a function defined in a file that
//! *does* change must survive an incremental run: the callee's id is
//! reconciled, not replaced, and the caller (never re-walked by the VCS
//! diff alone) still needs its edge regenerated against that id.

use std::fs;
use std::path::Path;

use git2::{Repository, Signature};

use ckg::config::Settings;
use ckg::entity::Entity;
use ckg::graph::GraphPersistence;
use ckg::pipeline;
use ckg::relation::RelationKind;

fn commit_tree(repo: &Repository, index: &mut git2::Index, message: &str) -> git2::Oid {
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
}

#[test]
fn unmodified_caller_edge_into_modified_callee_is_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let repo = Repository::init(root).unwrap();
    fs::write(root.join("b.h"), "void b_fn(void);\n").unwrap();
    fs::write(root.join("b.c"), "#include \"b.h\"\n\nvoid b_fn(void) {\n    int x = 1;\n}\n").unwrap();
    fs::write(
        root.join("a.c"),
        "#include \"b.h\"\n\nvoid a_fn(void) {\n    b_fn();\n}\n",
    )
    .unwrap();
    {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("b.h")).unwrap();
        index.add_path(Path::new("b.c")).unwrap();
        index.add_path(Path::new("a.c")).unwrap();
        commit_tree(&repo, &mut index, "initial");
    }

    let settings = Settings::default();
    let output = tempfile::tempdir().unwrap();
    let output_dir = output.path().to_path_buf();
    let report = pipeline::run_full(root, &settings).unwrap();
    let persistence = GraphPersistence::new(output_dir.clone());
    persistence.save(&report.snapshot).unwrap();

    let b_fn_id_before = report
        .snapshot
        .entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "b_fn" => Some(f.id),
            _ => None,
        })
        .expect("b_fn function entity");
    let a_fn_id_before = report
        .snapshot
        .entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "a_fn" => Some(f.id),
            _ => None,
        })
        .expect("a_fn function entity");
    assert!(report
        .snapshot
        .relations
        .iter()
        .any(|r| r.kind == RelationKind::Calls && r.head == a_fn_id_before && r.tail == b_fn_id_before));

    // Only b.c changes; a.c is untouched on disk and won't appear in the VCS diff.
    fs::write(root.join("b.c"), "#include \"b.h\"\n\nvoid b_fn(void) {\n    int x = 2;\n}\n").unwrap();
    {
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("b.c")).unwrap();
        commit_tree(&repo, &mut index, "modify b.c");
    }

    let report2 = pipeline::run_incremental(root, &settings, &output_dir, false).unwrap();

    let b_fn_id_after = report2
        .snapshot
        .entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "b_fn" => Some(f.id),
            _ => None,
        })
        .expect("b_fn function entity survives the re-extraction");
    assert_eq!(b_fn_id_after, b_fn_id_before, "reconciliation should keep b_fn's id stable");

    let a_fn_id_after = report2
        .snapshot
        .entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "a_fn" => Some(f.id),
            _ => None,
        })
        .expect("a_fn function entity");

    let still_calls = report2
        .snapshot
        .relations
        .iter()
        .any(|r| r.kind == RelationKind::Calls && r.head == a_fn_id_after && r.tail == b_fn_id_after);
    assert!(still_calls, "a_fn's call into b_fn must survive b.c being re-extracted, even though a.c itself wasn't touched");
}
