//! Git-backed VCS collaborator (spec.md §6): answers "is this tracked" and
//! "what changed since the last snapshot". Grounded in `git2` usage from the
//! `sibyllinesoft-valknut` and `aptos-labs-aptos-core` manifests in the
//! example pack; the teacher repo does not touch VCS state itself.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use git2::{Repository, StatusOptions};

use crate::error::{VcsError, VcsResult};

/// A set of paths added/modified and a set removed since a prior commit.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    pub changed: HashSet<PathBuf>,
    pub removed: HashSet<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Open `root` as a git repository, initializing a bare-bones one (no
/// commit) when it isn't tracked yet — the caller then treats every file as
/// changed, i.e. runs a full extraction, per spec.md §6.
pub fn ensure_repo(root: &Path) -> VcsResult<Repository> {
    match Repository::discover(root) {
        Ok(repo) => Ok(repo),
        Err(_) => Repository::init(root).map_err(VcsError::from),
    }
}

pub fn is_tracked_repo(root: &Path) -> bool {
    Repository::discover(root).is_ok()
}

/// Changes since `since_oid` (a commit recorded alongside the last
/// snapshot). When `since_oid` is `None`, every tracked file not in
/// `.gitignore` is reported as changed.
pub fn changes_since(repo: &Repository, since_oid: Option<&str>) -> VcsResult<ChangeSet> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| VcsError::NotARepository { path: PathBuf::new() })?
        .to_path_buf();

    let mut changes = ChangeSet::default();

    if let Some(oid_str) = since_oid {
        if let Ok(oid) = git2::Oid::from_str(oid_str) {
            if let Ok(old_commit) = repo.find_commit(oid) {
                let old_tree = old_commit.tree().ok();
                let head = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
                let new_tree = head.as_ref().and_then(|c| c.tree().ok());

                let diff = repo
                    .diff_tree_to_tree(old_tree.as_ref(), new_tree.as_ref(), None)
                    .map_err(VcsError::from)?;

                diff.foreach(
                    &mut |delta, _| {
                        use git2::Delta::*;
                        let new_path = delta.new_file().path().map(|p| workdir.join(p));
                        let old_path = delta.old_file().path().map(|p| workdir.join(p));
                        match delta.status() {
                            Deleted => {
                                if let Some(p) = old_path {
                                    changes.removed.insert(p);
                                }
                            }
                            Added | Modified | Renamed | Copied | Typechange => {
                                if let Some(p) = new_path {
                                    changes.changed.insert(p);
                                }
                            }
                            _ => {}
                        }
                        true
                    },
                    None,
                    None,
                    None,
                )
                .map_err(VcsError::from)?;

                // also report the working tree's uncommitted deltas against HEAD
                merge_worktree_status(repo, &workdir, &mut changes)?;
                return Ok(changes);
            }
        }
    }

    // No prior snapshot commit: report everything tracked (and any untracked,
    // non-ignored files) as changed.
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut opts)).map_err(VcsError::from)?;
    for entry in statuses.iter() {
        if let Some(path) = entry.path() {
            changes.changed.insert(workdir.join(path));
        }
    }
    walk_tracked_files(repo, &workdir, &mut changes)?;
    Ok(changes)
}

fn walk_tracked_files(repo: &Repository, workdir: &Path, changes: &mut ChangeSet) -> VcsResult<()> {
    let head = match repo.head().ok().and_then(|h| h.peel_to_tree().ok()) {
        Some(tree) => tree,
        None => return Ok(()),
    };
    head.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(git2::ObjectType::Blob) {
            if let Some(name) = entry.name() {
                changes.changed.insert(workdir.join(dir).join(name));
            }
        }
        git2::TreeWalkResult::Ok
    })
    .map_err(VcsError::from)?;
    Ok(())
}

fn merge_worktree_status(repo: &Repository, workdir: &Path, changes: &mut ChangeSet) -> VcsResult<()> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut opts)).map_err(VcsError::from)?;
    for entry in statuses.iter() {
        let status = entry.status();
        let Some(path) = entry.path() else { continue };
        let full = workdir.join(path);
        if status.contains(git2::Status::WT_DELETED) || status.contains(git2::Status::INDEX_DELETED) {
            changes.removed.insert(full);
        } else if !status.is_empty() {
            changes.changed.insert(full);
        }
    }
    Ok(())
}

pub fn head_oid(repo: &Repository) -> Option<String> {
    repo.head().ok()?.peel_to_commit().ok().map(|c| c.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn untracked_directory_reports_as_untracked() {
        let dir = TempDir::new().unwrap();
        assert!(!is_tracked_repo(dir.path()));
    }

    #[test]
    fn ensure_repo_initializes_when_missing() {
        let dir = TempDir::new().unwrap();
        let repo = ensure_repo(dir.path()).unwrap();
        assert!(repo.workdir().is_some());
        assert!(is_tracked_repo(dir.path()));
    }
}
