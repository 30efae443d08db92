//! Include graph and visibility engine (spec.md §4.3): resolves `#include`
//! directives into a directed graph, pairs header/impl siblings, and
//! computes a symmetric BFS closure so a symbol in `a.c` can resolve a
//! symbol defined in `a.h` and vice versa.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use tree_sitter::Parser;

use crate::types::FileId;

/// `G_inc`: a directed edge `a -> b` means `a` includes `b`.
pub struct IncludeGraph {
    graph: DiGraph<FileId, ()>,
    nodes: HashMap<FileId, NodeIndex>,
}

impl IncludeGraph {
    pub fn new() -> Self {
        Self { graph: DiGraph::new(), nodes: HashMap::new() }
    }

    fn node(&mut self, file: FileId) -> NodeIndex {
        *self.nodes.entry(file).or_insert_with(|| self.graph.add_node(file))
    }

    pub fn add_include(&mut self, from: FileId, to: FileId) {
        let a = self.node(from);
        let b = self.node(to);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = (FileId, FileId)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((self.graph[a], self.graph[b]))
        })
    }
}

impl Default for IncludeGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract `#include "..."` targets from `source`, resolved relative to
/// `file_dir` first, then to each directory in `project_roots` joined with
/// each `project_root_markers` entry, per spec.md §4.3. Angle-bracket
/// (`<...>`) includes are ignored — they name system headers outside the
/// project.
pub fn resolve_includes(
    source: &str,
    file_dir: &Path,
    project_roots: &[PathBuf],
) -> Vec<PathBuf> {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_c::LANGUAGE.into()).is_err() {
        return Vec::new();
    }
    let Some(tree) = parser.parse(source, None) else { return Vec::new() };

    let mut targets = Vec::new();
    collect_includes(tree.root_node(), source.as_bytes(), &mut targets);

    targets
        .into_iter()
        .filter_map(|target| resolve_one(&target, file_dir, project_roots))
        .collect()
}

fn collect_includes(node: tree_sitter::Node, src: &[u8], out: &mut Vec<String>) {
    if node.kind() == "preproc_include" {
        if let Some(path_node) = node.child_by_field_name("path") {
            if path_node.kind() == "string_literal" {
                let text = path_node.utf8_text(src).unwrap_or("");
                out.push(text.trim_matches('"').to_string());
            }
            // system_lib_string ("<...>") is intentionally ignored
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_includes(child, src, out);
    }
}

fn resolve_one(target: &str, file_dir: &Path, project_roots: &[PathBuf]) -> Option<PathBuf> {
    let local = file_dir.join(target);
    if local.is_file() {
        return Some(local);
    }
    for root in project_roots {
        let candidate = root.join(target);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Auto-detects candidate project roots: ancestors of `start` whose name, or
/// whose child directory name, matches one of `markers` (spec.md §4.3 /
/// §9's original-source-derived default `["include", "src", "lib"]`).
pub fn detect_project_roots(start: &Path, markers: &[String]) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for ancestor in start.ancestors() {
        for marker in markers {
            let candidate = ancestor.join(marker);
            if candidate.is_dir() && !roots.contains(&candidate) {
                roots.push(candidate);
            }
        }
    }
    roots
}

/// Header/impl sibling pairing: `foo.c`/`foo.cc`/`foo.cpp` and `foo.h` in the
/// same directory are treated as mutually visible even without an explicit
/// `#include` (spec.md §4.3). A header has one candidate per recognized
/// implementation extension; an implementation file has exactly one
/// candidate header. The caller checks which candidate actually exists in
/// the known file set.
pub fn sibling_candidates(path: &Path) -> Vec<PathBuf> {
    let (Some(stem), Some(ext)) = (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|e| e.to_str())) else {
        return Vec::new();
    };
    match ext {
        "h" => ["c", "cc", "cpp"].iter().map(|e| path.with_file_name(format!("{stem}.{e}"))).collect(),
        "c" | "cc" | "cpp" => vec![path.with_file_name(format!("{stem}.h"))],
        _ => Vec::new(),
    }
}

/// Convenience single-result form kept for the common `.c`/`.h` case.
pub fn sibling_of(path: &Path) -> Option<PathBuf> {
    sibling_candidates(path).into_iter().next()
}

/// Computes the symmetric closure of `G_ext` (the include graph plus
/// sibling edges) starting from `start`: every file reachable by following
/// edges in either direction, memoized per start node as spec.md §4.3
/// requires for the engine to stay usable on large trees.
pub struct VisibilityEngine<'a> {
    graph: &'a IncludeGraph,
    siblings: &'a HashMap<FileId, FileId>,
    cache: HashMap<FileId, HashSet<FileId>>,
}

impl<'a> VisibilityEngine<'a> {
    pub fn new(graph: &'a IncludeGraph, siblings: &'a HashMap<FileId, FileId>) -> Self {
        Self { graph, siblings, cache: HashMap::new() }
    }

    pub fn visible_from(&mut self, start: FileId) -> HashSet<FileId> {
        if let Some(cached) = self.cache.get(&start) {
            return cached.clone();
        }

        let forward = adjacency(self.graph, Direction::Forward);
        let reverse = adjacency(self.graph, Direction::Reverse);

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let mut neighbors: Vec<FileId> = Vec::new();
            if let Some(out) = forward.get(&current) {
                neighbors.extend(out);
            }
            if let Some(inc) = reverse.get(&current) {
                neighbors.extend(inc);
            }
            if let Some(sibling) = self.siblings.get(&current) {
                neighbors.push(*sibling);
            }
            for neighbor in neighbors {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        self.cache.insert(start, visited.clone());
        visited
    }
}

enum Direction {
    Forward,
    Reverse,
}

fn adjacency(graph: &IncludeGraph, direction: Direction) -> HashMap<FileId, Vec<FileId>> {
    let mut map: HashMap<FileId, Vec<FileId>> = HashMap::new();
    for (from, to) in graph.edges() {
        match direction {
            Direction::Forward => map.entry(from).or_default().push(to),
            Direction::Reverse => map.entry(to).or_default().push(from),
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn resolves_quoted_include_relative_to_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("util.h"), "").unwrap();
        let source = "#include \"util.h\"\n#include <stdio.h>\n";
        let resolved = resolve_includes(source, dir.path(), &[]);
        assert_eq!(resolved, vec![dir.path().join("util.h")]);
    }

    #[test]
    fn falls_back_to_project_root_search() {
        let dir = TempDir::new().unwrap();
        let include_dir = dir.path().join("include");
        fs::create_dir_all(&include_dir).unwrap();
        fs::write(include_dir.join("util.h"), "").unwrap();
        let src_dir = dir.path().join("src");
        fs::create_dir_all(&src_dir).unwrap();

        let source = "#include \"util.h\"\n";
        let resolved = resolve_includes(source, &src_dir, &[include_dir.clone()]);
        assert_eq!(resolved, vec![include_dir.join("util.h")]);
    }

    #[test]
    fn sibling_pairing_swaps_extension() {
        assert_eq!(sibling_of(Path::new("/a/b/foo.c")), Some(PathBuf::from("/a/b/foo.h")));
        assert_eq!(sibling_of(Path::new("/a/b/foo.h")), Some(PathBuf::from("/a/b/foo.c")));
    }

    #[test]
    fn visibility_closure_is_symmetric() {
        let a = FileId::new(1).unwrap();
        let b = FileId::new(2).unwrap();
        let c = FileId::new(3).unwrap();

        let mut graph = IncludeGraph::new();
        graph.add_include(a, b); // a includes b
        graph.add_include(c, b); // c also includes b

        let siblings = HashMap::new();
        let mut engine = VisibilityEngine::new(&graph, &siblings);

        // b did not include a or c, but the closure is symmetric, so from b
        // we still reach a and c.
        let visible = engine.visible_from(b);
        assert!(visible.contains(&a));
        assert!(visible.contains(&c));
    }

    #[test]
    fn detects_project_root_via_markers() {
        let dir = TempDir::new().unwrap();
        let include_dir = dir.path().join("include");
        fs::create_dir_all(&include_dir).unwrap();
        let nested = dir.path().join("src").join("nested");
        fs::create_dir_all(&nested).unwrap();

        let roots = detect_project_roots(&nested, &["include".to_string(), "src".to_string(), "lib".to_string()]);
        assert!(roots.contains(&include_dir));
    }
}
