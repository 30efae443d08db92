//! Locates macro invocation sites in the *original* (un-preprocessed)
//! source, per spec.md §4.1 step 1-2. The tree-sitter C grammar has no
//! notion of a macro call — it sees either a `call_expression` or a bare
//! `identifier` — so this walker first collects every name introduced by a
//! `#define` in the file, then finds every syntactic use of one of those
//! names as a call-like or bare-identifier expression.

use tree_sitter::{Node, Parser};

use crate::types::Span;

#[derive(Debug, Clone)]
pub struct MacroSite {
    pub name: String,
    pub span: Span,
    pub is_function_like: bool,
}

fn node_span(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row as u32 + 1, start.column as u32, end.row as u32 + 1, end.column as u32)
}

pub fn locate_macro_sites(source: &str) -> Vec<MacroSite> {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_c::LANGUAGE.into()).is_err() {
        return Vec::new();
    }
    let Some(tree) = parser.parse(source, None) else {
        return Vec::new();
    };

    let bytes = source.as_bytes();
    let mut defined_object_like = std::collections::HashSet::new();
    let mut defined_function_like = std::collections::HashSet::new();
    collect_defines(tree.root_node(), bytes, &mut defined_object_like, &mut defined_function_like);

    if defined_object_like.is_empty() && defined_function_like.is_empty() {
        return Vec::new();
    }

    let mut sites = Vec::new();
    collect_uses(
        tree.root_node(),
        bytes,
        &defined_object_like,
        &defined_function_like,
        &mut sites,
    );
    sites
}

fn collect_defines(
    node: Node,
    src: &[u8],
    object_like: &mut std::collections::HashSet<String>,
    function_like: &mut std::collections::HashSet<String>,
) {
    if node.kind() == "preproc_function_def" {
        if let Some(name) = node.child_by_field_name("name") {
            function_like.insert(text_of(name, src));
        }
    } else if node.kind() == "preproc_def" {
        if let Some(name) = node.child_by_field_name("name") {
            object_like.insert(text_of(name, src));
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_defines(child, src, object_like, function_like);
    }
}

fn collect_uses(
    node: Node,
    src: &[u8],
    object_like: &std::collections::HashSet<String>,
    function_like: &std::collections::HashSet<String>,
    sites: &mut Vec<MacroSite>,
) {
    // Skip back into the preprocessor directives themselves.
    if node.kind() == "preproc_function_def" || node.kind() == "preproc_def" {
        return;
    }

    if node.kind() == "call_expression" {
        if let Some(callee) = node.child_by_field_name("function") {
            let name = text_of(callee, src);
            if function_like.contains(&name) {
                sites.push(MacroSite { name, span: node_span(node), is_function_like: true });
                return;
            }
        }
    } else if node.kind() == "identifier" && object_like.contains(&text_of(node, src)) {
        sites.push(MacroSite { name: text_of(node, src), span: node_span(node), is_function_like: false });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_uses(child, src, object_like, function_like, sites);
    }
}

fn text_of(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}
