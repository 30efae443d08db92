//! Relation extractors (spec.md §4.4): one file per relation family,
//! grounded 1:1 on `original_source/parser/extract_relation_*.py`.
//!
//! [`collect_function_sites`] does the one AST walk every behavioral
//! relation (`CALLS`/`ASSIGNED_TO`/`RETURNS`) needs, producing raw,
//! unresolved expression references; each submodule turns those references
//! into resolved `Relation`s using [`crate::resolve::Indices`] and the
//! [`crate::preprocess::MacroTable`].

pub mod assigned_to;
pub mod calls;
pub mod contains;
pub mod has_member;
pub mod has_parameter_variable;
pub mod includes;
pub mod returns;
pub mod type_of;

use tree_sitter::{Node, Parser};

use crate::types::{FileId, Span};

/// A reference to something either a bare name or a member-access field.
#[derive(Debug, Clone)]
pub enum RefExpr {
    Name(String),
    Field(String),
}

#[derive(Debug, Clone)]
pub struct CallSite {
    pub caller_function: String,
    pub callee: RefExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentSite {
    pub function: Option<String>,
    pub target: RefExpr,
    pub value: RefExpr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnSite {
    pub function: String,
    pub value: RefExpr,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct FunctionSites {
    pub calls: Vec<CallSite>,
    pub assignments: Vec<AssignmentSite>,
    pub returns: Vec<ReturnSite>,
}

pub fn collect_file_sites(_file: FileId, source: &str) -> FunctionSites {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_c::LANGUAGE.into()).is_err() {
        return FunctionSites::default();
    }
    let Some(tree) = parser.parse(source, None) else { return FunctionSites::default() };

    let mut sites = FunctionSites::default();
    walk(tree.root_node(), source.as_bytes(), None, &mut sites);
    sites
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row as u32 + 1, start.column as u32, end.row as u32 + 1, end.column as u32)
}

fn walk(node: Node, src: &[u8], current_function: Option<&str>, sites: &mut FunctionSites) {
    let mut next_function = current_function.map(|s| s.to_string());

    match node.kind() {
        "function_definition" => {
            if let Some(name) = function_name(node, src) {
                next_function = Some(name);
            }
        }
        "call_expression" => {
            if let (Some(caller), Some(callee)) = (current_function, node.child_by_field_name("function")) {
                if let Some(reference) = ref_of(callee, src) {
                    sites.calls.push(CallSite { caller_function: caller.to_string(), callee: reference, span: span_of(node) });
                }
            }
        }
        "assignment_expression" => {
            if let (Some(target), Some(value_node)) =
                (node.child_by_field_name("left").and_then(|n| ref_of(n, src)), node.child_by_field_name("right"))
            {
                if let Some(value) = ref_of(value_node, src) {
                    sites.assignments.push(AssignmentSite {
                        function: current_function.map(|s| s.to_string()),
                        target,
                        value,
                        span: span_of(node),
                    });
                }
            }
        }
        "init_declarator" => {
            if let (Some(target), Some(value_node)) = (
                node.child_by_field_name("declarator").and_then(|n| ref_of(n, src)),
                node.child_by_field_name("value"),
            ) {
                if let Some(value) = ref_of(value_node, src) {
                    sites.assignments.push(AssignmentSite {
                        function: current_function.map(|s| s.to_string()),
                        target,
                        value,
                        span: span_of(node),
                    });
                }
            }
        }
        "return_statement" => {
            if let Some(function) = current_function {
                if let Some(value_node) = node.child(1) {
                    if let Some(value) = ref_of(value_node, src) {
                        sites.returns.push(ReturnSite { function: function.to_string(), value, span: span_of(node) });
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, src, next_function.as_deref(), sites);
    }
}

fn function_name(node: Node, src: &[u8]) -> Option<String> {
    let declarator = node.child_by_field_name("declarator")?;
    identifier_text(declarator, src)
}

fn identifier_text(node: Node, src: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "field_identifier" => Some(node.utf8_text(src).ok()?.to_string()),
        "pointer_declarator" | "function_declarator" | "parenthesized_declarator" => {
            identifier_text(node.child_by_field_name("declarator")?, src)
        }
        _ => {
            let mut cursor = node.walk();
            node.children(&mut cursor).find_map(|c| identifier_text(c, src))
        }
    }
}

/// Only identifier and simple member-access expressions resolve to a
/// reference; literals, arithmetic, and nested calls yield `None` — exactly
/// the restriction spec.md §4.4 places on `RETURNS` and applies uniformly
/// to keep the three behavioral extractors consistent.
fn ref_of(node: Node, src: &[u8]) -> Option<RefExpr> {
    match node.kind() {
        "identifier" => Some(RefExpr::Name(node.utf8_text(src).ok()?.to_string())),
        "field_expression" => {
            let field = node.child_by_field_name("field")?;
            Some(RefExpr::Field(field.utf8_text(src).ok()?.to_string()))
        }
        "parenthesized_expression" => node.named_child(0).and_then(|n| ref_of(n, src)),
        "pointer_expression" => node.child_by_field_name("argument").and_then(|n| ref_of(n, src)),
        // tree-sitter-c folds `-x`, `!x`, `~x`, `+x` and `*x` all under
        // unary_expression; only `*` (dereference) is a reference, the rest
        // are arithmetic/logical and must yield None.
        "unary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            if operator.utf8_text(src).ok()? != "*" {
                return None;
            }
            node.child_by_field_name("argument").and_then(|n| ref_of(n, src))
        }
        _ => None,
    }
}
