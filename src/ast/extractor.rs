//! The recursive tree-sitter-c walk implementing spec.md §4.2.
//!
//! One walk per file: top-level struct/variable declarations feed global
//! scope, `function_definition` bodies are walked a second time (scoped to
//! that function's name) to pick up parameters and locals. Anonymous nested
//! struct/union fields are flattened onto the nearest named ancestor
//! struct, per spec.md §8 scenario 5.

use tree_sitter::{Node, Parser};

use crate::entity::{Entity, FieldEntity, FileEntity, FunctionEntity, StructEntity, VariableEntity};
use crate::error::{GraphError, GraphResult};
use crate::types::{EntityId, FileId, IdCounter, Span};

/// Recursion ceiling for the walker, mirroring the teacher's
/// `MAX_AST_DEPTH` guard (`src/parsing/parser.rs`) against pathological
/// nesting (deeply nested initializer lists are common in real C headers).
const MAX_AST_DEPTH: usize = 500;

pub struct ExtractionOutput {
    pub entities: Vec<Entity>,
}

struct Walker<'a> {
    file: FileId,
    src: &'a [u8],
    counter: &'a mut IdCounter,
    entities: Vec<Entity>,
    truncated: bool,
}

pub fn extract_file(
    file_id: FileId,
    path: &str,
    source: &str,
    counter: &mut IdCounter,
) -> GraphResult<ExtractionOutput> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_c::LANGUAGE.into())
        .map_err(|e| GraphError::ParseError { path: path.into(), reason: e.to_string() })?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| GraphError::ParseError { path: path.into(), reason: "tree-sitter returned no tree".into() })?;

    let mut entities = vec![Entity::File(FileEntity { id: counter.next_entity(), file_id, path: path.to_string() })];

    let mut walker = Walker { file: file_id, src: source.as_bytes(), counter, entities: Vec::new(), truncated: false };
    walker.walk_global(tree.root_node(), 0);
    if walker.truncated {
        tracing::warn!(target: "extract", path, "AST recursion depth exceeded; truncating walk");
    }
    entities.append(&mut walker.entities);

    Ok(ExtractionOutput { entities })
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row as u32 + 1, start.column as u32, end.row as u32 + 1, end.column as u32)
}

impl<'a> Walker<'a> {
    fn text(&self, node: Node) -> String {
        node.utf8_text(self.src).unwrap_or_default().to_string()
    }

    /// Walks global (file) scope: struct declarations, top-level variables,
    /// and function definitions (which hand off to `walk_function_body`).
    fn walk_global(&mut self, node: Node, depth: usize) {
        if depth > MAX_AST_DEPTH {
            self.truncated = true;
            return;
        }

        match node.kind() {
            "function_definition" => {
                self.extract_function(node);
                return; // don't descend further at global scope; body handled separately
            }
            "struct_specifier" | "union_specifier" => {
                self.extract_struct(node, None, None, depth);
                return;
            }
            "type_definition" => {
                self.extract_typedef(node, depth);
                return;
            }
            "declaration" => {
                self.extract_global_declaration(node);
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_global(child, depth + 1);
        }
    }

    fn extract_function(&mut self, node: Node) {
        let is_static = has_storage_class(node, self.src, "static");
        let return_type = node
            .child_by_field_name("type")
            .map(|n| self.text(n))
            .unwrap_or_default();

        let Some(declarator) = node.child_by_field_name("declarator") else { return };
        let Some(name_node) = innermost_declarator_identifier(declarator) else { return };
        let name = self.text(name_node);

        let id = self.counter.next_entity();
        self.entities.push(Entity::Function(FunctionEntity {
            id,
            file: self.file,
            name: name.clone(),
            return_type,
            span: span_of(node),
            is_static,
        }));

        if let Some(params) = find_parameter_list(declarator) {
            self.extract_parameters(params, &name);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.walk_function_body(body, &name, 0);
        }
    }

    fn extract_parameters(&mut self, params: Node, function_name: &str) {
        let mut cursor = params.walk();
        for param in params.children(&mut cursor) {
            if param.kind() != "parameter_declaration" {
                continue;
            }
            let type_text = param.child_by_field_name("type").map(|n| self.text(n)).unwrap_or_default();
            let Some(declarator) = param.child_by_field_name("declarator") else { continue };
            let Some(name_node) = innermost_declarator_identifier(declarator) else { continue };
            let id = self.counter.next_entity();
            self.entities.push(Entity::Variable(VariableEntity {
                id,
                file: self.file,
                name: self.text(name_node),
                type_text,
                scope: Some(function_name.to_string()),
                is_parameter: true,
                span: span_of(param),
            }));
        }
    }

    /// Walks inside a function body: collects local VARIABLE entities.
    /// Does not extract STRUCT/FIELD here per spec.md §4.2 (struct
    /// enumeration stops at function bodies).
    fn walk_function_body(&mut self, node: Node, function_name: &str, depth: usize) {
        if depth > MAX_AST_DEPTH {
            self.truncated = true;
            return;
        }

        if node.kind() == "declaration" {
            self.extract_local_declaration(node, function_name);
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_function_body(child, function_name, depth + 1);
        }
    }

    fn extract_local_declaration(&mut self, node: Node, function_name: &str) {
        let type_text = node.child_by_field_name("type").map(|n| self.text(n)).unwrap_or_default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "init_declarator" && child.kind() != "identifier" && child.kind() != "pointer_declarator"
                && child.kind() != "array_declarator"
            {
                continue;
            }
            let declarator = if child.kind() == "init_declarator" {
                child.child_by_field_name("declarator").unwrap_or(child)
            } else {
                child
            };
            let Some(name_node) = innermost_declarator_identifier(declarator) else { continue };
            let id = self.counter.next_entity();
            self.entities.push(Entity::Variable(VariableEntity {
                id,
                file: self.file,
                name: self.text(name_node),
                type_text: type_text.clone(),
                scope: Some(function_name.to_string()),
                is_parameter: false,
                span: span_of(node),
            }));
        }
    }

    fn extract_global_declaration(&mut self, node: Node) {
        // Skip function prototypes (no storage beyond a declarator, no body,
        // and declarator is a function_declarator) — spec.md only wants
        // VARIABLE entities for data declarations at file scope.
        let type_text = node.child_by_field_name("type").map(|n| self.text(n)).unwrap_or_default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let declarator = match child.kind() {
                "init_declarator" => child.child_by_field_name("declarator").unwrap_or(child),
                "identifier" | "pointer_declarator" | "array_declarator" => child,
                _ => continue,
            };
            if contains_kind(declarator, "function_declarator") {
                continue; // prototype, not a variable
            }
            let Some(name_node) = innermost_declarator_identifier(declarator) else { continue };
            let id = self.counter.next_entity();
            self.entities.push(Entity::Variable(VariableEntity {
                id,
                file: self.file,
                name: self.text(name_node),
                type_text: type_text.clone(),
                scope: None,
                is_parameter: false,
                span: span_of(node),
            }));
        }
    }

    fn extract_typedef(&mut self, node: Node, depth: usize) {
        let mut struct_node = None;
        let mut typedef_name = None;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "struct_specifier" | "union_specifier" => struct_node = Some(child),
                "type_identifier" => typedef_name = Some(self.text(child)),
                _ => {}
            }
        }
        if let Some(struct_node) = struct_node {
            self.extract_struct(struct_node, typedef_name, None, depth);
        }
    }

    /// `explicit_name` is used when a struct has no name of its own (an
    /// anonymous struct given a name only via `typedef`). `scope` is the
    /// name of the enclosing struct when this one is nested directly inside
    /// another, or `None` at global scope.
    fn extract_struct(&mut self, node: Node, explicit_name: Option<String>, scope: Option<String>, depth: usize) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .or(explicit_name)
            .unwrap_or_else(|| format!("<anonymous@{}:{}>", span_of(node).start_line, span_of(node).start_column));

        let id = self.counter.next_entity();
        self.entities.push(Entity::Struct(StructEntity {
            id,
            file: self.file,
            name: name.clone(),
            scope,
            span: span_of(node),
        }));

        if let Some(fields) = node.child_by_field_name("body") {
            self.extract_fields(fields, id, &name, depth);
        }
    }

    /// Flattens anonymous nested struct/union fields onto `owner` (the
    /// nearest named ancestor), per spec.md §8 scenario 5. A NAMED nested
    /// struct/union gets its own STRUCT entity instead, scoped to
    /// `owner_name`, per spec.md §4.2.
    fn extract_fields(&mut self, list: Node, owner: EntityId, owner_name: &str, depth: usize) {
        if depth > MAX_AST_DEPTH {
            self.truncated = true;
            return;
        }

        let mut cursor = list.walk();
        for member in list.children(&mut cursor) {
            if member.kind() != "field_declaration" {
                continue;
            }
            let type_node = member.child_by_field_name("type");
            let is_anonymous_nested = type_node
                .map(|t| matches!(t.kind(), "struct_specifier" | "union_specifier") && t.child_by_field_name("name").is_none())
                .unwrap_or(false);

            if is_anonymous_nested {
                if let Some(nested_body) = type_node.and_then(|t| t.child_by_field_name("body")) {
                    self.extract_fields(nested_body, owner, owner_name, depth + 1);
                }
                continue;
            }

            let is_named_nested = type_node
                .map(|t| {
                    matches!(t.kind(), "struct_specifier" | "union_specifier")
                        && t.child_by_field_name("name").is_some()
                        && t.child_by_field_name("body").is_some()
                })
                .unwrap_or(false);

            if is_named_nested {
                self.extract_struct(type_node.unwrap(), None, Some(owner_name.to_string()), depth + 1);
            }

            let type_text = type_node.map(|n| self.text(n)).unwrap_or_default();
            let mut fcursor = member.walk();
            for declarator in member.children(&mut fcursor) {
                let declarator = match declarator.kind() {
                    "field_identifier" => declarator,
                    "pointer_declarator" | "array_declarator" | "function_declarator" => {
                        match innermost_declarator_identifier(declarator) {
                            Some(n) => n,
                            None => continue,
                        }
                    }
                    _ => continue,
                };
                let id = self.counter.next_entity();
                self.entities.push(Entity::Field(FieldEntity {
                    id,
                    file: self.file,
                    name: self.text(declarator),
                    type_text: type_text.clone(),
                    owner,
                    span: span_of(member),
                }));
            }
        }
    }
}

fn has_storage_class(node: Node, src: &[u8], keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.kind() == "storage_class_specifier" && c.utf8_text(src).unwrap_or("") == keyword)
}

fn contains_kind(node: Node, kind: &str) -> bool {
    if node.kind() == kind {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| contains_kind(c, kind))
}

fn find_parameter_list(declarator: Node) -> Option<Node> {
    if declarator.kind() == "function_declarator" {
        return declarator.child_by_field_name("parameters");
    }
    let mut cursor = declarator.walk();
    declarator.children(&mut cursor).find_map(find_parameter_list)
}

/// Descends through pointer/array/function declarator wrappers to the
/// identifier naming the thing being declared.
fn innermost_declarator_identifier(node: Node) -> Option<Node> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(node),
        "pointer_declarator" | "array_declarator" | "function_declarator" | "parenthesized_declarator" => {
            node.child_by_field_name("declarator").and_then(innermost_declarator_identifier)
        }
        "init_declarator" => node.child_by_field_name("declarator").and_then(innermost_declarator_identifier),
        _ => {
            let mut cursor = node.walk();
            node.children(&mut cursor).find_map(innermost_declarator_identifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_id() -> FileId {
        FileId::new(1).unwrap()
    }

    #[test]
    fn extracts_function_with_parameters() {
        let source = "int add(int a, int b) {\n  int c = a + b;\n  return c;\n}\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();

        let functions: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Function(f) => Some(f),
            _ => None,
        }).collect();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].name, "add");
        assert!(!functions[0].is_static);

        let params: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Variable(v) if v.is_parameter => Some(v),
            _ => None,
        }).collect();
        assert_eq!(params.len(), 2);

        let locals: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Variable(v) if !v.is_parameter => Some(v),
            _ => None,
        }).collect();
        assert_eq!(locals.len(), 1);
        assert_eq!(locals[0].name, "c");
    }

    #[test]
    fn detects_static_function() {
        let source = "static void helper(void) {}\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();
        let f = out.entities.iter().find_map(|e| match e {
            Entity::Function(f) => Some(f),
            _ => None,
        }).unwrap();
        assert!(f.is_static);
    }

    #[test]
    fn extracts_struct_and_members() {
        let source = "struct point { int x; int y; };\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();

        let structs: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Struct(s) => Some(s),
            _ => None,
        }).collect();
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].name, "point");

        let fields: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Field(f) => Some(f),
            _ => None,
        }).collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().all(|f| f.owner == structs[0].id));
    }

    #[test]
    fn flattens_anonymous_nested_struct_fields() {
        let source = "struct outer {\n  int tag;\n  struct { int a; int b; };\n};\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();

        let structs: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Struct(s) => Some(s),
            _ => None,
        }).collect();
        assert_eq!(structs.len(), 1, "anonymous nested struct must not produce its own entity");

        let fields: Vec<_> = out.entities.iter().filter_map(|e| match e {
            Entity::Field(f) => Some(f),
            _ => None,
        }).collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|f| f.owner == structs[0].id));
    }

    #[test]
    fn typedef_struct_uses_typedef_name() {
        let source = "typedef struct { int x; } point_t;\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();
        let s = out.entities.iter().find_map(|e| match e {
            Entity::Struct(s) => Some(s),
            _ => None,
        }).unwrap();
        assert_eq!(s.name, "point_t");
    }

    #[test]
    fn extracts_global_variable() {
        let source = "int counter = 0;\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();
        let v = out.entities.iter().find_map(|e| match e {
            Entity::Variable(v) => Some(v),
            _ => None,
        }).unwrap();
        assert_eq!(v.name, "counter");
        assert_eq!(v.scope, None);
    }

    #[test]
    fn function_prototype_is_not_a_variable() {
        let source = "int add(int a, int b);\n";
        let mut counter = IdCounter::default();
        let out = extract_file(file_id(), "a.c", source, &mut counter).unwrap();
        assert!(out.entities.iter().all(|e| !matches!(e, Entity::Variable(_))));
    }
}
