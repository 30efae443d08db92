//! Name resolver (spec.md §4.5): given a bare identifier (or a
//! member-access target) and the scope it was seen in, finds the entity it
//! refers to using the priority policy spec.md defines — local variable,
//! then global variable, then function, then field, each ranked 0 for a
//! same-file match and a same-family non-zero priority otherwise, lowest
//! priority wins with first-encountered as the tie-break.

use std::collections::{HashMap, HashSet};

use crate::entity::Entity;
use crate::types::{EntityId, FileId};

/// The visibility set a candidate's defining file must belong to, per
/// spec.md §4.5 ("every candidate... whose defining file ∈ V"). Passed in
/// by the caller (`visibility::VisibilityEngine::visible_from`), which
/// always includes the current file itself.
pub type VisibleFiles = HashSet<FileId>;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: EntityId,
    priority: u8,
}

/// Multi-valued lookup tables built once per extraction run (spec.md's
/// Design Note "Multi-valued indices": every index maps a name to a list,
/// never collapses to a single id).
#[derive(Default)]
pub struct Indices {
    /// (function_name, file) -> name -> local variable/parameter ids
    locals: HashMap<(String, FileId), HashMap<String, Vec<EntityId>>>,
    /// name -> (file, id) for file-scope variables
    globals: HashMap<String, Vec<(FileId, EntityId)>>,
    /// name -> (file, id, is_static)
    functions: HashMap<String, Vec<(FileId, EntityId, bool)>>,
    /// name -> (file, id)
    fields: HashMap<String, Vec<(FileId, EntityId)>>,
    /// name -> (file, id) for struct entities, used by relate::type_of
    structs: HashMap<String, Vec<(FileId, EntityId)>>,
}

impl Indices {
    pub fn build(entities: &[Entity]) -> Self {
        let mut idx = Indices::default();
        for entity in entities {
            match entity {
                Entity::Variable(v) if v.scope.is_some() => {
                    let key = (v.scope.clone().unwrap(), v.file);
                    idx.locals.entry(key).or_default().entry(v.name.clone()).or_default().push(v.id);
                }
                Entity::Variable(v) => {
                    idx.globals.entry(v.name.clone()).or_default().push((v.file, v.id));
                }
                Entity::Function(f) => {
                    idx.functions.entry(f.name.clone()).or_default().push((f.file, f.id, f.is_static));
                }
                Entity::Field(f) => {
                    idx.fields.entry(f.name.clone()).or_default().push((f.file, f.id));
                }
                Entity::Struct(s) => {
                    idx.structs.entry(s.name.clone()).or_default().push((s.file, s.id));
                }
                Entity::File(_) => {}
            }
        }
        idx
    }

    pub fn fields_named(&self, name: &str) -> &[(FileId, EntityId)] {
        self.fields.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn structs_named(&self, name: &str) -> &[(FileId, EntityId)] {
        self.structs.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn functions_named(&self, name: &str) -> &[(FileId, EntityId, bool)] {
        self.functions.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Resolves a bare identifier seen in `current_file`/`current_function`
    /// (function name, `None` at file scope) to the single best candidate,
    /// per spec.md §4.5's priority policy. `visible` is the caller's
    /// precomputed `visible(current_file)` set (spec.md §4.3); every
    /// non-local candidate whose defining file is not in it is dropped
    /// before ranking.
    pub fn resolve(&self, name: &str, current_file: FileId, current_function: Option<&str>, visible: &VisibleFiles) -> Option<EntityId> {
        let mut candidates: Vec<Candidate> = Vec::new();

        if let Some(function) = current_function {
            if let Some(locals) = self.locals.get(&(function.to_string(), current_file)) {
                if let Some(ids) = locals.get(name) {
                    candidates.extend(ids.iter().map(|&id| Candidate { id, priority: 0 }));
                }
            }
        }

        if let Some(globals) = self.globals.get(name) {
            candidates.extend(globals.iter().filter(|(file, _)| visible.contains(file)).map(|&(file, id)| Candidate {
                id,
                priority: if file == current_file { 0 } else { 10 },
            }));
        }

        if let Some(functions) = self.functions.get(name) {
            candidates.extend(functions.iter().filter_map(|&(file, id, is_static)| {
                if is_static && file != current_file {
                    return None; // static functions aren't visible outside their file
                }
                if !visible.contains(&file) {
                    return None;
                }
                Some(Candidate { id, priority: if file == current_file { 0 } else { 1 } })
            }));
        }

        if let Some(fields) = self.fields.get(name) {
            candidates.extend(fields.iter().filter(|(file, _)| visible.contains(file)).map(|&(file, id)| Candidate {
                id,
                priority: if file == current_file { 0 } else { 1 },
            }));
        }

        best(candidates)
    }

    /// Resolves a member-access target (`x.f` / `p->f`) — only the field
    /// index is consulted, per spec.md §4.5.
    pub fn resolve_field(&self, field_name: &str, current_file: FileId, visible: &VisibleFiles) -> Option<EntityId> {
        let fields = self.fields.get(field_name)?;
        let candidates = fields
            .iter()
            .filter(|(file, _)| visible.contains(file))
            .map(|&(file, id)| Candidate {
                id,
                priority: if file == current_file { 0 } else { 1 },
            });
        best(candidates.collect())
    }

    /// Resolves a declared-type name to a visible STRUCT, per spec.md
    /// §4.4's TYPE_OF extractor: same-file candidate preferred, otherwise
    /// the first visible candidate (first-encountered tie-break, per
    /// spec.md's Design Note on ambiguous tie-breaks).
    pub fn resolve_struct(&self, name: &str, current_file: FileId, visible: &VisibleFiles) -> Option<EntityId> {
        let candidates = self.structs.get(name)?;
        candidates
            .iter()
            .filter(|(file, _)| visible.contains(file))
            .find(|(file, _)| *file == current_file)
            .or_else(|| candidates.iter().find(|(file, _)| visible.contains(file)))
            .map(|(_, id)| *id)
    }
}

fn best(candidates: Vec<Candidate>) -> Option<EntityId> {
    let min_priority = candidates.iter().map(|c| c.priority).min()?;
    candidates.into_iter().find(|c| c.priority == min_priority).map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FunctionEntity, VariableEntity};
    use crate::types::Span;

    fn span() -> Span {
        Span::new(1, 0, 1, 1)
    }

    #[test]
    fn local_variable_outranks_global_in_same_function() {
        let file = FileId::new(1).unwrap();
        let local_id = EntityId::new(1).unwrap();
        let global_id = EntityId::new(2).unwrap();

        let entities = vec![
            Entity::Variable(VariableEntity {
                id: local_id,
                file,
                name: "x".into(),
                type_text: "int".into(),
                scope: Some("f".into()),
                is_parameter: false,
                span: span(),
            }),
            Entity::Variable(VariableEntity {
                id: global_id,
                file,
                name: "x".into(),
                type_text: "int".into(),
                scope: None,
                is_parameter: false,
                span: span(),
            }),
        ];
        let idx = Indices::build(&entities);
        let visible: VisibleFiles = [file].into_iter().collect();
        assert_eq!(idx.resolve("x", file, Some("f"), &visible), Some(local_id));
    }

    #[test]
    fn same_file_function_outranks_other_file_function() {
        let file_a = FileId::new(1).unwrap();
        let file_b = FileId::new(2).unwrap();
        let id_a = EntityId::new(1).unwrap();
        let id_b = EntityId::new(2).unwrap();

        let entities = vec![
            Entity::Function(FunctionEntity {
                id: id_a,
                file: file_a,
                name: "helper".into(),
                return_type: "void".into(),
                span: span(),
                is_static: false,
            }),
            Entity::Function(FunctionEntity {
                id: id_b,
                file: file_b,
                name: "helper".into(),
                return_type: "void".into(),
                span: span(),
                is_static: false,
            }),
        ];
        let idx = Indices::build(&entities);
        let visible: VisibleFiles = [file_a, file_b].into_iter().collect();
        assert_eq!(idx.resolve("helper", file_a, None, &visible), Some(id_a));
    }

    #[test]
    fn static_function_invisible_outside_its_file() {
        let file_a = FileId::new(1).unwrap();
        let file_b = FileId::new(2).unwrap();
        let id_a = EntityId::new(1).unwrap();

        let entities = vec![Entity::Function(FunctionEntity {
            id: id_a,
            file: file_a,
            name: "helper".into(),
            return_type: "void".into(),
            span: span(),
            is_static: true,
        })];
        let idx = Indices::build(&entities);
        let visible: VisibleFiles = [file_a, file_b].into_iter().collect();
        assert_eq!(idx.resolve("helper", file_a, None, &visible), Some(id_a));
        assert_eq!(idx.resolve("helper", file_b, None, &visible), None);
    }

    #[test]
    fn candidate_outside_visibility_set_is_dropped() {
        let file_a = FileId::new(1).unwrap();
        let file_b = FileId::new(2).unwrap();
        let id_b = EntityId::new(1).unwrap();

        let entities = vec![Entity::Function(FunctionEntity {
            id: id_b,
            file: file_b,
            name: "helper".into(),
            return_type: "void".into(),
            span: span(),
            is_static: false,
        })];
        let idx = Indices::build(&entities);
        // file_b is never in file_a's visibility set (no include/sibling edge).
        let visible: VisibleFiles = [file_a].into_iter().collect();
        assert_eq!(idx.resolve("helper", file_a, None, &visible), None);
    }
}
