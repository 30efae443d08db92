//! Entity kinds extracted from a C source tree.
//!
//! Grounded on the teacher's `Symbol` (`src/symbol/mod.rs`): here each kind
//! carries genuinely different attributes, so the entity is a proper tagged
//! union rather than one struct with a `kind` discriminant and optional
//! fields bolted on for each variant.

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, FileId, Span};

/// A scope is either the whole file (global) or the name of the enclosing
/// function. Kept as a string per the design note in spec.md ("scope as a
/// string is sufficient; scopes never need their own identity").
pub type Scope = Option<String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: EntityId,
    pub file_id: FileId,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub id: EntityId,
    pub file: FileId,
    pub name: String,
    pub return_type: String,
    pub span: Span,
    /// `true` for `static` functions, which are visible only within `file`.
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructEntity {
    pub id: EntityId,
    pub file: FileId,
    pub name: String,
    pub scope: Scope,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntity {
    pub id: EntityId,
    pub file: FileId,
    pub name: String,
    pub type_text: String,
    /// The struct this field belongs to; flattened anonymous nested
    /// struct/union fields record their nearest named ancestor here.
    pub owner: EntityId,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableEntity {
    pub id: EntityId,
    pub file: FileId,
    pub name: String,
    pub type_text: String,
    /// `None` for file-scope globals, `Some(function name)` for locals and
    /// parameters.
    pub scope: Scope,
    pub is_parameter: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    File(FileEntity),
    Function(FunctionEntity),
    Struct(StructEntity),
    Field(FieldEntity),
    Variable(VariableEntity),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::File(e) => e.id,
            Entity::Function(e) => e.id,
            Entity::Struct(e) => e.id,
            Entity::Field(e) => e.id,
            Entity::Variable(e) => e.id,
        }
    }

    pub fn file(&self) -> Option<FileId> {
        match self {
            Entity::File(e) => Some(e.file_id),
            Entity::Function(e) => Some(e.file),
            Entity::Struct(e) => Some(e.file),
            Entity::Field(e) => Some(e.file),
            Entity::Variable(e) => Some(e.file),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Entity::File(_) => None,
            Entity::Function(e) => Some(&e.name),
            Entity::Struct(e) => Some(&e.name),
            Entity::Field(e) => Some(&e.name),
            Entity::Variable(e) => Some(&e.name),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::File(_) => "FILE",
            Entity::Function(_) => "FUNCTION",
            Entity::Struct(_) => "STRUCT",
            Entity::Field(_) => "FIELD",
            Entity::Variable(_) => "VARIABLE",
        }
    }

    /// Reassigns this entity's id to `new_id`, remapping any id it holds to
    /// another entity (currently only `FieldEntity::owner`) through `remap`.
    /// Used both when re-numbering a file's entities into the shared
    /// counter space and when reconciling a modified file's entities
    /// against its previous ones (spec.md §4.7).
    pub fn reassign(self, new_id: EntityId, remap: &std::collections::HashMap<EntityId, EntityId>) -> Entity {
        match self {
            Entity::File(mut e) => {
                e.id = new_id;
                Entity::File(e)
            }
            Entity::Function(mut e) => {
                e.id = new_id;
                Entity::Function(e)
            }
            Entity::Struct(mut e) => {
                e.id = new_id;
                Entity::Struct(e)
            }
            Entity::Field(mut e) => {
                e.id = new_id;
                e.owner = *remap.get(&e.owner).unwrap_or(&e.owner);
                Entity::Field(e)
            }
            Entity::Variable(mut e) => {
                e.id = new_id;
                Entity::Variable(e)
            }
        }
    }

    /// The `(kind, name, scope)` signature spec.md §4.7 step 4 uses to match
    /// a re-extracted entity against one from the prior snapshot: same kind,
    /// same name, same scope. A `FIELD`'s scope is its owning struct's name
    /// (looked up in `siblings`, the rest of that entity's own extraction
    /// batch) rather than a function name, since fields don't have one.
    pub fn signature(&self, siblings: &[Entity]) -> Option<(&'static str, String, Scope)> {
        match self {
            Entity::File(_) => None,
            Entity::Function(e) => Some((self.kind_name(), e.name.clone(), None)),
            Entity::Struct(e) => Some((self.kind_name(), e.name.clone(), e.scope.clone())),
            Entity::Variable(e) => Some((self.kind_name(), e.name.clone(), e.scope.clone())),
            Entity::Field(e) => {
                let owner_name = siblings.iter().find(|o| o.id() == e.owner).and_then(|o| o.name());
                Some((self.kind_name(), e.name.clone(), owner_name.map(str::to_string)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 0, 1, 10)
    }

    #[test]
    fn kind_name_matches_variant() {
        let f = Entity::Function(FunctionEntity {
            id: EntityId::new(1).unwrap(),
            file: FileId::new(1).unwrap(),
            name: "foo".into(),
            return_type: "int".into(),
            span: span(),
            is_static: false,
        });
        assert_eq!(f.kind_name(), "FUNCTION");
        assert_eq!(f.name(), Some("foo"));
    }

    #[test]
    fn file_entity_has_no_name() {
        let f = Entity::File(FileEntity {
            id: EntityId::new(1).unwrap(),
            file_id: FileId::new(1).unwrap(),
            path: "/a/b.c".into(),
        });
        assert_eq!(f.name(), None);
        assert_eq!(f.file(), Some(FileId::new(1).unwrap()));
    }

    #[test]
    fn field_signature_uses_owner_name() {
        let owner_id = EntityId::new(1).unwrap();
        let owner = Entity::Struct(StructEntity {
            id: owner_id,
            file: FileId::new(1).unwrap(),
            name: "point".into(),
            scope: None,
            span: span(),
        });
        let field = Entity::Field(FieldEntity {
            id: EntityId::new(2).unwrap(),
            file: FileId::new(1).unwrap(),
            name: "x".into(),
            type_text: "int".into(),
            owner: owner_id,
            span: span(),
        });
        let batch = vec![owner, field.clone()];
        assert_eq!(field.signature(&batch), Some(("FIELD", "x".to_string(), Some("point".to_string()))));
    }

    #[test]
    fn reassign_remaps_field_owner() {
        let old_owner = EntityId::new(1).unwrap();
        let new_owner = EntityId::new(10).unwrap();
        let field = Entity::Field(FieldEntity {
            id: EntityId::new(2).unwrap(),
            file: FileId::new(1).unwrap(),
            name: "x".into(),
            type_text: "int".into(),
            owner: old_owner,
            span: span(),
        });
        let mut remap = std::collections::HashMap::new();
        remap.insert(old_owner, new_owner);
        let reassigned = field.reassign(EntityId::new(20).unwrap(), &remap);
        match reassigned {
            Entity::Field(f) => {
                assert_eq!(f.id, EntityId::new(20).unwrap());
                assert_eq!(f.owner, new_owner);
            }
            _ => panic!("expected field"),
        }
    }
}
