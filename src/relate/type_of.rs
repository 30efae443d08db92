//! TYPE_OF: a VARIABLE or FIELD's declared type, when it names a visible
//! STRUCT. `struct`/`union` keywords and pointer stars are stripped from
//! the stored type text before the lookup.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::relation::{Relation, RelationKind};
use crate::resolve::{Indices, VisibleFiles};
use crate::types::FileId;

pub fn extract(entities: &[Entity], indices: &Indices, visibility: &HashMap<FileId, VisibleFiles>) -> Vec<Relation> {
    let empty = VisibleFiles::new();
    entities
        .iter()
        .filter_map(|e| {
            let (id, file, type_text) = match e {
                Entity::Variable(v) => (v.id, v.file, v.type_text.as_str()),
                Entity::Field(f) => (f.id, f.file, f.type_text.as_str()),
                _ => return None,
            };
            let name = strip_type_decorations(type_text);
            let visible = visibility.get(&file).unwrap_or(&empty);
            let struct_id = indices.resolve_struct(&name, file, visible)?;
            Some(Relation::new(id, struct_id, RelationKind::TypeOf).visibility_checked())
        })
        .collect()
}

fn strip_type_decorations(type_text: &str) -> String {
    type_text
        .trim()
        .trim_start_matches("struct")
        .trim_start_matches("union")
        .trim_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}
