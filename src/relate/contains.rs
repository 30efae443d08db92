//! CONTAINS: a FILE entity contains every other entity defined in it.
//! Derived purely from the entity list — no AST walk needed.

use crate::entity::Entity;
use crate::relation::{Relation, RelationKind};
use crate::types::FileId;
use std::collections::HashMap;

pub fn extract(entities: &[Entity]) -> Vec<Relation> {
    let file_entity_ids: HashMap<FileId, crate::types::EntityId> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::File(f) => Some((f.file_id, f.id)),
            _ => None,
        })
        .collect();

    entities
        .iter()
        .filter_map(|e| {
            let Entity::File(_) = e else {
                let file = e.file()?;
                let file_entity = *file_entity_ids.get(&file)?;
                return Some(Relation::new(file_entity, e.id(), RelationKind::Contains));
            };
            None
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FileEntity, FunctionEntity};
    use crate::types::{EntityId, Span};

    #[test]
    fn file_contains_its_function() {
        let file_id = FileId::new(1).unwrap();
        let file_entity_id = EntityId::new(1).unwrap();
        let func_id = EntityId::new(2).unwrap();

        let entities = vec![
            Entity::File(FileEntity { id: file_entity_id, file_id, path: "a.c".into() }),
            Entity::Function(FunctionEntity {
                id: func_id,
                file: file_id,
                name: "f".into(),
                return_type: "void".into(),
                span: Span::new(1, 0, 1, 1),
                is_static: false,
            }),
        ];

        let relations = extract(&entities);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].head, file_entity_id);
        assert_eq!(relations[0].tail, func_id);
        assert_eq!(relations[0].kind, RelationKind::Contains);
    }
}
