//! HAS_MEMBER: STRUCT -> FIELD. The owning struct's id is recorded
//! directly on each `FieldEntity` during extraction (including for
//! flattened anonymous nested fields), so this is a direct projection
//! rather than a name-based join.

use crate::entity::Entity;
use crate::relation::{Relation, RelationKind};

pub fn extract(entities: &[Entity]) -> Vec<Relation> {
    entities
        .iter()
        .filter_map(|e| match e {
            Entity::Field(f) => Some(Relation::new(f.owner, f.id, RelationKind::HasMember)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldEntity;
    use crate::types::{EntityId, FileId, Span};

    #[test]
    fn emits_one_relation_per_field() {
        let owner = EntityId::new(1).unwrap();
        let entities = vec![Entity::Field(FieldEntity {
            id: EntityId::new(2).unwrap(),
            file: FileId::new(1).unwrap(),
            name: "x".into(),
            type_text: "int".into(),
            owner,
            span: Span::new(1, 0, 1, 1),
        })];
        let relations = extract(&entities);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].head, owner);
        assert_eq!(relations[0].kind, RelationKind::HasMember);
    }
}
