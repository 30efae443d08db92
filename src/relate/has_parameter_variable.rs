//! HAS_PARAMETER and HAS_VARIABLE: FUNCTION -> {parameter, local variable}.
//! Joined by `(scope name, file)`, since a `VariableEntity`'s scope is a
//! function's name rather than its id (spec.md's Design Note "scope as a
//! string").

use std::collections::HashMap;

use crate::entity::Entity;
use crate::relation::{Relation, RelationKind};
use crate::types::{EntityId, FileId};

pub fn extract(entities: &[Entity]) -> Vec<Relation> {
    let functions_by_name_and_file: HashMap<(String, FileId), EntityId> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::Function(f) => Some(((f.name.clone(), f.file), f.id)),
            _ => None,
        })
        .collect();

    entities
        .iter()
        .filter_map(|e| {
            let Entity::Variable(v) = e else { return None };
            let scope = v.scope.as_ref()?;
            let function_id = functions_by_name_and_file.get(&(scope.clone(), v.file))?;
            let kind = if v.is_parameter { RelationKind::HasParameter } else { RelationKind::HasVariable };
            Some(Relation::new(*function_id, v.id, kind))
        })
        .collect()
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
    fn links_parameter_and_local_to_owning_function() {
        let file = FileId::new(1).unwrap();
        let func_id = EntityId::new(1).unwrap();
        let param_id = EntityId::new(2).unwrap();
        let local_id = EntityId::new(3).unwrap();

        let entities = vec![
            Entity::Function(FunctionEntity {
                id: func_id,
                file,
                name: "f".into(),
                return_type: "void".into(),
                span: span(),
                is_static: false,
            }),
            Entity::Variable(VariableEntity {
                id: param_id,
                file,
                name: "a".into(),
                type_text: "int".into(),
                scope: Some("f".into()),
                is_parameter: true,
                span: span(),
            }),
            Entity::Variable(VariableEntity {
                id: local_id,
                file,
                name: "b".into(),
                type_text: "int".into(),
                scope: Some("f".into()),
                is_parameter: false,
                span: span(),
            }),
        ];

        let relations = extract(&entities);
        assert_eq!(relations.len(), 2);
        assert!(relations.iter().any(|r| r.tail == param_id && r.kind == RelationKind::HasParameter));
        assert!(relations.iter().any(|r| r.tail == local_id && r.kind == RelationKind::HasVariable));
    }
}
