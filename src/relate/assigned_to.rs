//! ASSIGNED_TO: the right-hand side of an assignment or initializer is
//! linked to the left-hand target it was assigned into. Both sides resolve
//! independently; a pair only produces a relation when both resolve.

use std::collections::HashMap;

use crate::relate::{AssignmentSite, RefExpr};
use crate::relation::{Relation, RelationKind};
use crate::resolve::{Indices, VisibleFiles};
use crate::types::{EntityId, FileId};

pub fn extract(file: FileId, sites: &[AssignmentSite], indices: &Indices, visible: &VisibleFiles) -> Vec<Relation> {
    let mut relations = Vec::new();
    for site in sites {
        let target = resolve_ref(&site.target, indices, file, site.function.as_deref(), visible);
        let value = resolve_ref(&site.value, indices, file, site.function.as_deref(), visible);
        if let (Some(target_id), Some(value_id)) = (target, value) {
            relations.push(Relation::new(target_id, value_id, RelationKind::AssignedTo).visibility_checked());
        }
    }
    relations
}

/// Builds the field/variable -> function map `calls::extract` uses to
/// follow function-pointer dispatch: every `ASSIGNED_TO` edge whose value
/// is itself a FUNCTION entity.
pub fn assigned_functions(relations: &[Relation], functions: &std::collections::HashSet<EntityId>) -> HashMap<EntityId, EntityId> {
    relations
        .iter()
        .filter(|r| r.kind == RelationKind::AssignedTo && functions.contains(&r.tail))
        .map(|r| (r.head, r.tail))
        .collect()
}

fn resolve_ref(reference: &RefExpr, indices: &Indices, file: FileId, function: Option<&str>, visible: &VisibleFiles) -> Option<EntityId> {
    match reference {
        RefExpr::Name(name) => indices.resolve(name, file, function, visible),
        RefExpr::Field(name) => indices.resolve_field(name, file, visible),
    }
}
