//! RETURNS: FUNCTION -> the entity a `return` statement yields, restricted
//! to identifier/field/pointer-member payloads per spec.md §4.4 — literals,
//! arithmetic and call expressions yield nothing.

use std::collections::HashMap;

use crate::relate::{RefExpr, ReturnSite};
use crate::relation::{Relation, RelationKind};
use crate::resolve::{Indices, VisibleFiles};
use crate::types::{EntityId, FileId};

pub fn extract(
    file: FileId,
    sites: &[ReturnSite],
    indices: &Indices,
    function_ids: &HashMap<String, EntityId>,
    visible: &VisibleFiles,
) -> Vec<Relation> {
    let mut relations = Vec::new();
    for site in sites {
        let Some(&function_id) = function_ids.get(&site.function) else { continue };
        let resolved = match &site.value {
            RefExpr::Name(name) => indices.resolve(name, file, Some(&site.function), visible),
            RefExpr::Field(name) => indices.resolve_field(name, file, visible),
        };
        if let Some(value_id) = resolved {
            relations.push(Relation::new(function_id, value_id, RelationKind::Returns).visibility_checked());
        }
    }
    relations
}
