//! INCLUDES: thin wrapper turning resolved `#include` edges from
//! [`crate::visibility`] into FILE -> FILE relations.

use std::collections::HashMap;

use crate::relation::{Relation, RelationKind};
use crate::types::{EntityId, FileId};
use crate::visibility::IncludeGraph;

pub fn extract(graph: &IncludeGraph, file_entity_ids: &HashMap<FileId, EntityId>) -> Vec<Relation> {
    graph
        .edges()
        .filter_map(|(from, to)| {
            let head = *file_entity_ids.get(&from)?;
            let tail = *file_entity_ids.get(&to)?;
            Some(Relation::new(head, tail, RelationKind::Includes))
        })
        .collect()
}
