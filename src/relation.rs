//! Typed relations between entities, and the relation kinds from spec.md §3.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Contains,
    HasMember,
    HasParameter,
    HasVariable,
    Calls,
    AssignedTo,
    Returns,
    TypeOf,
    Includes,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Contains => "CONTAINS",
            RelationKind::HasMember => "HAS_MEMBER",
            RelationKind::HasParameter => "HAS_PARAMETER",
            RelationKind::HasVariable => "HAS_VARIABLE",
            RelationKind::Calls => "CALLS",
            RelationKind::AssignedTo => "ASSIGNED_TO",
            RelationKind::Returns => "RETURNS",
            RelationKind::TypeOf => "TYPE_OF",
            RelationKind::Includes => "INCLUDES",
        }
    }
}

/// A directed, typed edge between two entities.
///
/// `context_var_id` carries the resolved variable/field an `ASSIGNED_TO` or
/// function-pointer `CALLS` relation is routed through, and is part of the
/// dedup key per spec.md §4.6 so two distinct call sites that happen to
/// share `(head, tail, kind)` but route through different fields stay
/// distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub head: EntityId,
    pub tail: EntityId,
    pub kind: RelationKind,
    pub context_var_id: Option<EntityId>,
    /// Set for CALLS/ASSIGNED_TO/RETURNS/TYPE_OF relations that were
    /// resolved through the name resolver's visibility filter (spec.md
    /// §3/§8): `true` means the tail's defining file was confirmed to lie
    /// in the visibility closure of the head's defining file. CONTAINS,
    /// HAS_MEMBER, HAS_PARAMETER, HAS_VARIABLE and INCLUDES are structural
    /// and never go through the resolver, so they leave this `false`.
    #[serde(default)]
    pub visibility_checked: bool,
}

impl Relation {
    pub fn new(head: EntityId, tail: EntityId, kind: RelationKind) -> Self {
        Self { head, tail, kind, context_var_id: None, visibility_checked: false }
    }

    pub fn with_context(head: EntityId, tail: EntityId, kind: RelationKind, context: EntityId) -> Self {
        Self { head, tail, kind, context_var_id: Some(context), visibility_checked: false }
    }

    pub fn visibility_checked(mut self) -> Self {
        self.visibility_checked = true;
        self
    }

    /// The composite key spec.md §4.6 dedups on.
    pub fn dedup_key(&self) -> (EntityId, EntityId, RelationKind, Option<EntityId>) {
        (self.head, self.tail, self.kind, self.context_var_id)
    }
}
