//! CALLS: caller FUNCTION -> callee FUNCTION. Macro-wrapped call sites are
//! resolved against the canonical head recovered by
//! [`crate::preprocess::expander`] before falling back to the raw callee
//! text, per spec.md §4.1/§4.4.
//!
//! When a call dispatches through a function-pointer field or variable
//! (spec.md §8 scenario 2, e.g. `host->ops->execute_tuning()`), the
//! resolved target is a FIELD or VARIABLE rather than a FUNCTION; the
//! relation's tail stays on that FIELD/VARIABLE — the FUNCTION it was last
//! assigned (`assigned`, built from the `ASSIGNED_TO` relations already
//! extracted) is only reachable transitively through the `ASSIGNED_TO` edge,
//! not by redirecting `CALLS` itself. `context_var_id` still records the
//! field/variable the dispatch went through, matching `tail` in this case.

use std::collections::HashMap;

use crate::preprocess::MacroTable;
use crate::relate::{CallSite, RefExpr};
use crate::relation::{Relation, RelationKind};
use crate::resolve::{Indices, VisibleFiles};
use crate::types::{EntityId, FileId};

pub fn extract(
    file: FileId,
    sites: &[CallSite],
    indices: &Indices,
    visible: &VisibleFiles,
    macros: &MacroTable,
    caller_ids: &HashMap<String, EntityId>,
    functions: &std::collections::HashSet<EntityId>,
    assigned: &HashMap<EntityId, EntityId>,
) -> Vec<Relation> {
    let mut relations = Vec::new();
    for site in sites {
        let Some(&caller_id) = caller_ids.get(&site.caller_function) else { continue };

        let effective_name = match macros.lookup(file, site.span.start_line, site.span.start_column) {
            Some(entry) => RefExpr::Name(entry.canonical_head.clone()),
            None => site.callee.clone(),
        };

        let resolved = match &effective_name {
            RefExpr::Name(name) => indices.resolve(name, file, Some(&site.caller_function), visible),
            RefExpr::Field(name) => indices.resolve_field(name, file, visible),
        };

        let Some(resolved_id) = resolved else { continue };

        if functions.contains(&resolved_id) {
            relations.push(Relation::new(caller_id, resolved_id, RelationKind::Calls).visibility_checked());
        } else if assigned.contains_key(&resolved_id) {
            relations.push(Relation::with_context(caller_id, resolved_id, RelationKind::Calls, resolved_id).visibility_checked());
        } else {
            // Dispatch target is a function pointer field/variable we never
            // saw assigned; still record the edge so the graph shows the
            // call was attempted, per spec.md §7's lenient-resolution stance.
            relations.push(Relation::new(caller_id, resolved_id, RelationKind::Calls).visibility_checked());
        }
    }
    relations
}
