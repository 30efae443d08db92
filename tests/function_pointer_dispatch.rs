//! A call dispatched through a function-pointer struct field keeps its
//! `CALLS` tail on the field itself; the FUNCTION actually assigned into it
//! is only reachable transitively through the field's `ASSIGNED_TO` edge.

use std::fs;

use ckg::config::Settings;
use ckg::entity::Entity;
use ckg::pipeline;
use ckg::relation::RelationKind;

#[test]
fn call_through_function_pointer_field_resolves_to_assigned_function() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(
        root.join("dispatch.c"),
        r#"
typedef struct {
    void (*execute)(void);
} ops_t;

static ops_t global_ops;

void real_impl(void) {
}

void setup(void) {
    global_ops.execute = real_impl;
}

void dispatch(void) {
    global_ops.execute();
}
"#,
    )
    .unwrap();

    let settings = Settings::default();
    let report = pipeline::run_full(root, &settings).unwrap();
    let entities = &report.snapshot.entities;

    let real_impl_id = entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "real_impl" => Some(f.id),
            _ => None,
        })
        .expect("real_impl function entity");

    let dispatch_id = entities
        .iter()
        .find_map(|e| match e {
            Entity::Function(f) if f.name == "dispatch" => Some(f.id),
            _ => None,
        })
        .expect("dispatch function entity");

    let execute_field_id = entities
        .iter()
        .find_map(|e| match e {
            Entity::Field(f) if f.name == "execute" => Some(f.id),
            _ => None,
        })
        .expect("execute field entity");

    let call = report
        .snapshot
        .relations
        .iter()
        .find(|r| r.kind == RelationKind::Calls && r.head == dispatch_id)
        .expect("dispatch should have an outgoing CALLS relation");

    assert_eq!(call.tail, execute_field_id, "the CALLS tail stays on the field, not the assigned function");
    assert_eq!(call.context_var_id, Some(execute_field_id), "context should record the field dispatched through");

    let assignment = report
        .snapshot
        .relations
        .iter()
        .find(|r| r.kind == RelationKind::AssignedTo && r.head == execute_field_id)
        .expect("execute field should have an outgoing ASSIGNED_TO relation");
    assert_eq!(assignment.tail, real_impl_id, "real_impl is reachable transitively through ASSIGNED_TO");
}
