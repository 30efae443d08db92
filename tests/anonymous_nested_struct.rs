//! An anonymous nested struct's fields flatten onto the nearest named
//! ancestor, end to end through `pipeline::run_full`: one STRUCT entity,
//! every field (direct and nested) owned by it, and a HAS_MEMBER relation
//! for each.

use std::fs;

use ckg::config::Settings;
use ckg::entity::Entity;
use ckg::pipeline;
use ckg::relation::RelationKind;

#[test]
fn nested_anonymous_struct_fields_flatten_onto_named_parent() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(
        root.join("shape.c"),
        "struct shape {\n    int tag;\n    struct {\n        int width;\n        int height;\n    };\n};\n",
    )
    .unwrap();

    let settings = Settings::default();
    let report = pipeline::run_full(root, &settings).unwrap();
    let entities = &report.snapshot.entities;

    let structs: Vec<_> = entities.iter().filter_map(|e| match e {
        Entity::Struct(s) => Some(s),
        _ => None,
    }).collect();
    assert_eq!(structs.len(), 1, "the anonymous nested struct must not get its own entity");
    let owner = structs[0].id;

    let field_names: Vec<&str> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::Field(f) if f.owner == owner => Some(f.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(field_names.len(), 3);
    assert!(field_names.contains(&"tag"));
    assert!(field_names.contains(&"width"));
    assert!(field_names.contains(&"height"));

    let has_member_count = report
        .snapshot
        .relations
        .iter()
        .filter(|r| r.kind == RelationKind::HasMember && r.head == owner)
        .count();
    assert_eq!(has_member_count, 3);
}
