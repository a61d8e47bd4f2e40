//! Cycle-safe serialization of related entities into JSON objects.
//!
//! [`serialize`] walks an entity, copies its scalar columns, and recurses into
//! every declared relationship. A `(type name, identity)` key is held in the
//! `visited` set while an entity's relationships are being walked, so a
//! back-reference to an entity already on the current path is cut instead of
//! looping. The key is released afterwards, which lets the same entity appear
//! again in a sibling branch.
//!
//! [`Shape`] narrows the output with dotted exclusion paths. The shapes the
//! HTTP endpoints use live in [`shapes`].

pub mod graph;
pub mod shapes;

use std::collections::HashSet;

use serde_json::{Map, Value};

pub use graph::{Entity, EntityGraph, EntityRef, Related};
pub use shapes::Shape;

/// Cycle-guard key: runtime type name and identity.
pub type VisitKey = (&'static str, i64);

/// Serialize `entity` with no exclusions and a fresh visited set.
pub fn serialize_entity<'g>(
    entity: impl Into<EntityRef<'g>>,
    graph: &'g EntityGraph,
) -> Option<Map<String, Value>> {
    serialize(entity.into(), graph, &Shape::FULL, &mut HashSet::new())
}

/// Serialize `entity` and everything reachable from it.
///
/// Returns `None` when `entity` is already in `visited` or when the resulting
/// object has no keys. `visited` is left as it was found.
pub fn serialize<'g>(
    entity: EntityRef<'g>,
    graph: &'g EntityGraph,
    shape: &Shape,
    visited: &mut HashSet<VisitKey>,
) -> Option<Map<String, Value>> {
    serialize_at(entity, graph, shape, "", visited)
}

fn serialize_at<'g>(
    entity: EntityRef<'g>,
    graph: &'g EntityGraph,
    shape: &Shape,
    path: &str,
    visited: &mut HashSet<VisitKey>,
) -> Option<Map<String, Value>> {
    let key = (entity.type_name(), entity.identity());
    if !visited.insert(key) {
        return None;
    }

    let mut result = Map::new();
    for (name, value) in entity.columns() {
        result.insert(name.to_string(), value);
    }

    for &name in entity.relationships() {
        let child_path = join_path(path, name);
        if shape.excludes(&child_path) {
            continue;
        }

        match entity.related(name, graph) {
            Some(Related::Many(members)) => {
                let items = members
                    .into_iter()
                    .filter_map(|member| serialize_at(member, graph, shape, &child_path, visited))
                    .map(Value::Object)
                    .collect();
                result.insert(name.to_string(), Value::Array(items));
            }
            Some(Related::One(Some(target))) => {
                let value = serialize_at(target, graph, shape, &child_path, visited)
                    .map(Value::Object)
                    .unwrap_or(Value::Null);
                result.insert(name.to_string(), value);
            }
            // Dangling reference or undeclared name: nothing to emit.
            Some(Related::One(None)) | None => {}
        }
    }

    visited.remove(&key);

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
