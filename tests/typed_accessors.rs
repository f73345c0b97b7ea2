//! Typed Accessor Tests
//!
//! Generated-style wrappers over the reflective API: round-trips, the
//! `NullArgument` boundary, non-throwing setters and initializers.

mod common;

use common::{partition, Circle, Documentation, Geometry};
use metagraph::graph::{Candidate, GraphError, InvalidReason};
use metagraph::typed::{initialize, MultiLinkAccessor, TypedNode};

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_property_round_trip() {
    let mut p = partition();
    let circle = Circle::create(&mut p, "c").unwrap();

    Circle::R.set(&mut p, circle.node(), Some(7)).unwrap();
    assert_eq!(Circle::R.get(&p, circle.node()).unwrap(), Some(7));
    assert_eq!(Circle::R.value(&p, circle.node()).unwrap(), 7);

    let metadata = serde_json::json!({"source": "import", "tags": ["a", "b"]});
    Circle::METADATA
        .set(&mut p, circle.node(), Some(metadata.clone()))
        .unwrap();
    assert_eq!(Circle::METADATA.get(&p, circle.node()).unwrap(), Some(metadata));

    Circle::R.set(&mut p, circle.node(), None).unwrap();
    assert_eq!(Circle::R.get(&p, circle.node()).unwrap(), None);
}

#[test]
fn test_unset_values() {
    let mut p = partition();
    let circle = Circle::create(&mut p, "c").unwrap();

    // required: get is an error, try_get is not
    let err = circle.uuid(&p).unwrap_err();
    assert_eq!(
        err,
        GraphError::UnsetFeature {
            node: "c".into(),
            feature: "uuid".into()
        }
    );
    assert_eq!(p.try_get(circle.node(), "uuid").unwrap(), None);
    assert_eq!(Circle::UUID.get(&p, circle.node()).unwrap(), None);

    // optional: absent reads as None, a typed value read is an error
    assert_eq!(p.get(circle.node(), "name").unwrap(), None);
    assert_eq!(Circle::NAME.value(&p, circle.node()).unwrap_err().code(), "META_UNSET_FEATURE");
}

#[test]
fn test_null_argument_at_typed_boundary() {
    let mut p = partition();
    let circle = Circle::create(&mut p, "c").unwrap();

    assert_eq!(
        circle.set_uuid(&mut p, None).unwrap_err(),
        GraphError::NullArgument("uuid".into())
    );
    // an unset required feature still refuses null
    assert!(p.try_get(circle.node(), "uuid").unwrap().is_none());

    circle.set_uuid(&mut p, Some("k-1")).unwrap();
    assert!(!circle.try_set_uuid(&mut p, None));
    assert!(circle.try_set_uuid(&mut p, Some("k-2")));
    assert_eq!(circle.uuid(&p).unwrap(), "k-2");
}

#[test]
fn test_try_set_reports_validation_failure() {
    let mut p = partition();
    let doc = Documentation::create(&mut p, "d").unwrap();

    assert!(Documentation::TECHNICAL.try_set(&mut p, doc.node(), Some(true)));
    assert_eq!(Documentation::TECHNICAL.get(&p, doc.node()).unwrap(), Some(true));

    // a typed accessor whose key does not apply to the node
    assert!(!Circle::R.try_set(&mut p, doc.node(), Some(1)));
}

// =============================================================================
// Links
// =============================================================================

#[test]
fn test_single_link_accessor() {
    let mut p = partition();
    let circle = Circle::create(&mut p, "c").unwrap();
    let coord = p.create_node("origin", "Coord").unwrap();

    assert_eq!(Circle::CENTER.get(&p, circle.node()).unwrap(), None);
    Circle::CENTER.set(&mut p, circle.node(), Some(coord)).unwrap();
    assert_eq!(Circle::CENTER.value(&p, circle.node()).unwrap(), coord);
    assert_eq!(p.parent(coord), Some(circle.node()));

    Circle::CENTER.set(&mut p, circle.node(), None).unwrap();
    assert_eq!(p.parent(coord), None);
}

#[test]
fn test_multi_link_accessor() {
    let mut p = partition();
    let geometry = Geometry::create(&mut p, "g").unwrap();
    let a = Circle::create(&mut p, "a").unwrap().node();
    let b = Circle::create(&mut p, "b").unwrap().node();
    let c = Circle::create(&mut p, "c").unwrap().node();
    let shapes = Geometry::SHAPES;

    assert!(shapes.get(&p, geometry.node()).unwrap().is_empty());
    shapes.add(&mut p, geometry.node(), [a, c]).unwrap();
    shapes.insert(&mut p, geometry.node(), 1, [b]).unwrap();
    assert_eq!(geometry.shapes(&p).unwrap(), vec![a, b, c]);

    assert_eq!(shapes.remove(&mut p, geometry.node(), [b, b]).unwrap(), 1);
    assert_eq!(geometry.shapes(&p).unwrap(), vec![a, c]);

    assert!(!shapes.try_set(&mut p, geometry.node(), vec![]));
    assert!(shapes.try_set(&mut p, geometry.node(), vec![c]));
    assert_eq!(p.parent(a), None);
}

#[test]
fn test_reference_accessor_allows_duplicates() {
    let mut p = partition();
    let rg = p.create_node("rg", "ReferenceGeometry").unwrap();
    let a = Circle::create(&mut p, "a").unwrap().node();
    let refs = MultiLinkAccessor::new("shapes_ref");

    refs.add(&mut p, rg, [a, a]).unwrap();
    assert_eq!(refs.get(&p, rg).unwrap(), vec![a, a]);
    assert_eq!(refs.remove(&mut p, rg, [a]).unwrap(), 1);
    assert_eq!(refs.get(&p, rg).unwrap(), vec![a]);
}

// =============================================================================
// Creation
// =============================================================================

#[test]
fn test_create_with_initializer() {
    let mut p = partition();
    let circle = Circle::create_with(
        &mut p,
        "c",
        [("uuid", Candidate::from("u-1")), ("r", Candidate::from(4i64))],
    )
    .unwrap();

    assert_eq!(circle.uuid(&p).unwrap(), "u-1");
    assert_eq!(Circle::R.value(&p, circle.node()).unwrap(), 4);

    let doc = p.create_node("d", "Documentation").unwrap();
    let err = initialize(&mut p, doc, [("text", Candidate::from(1i64))]).unwrap_err();
    assert!(matches!(err.reason(), Some(InvalidReason::TypeMismatch { .. })));
}

#[test]
fn test_create_node_errors() {
    let mut p = partition();
    p.create_node("taken", "Circle").unwrap();

    assert_eq!(
        p.create_node("taken", "Circle").unwrap_err(),
        GraphError::DuplicateNodeId("taken".into())
    );
    assert_eq!(
        p.create_node("has space", "Circle").unwrap_err(),
        GraphError::InvalidNodeId("has space".into())
    );
    assert_eq!(
        p.create_node("s", "Shape").unwrap_err(),
        GraphError::NotInstantiable("Shape".into())
    );
    assert_eq!(
        p.create_node("i", "INamed").unwrap_err(),
        GraphError::NotInstantiable("INamed".into())
    );
    assert_eq!(
        p.create_node("u", "Square").unwrap_err(),
        GraphError::UnknownClassifier("Square".into())
    );
    assert_eq!(p.len(), 1);
}

#[test]
fn test_generated_ids() {
    let mut p = partition();
    let a = p.create_node_generated("Circle").unwrap();
    let b = p.create_node_generated("Circle").unwrap();

    let id = p.id_of(a).unwrap();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(p.id_of(a), p.id_of(b));
    assert_eq!(p.node_by_id(id), Some(a));
    assert_eq!(p.classifier_of(a).map(|c| c.key.as_str()), Some("Circle"));
}
