//! Shared fixtures: the shapes language and hand-written typed wrappers in the
//! shape a code generator would emit.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use metagraph::config::EngineConfig;
use metagraph::graph::{GraphResult, NodeId, Partition};
use metagraph::language::{
    Classifier, DataType, Enumeration, Feature, Language, LanguageDefinition, Multiplicity,
    PrimitiveType,
};
use metagraph::notification::{ChangeEvent, EventKind};
use metagraph::typed::{MultiLinkAccessor, PropertyAccessor, SingleLinkAccessor, TypedNode};

// =============================================================================
// Language
// =============================================================================

fn string_property(key: &str, multiplicity: Multiplicity) -> Feature {
    Feature::property(key, DataType::primitive(PrimitiveType::String), multiplicity)
}

pub fn shapes_definition() -> LanguageDefinition {
    LanguageDefinition {
        key: "shapes".into(),
        name: "Shapes".into(),
        version: "1".into(),
        classifiers: vec![
            Classifier::interface("INamed")
                .with_feature(string_property("name", Multiplicity::OptionalSingle)),
            Classifier::interface("IKeyed")
                .with_feature(string_property("uuid", Multiplicity::RequiredSingle)),
            Classifier::abstract_concept("Shape")
                .implementing("INamed")
                .implementing("IKeyed")
                .with_feature(Feature::property(
                    "color",
                    DataType::enumeration("Color"),
                    Multiplicity::OptionalSingle,
                )),
            Classifier::concept("Coord")
                .with_feature(Feature::property(
                    "x",
                    DataType::primitive(PrimitiveType::Integer),
                    Multiplicity::OptionalSingle,
                ))
                .with_feature(Feature::property(
                    "y",
                    DataType::primitive(PrimitiveType::Integer),
                    Multiplicity::OptionalSingle,
                )),
            Classifier::concept("Circle")
                .extending("Shape")
                .with_feature(Feature::property(
                    "r",
                    DataType::primitive(PrimitiveType::Integer),
                    Multiplicity::OptionalSingle,
                ))
                .with_feature(Feature::containment("center", "Coord", Multiplicity::OptionalSingle))
                .with_feature(Feature::property(
                    "metadata",
                    DataType::primitive(PrimitiveType::Json),
                    Multiplicity::OptionalSingle,
                )),
            Classifier::concept("Line")
                .extending("Shape")
                .with_feature(Feature::containment("start", "Coord", Multiplicity::OptionalSingle))
                .with_feature(Feature::containment("end", "Coord", Multiplicity::OptionalSingle))
                .with_feature(Feature::containment("anchor", "Coord", Multiplicity::RequiredSingle)),
            Classifier::concept("CompositeShape")
                .extending("Shape")
                .with_feature(Feature::containment("parts", "Shape", Multiplicity::OptionalMultiple)),
            Classifier::concept("Documentation")
                .with_feature(string_property("text", Multiplicity::OptionalSingle))
                .with_feature(Feature::property(
                    "technical",
                    DataType::primitive(PrimitiveType::Boolean),
                    Multiplicity::OptionalSingle,
                )),
            Classifier::partition_concept("Geometry")
                .with_feature(Feature::containment(
                    "documentation",
                    "Documentation",
                    Multiplicity::OptionalSingle,
                ))
                .with_feature(Feature::containment("shapes", "Shape", Multiplicity::RequiredMultiple)),
            Classifier::partition_concept("ReferenceGeometry")
                .with_feature(Feature::reference("shapes_ref", "Shape", Multiplicity::OptionalMultiple))
                .with_feature(Feature::reference("main", "Shape", Multiplicity::OptionalSingle)),
        ],
        enumerations: vec![Enumeration::new("Color", ["red", "green", "blue"])],
    }
}

pub fn shapes_language() -> Arc<Language> {
    Arc::new(Language::new(shapes_definition()).unwrap())
}

pub fn partition() -> Partition {
    Partition::new(shapes_language(), EngineConfig::quiet())
}

// =============================================================================
// Event recording
// =============================================================================

pub type Recorded = Rc<RefCell<Vec<ChangeEvent>>>;

/// Subscribes to every event kind and returns the shared log
pub fn record_all(partition: &mut Partition) -> Recorded {
    let log: Recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    partition.subscribe_all(move |event, _| sink.borrow_mut().push(event.clone()));
    log
}

pub fn kinds(log: &Recorded) -> Vec<EventKind> {
    log.borrow().iter().map(|e| e.kind).collect()
}

// =============================================================================
// Typed wrappers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry(NodeId);

impl TypedNode for Geometry {
    const CLASSIFIER: &'static str = "Geometry";

    fn from_node(node: NodeId) -> Self {
        Geometry(node)
    }

    fn node(&self) -> NodeId {
        self.0
    }
}

impl Geometry {
    pub const DOCUMENTATION: SingleLinkAccessor = SingleLinkAccessor::optional("documentation");
    pub const SHAPES: MultiLinkAccessor = MultiLinkAccessor::new("shapes");

    pub fn documentation(&self, partition: &Partition) -> GraphResult<Option<NodeId>> {
        Self::DOCUMENTATION.get(partition, self.0)
    }

    pub fn set_documentation(
        &self,
        partition: &mut Partition,
        documentation: Option<Documentation>,
    ) -> GraphResult<()> {
        Self::DOCUMENTATION.set(partition, self.0, documentation.map(|d| d.node()))
    }

    pub fn shapes(&self, partition: &Partition) -> GraphResult<Vec<NodeId>> {
        Self::SHAPES.get(partition, self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Documentation(NodeId);

impl TypedNode for Documentation {
    const CLASSIFIER: &'static str = "Documentation";

    fn from_node(node: NodeId) -> Self {
        Documentation(node)
    }

    fn node(&self) -> NodeId {
        self.0
    }
}

impl Documentation {
    pub const TEXT: PropertyAccessor<String> = PropertyAccessor::optional("text");
    pub const TECHNICAL: PropertyAccessor<bool> = PropertyAccessor::optional("technical");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle(NodeId);

impl TypedNode for Circle {
    const CLASSIFIER: &'static str = "Circle";

    fn from_node(node: NodeId) -> Self {
        Circle(node)
    }

    fn node(&self) -> NodeId {
        self.0
    }
}

impl Circle {
    pub const NAME: PropertyAccessor<String> = PropertyAccessor::optional("name");
    pub const UUID: PropertyAccessor<String> = PropertyAccessor::required("uuid");
    pub const R: PropertyAccessor<i64> = PropertyAccessor::optional("r");
    pub const METADATA: PropertyAccessor<serde_json::Value> = PropertyAccessor::optional("metadata");
    pub const CENTER: SingleLinkAccessor = SingleLinkAccessor::optional("center");

    pub fn uuid(&self, partition: &Partition) -> GraphResult<String> {
        Self::UUID.value(partition, self.0)
    }

    pub fn set_uuid(&self, partition: &mut Partition, uuid: Option<&str>) -> GraphResult<()> {
        Self::UUID.set(partition, self.0, uuid.map(str::to_string))
    }

    pub fn try_set_uuid(&self, partition: &mut Partition, uuid: Option<&str>) -> bool {
        Self::UUID.try_set(partition, self.0, uuid.map(str::to_string))
    }
}
