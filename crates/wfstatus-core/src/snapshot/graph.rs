//! Workflow graph model: nodes, edges and the structure document.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::SerializationError;

/// Type tag carried by every structure document.
pub const STRUCTURE_TYPE: &str = "yadage";

/// Descriptive fields of a node.
///
/// `name` is always present; anything else the engine attaches is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Display name of the step.
    pub name: String,

    /// Additional engine-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeMetadata {
    /// Creates metadata with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Attaches an extra descriptive field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A single step of the workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier unique within the graph.
    pub nodeid: String,
    /// Display metadata.
    pub metadata: NodeMetadata,
    /// External job identifier, present once the node's work was dispatched.
    #[serde(default)]
    pub jobid: Option<String>,
}

impl Node {
    /// Creates a node that has not been dispatched yet.
    pub fn new(nodeid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            nodeid: nodeid.into(),
            metadata: NodeMetadata::new(name),
            jobid: None,
        }
    }

    /// Sets the external job identifier.
    #[must_use]
    pub fn with_jobid(mut self, jobid: impl Into<String>) -> Self {
        self.jobid = Some(jobid.into());
        self
    }

    /// Replaces the node metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if the node's work has been handed to a backend.
    #[inline]
    pub fn is_dispatched(&self) -> bool {
        self.jobid.is_some()
    }
}

/// A directed dependency between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Upstream node id.
    pub from: String,
    /// Downstream node id.
    pub to: String,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Point-in-time view of the workflow graph.
///
/// Node and edge order reflects the order in which the engine discovered
/// them and is preserved through rendering.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes in discovery order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in creation order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Creates a graph from nodes and edges.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Looks up a node by id.
    pub fn node(&self, nodeid: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.nodeid == nodeid)
    }

    /// Checks that node ids are unique and every edge joins known nodes.
    pub fn validate(&self) -> Result<(), SerializationError> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.nodeid.as_str()) {
                return Err(SerializationError::DuplicateNode {
                    nodeid: node.nodeid.clone(),
                });
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(SerializationError::unknown_node(
                        &edge.from, &edge.to, endpoint,
                    ));
                }
            }
        }

        Ok(())
    }
}

/// The `structure` document: a type tag plus the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDocument {
    /// Always [`STRUCTURE_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// The workflow graph.
    pub graph: GraphSnapshot,
}

impl StructureDocument {
    /// Wraps a graph with the default type tag.
    pub fn new(graph: GraphSnapshot) -> Self {
        Self {
            kind: STRUCTURE_TYPE.to_owned(),
            graph,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_graph() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                Node::new("1234", "selection"),
                Node::new("9876", "fitting").with_jobid("job-12345"),
            ],
            vec![Edge::new("1234", "9876")],
        )
    }

    #[test]
    fn test_node_shape() {
        let value = serde_json::to_value(Node::new("1234", "selection")).unwrap();
        assert_eq!(
            value,
            json!({"nodeid": "1234", "metadata": {"name": "selection"}, "jobid": null})
        );
    }

    #[test]
    fn test_metadata_keeps_extra_fields() {
        let node: Node = serde_json::from_value(json!({
            "nodeid": "a",
            "metadata": {"name": "fit", "wflow_offset": "/fitting", "attempt": 2},
        }))
        .unwrap();

        assert_eq!(node.metadata.name, "fit");
        assert_eq!(node.metadata.extra["attempt"], json!(2));
        assert!(!node.is_dispatched());
    }

    #[test]
    fn test_structure_document_shape() {
        let value = serde_json::to_value(StructureDocument::new(sample_graph())).unwrap();
        assert_eq!(value["type"], "yadage");
        assert_eq!(value["graph"]["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["graph"]["edges"][0], json!({"from": "1234", "to": "9876"}));
    }

    #[test]
    fn test_validate_accepts_sample() {
        let graph = sample_graph();
        assert!(graph.validate().is_ok());
        assert_eq!(graph.node("9876").unwrap().jobid.as_deref(), Some("job-12345"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let graph = GraphSnapshot::new(vec![Node::new("a", "x"), Node::new("a", "y")], vec![]);
        assert!(matches!(
            graph.validate(),
            Err(SerializationError::DuplicateNode { nodeid }) if nodeid == "a"
        ));
    }

    #[test]
    fn test_validate_rejects_dangling_edge() {
        let graph = GraphSnapshot::new(vec![Node::new("a", "x")], vec![Edge::new("a", "b")]);
        assert!(matches!(
            graph.validate(),
            Err(SerializationError::UnknownNode { missing, .. }) if missing == "b"
        ));
    }
}
