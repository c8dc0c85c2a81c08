//! Wire payloads of the mindmap backend.

use serde::{Deserialize, Serialize};

use crate::components::mindmap::{EdgeType, GraphEdge, GraphNode, NodeStatus, ProjectGraph};

/// Partial node update. Only the fields that are set go over the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phase: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<NodeStatus>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pos_x: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pos_y: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub checklist: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeCreate {
	pub label: String,
	pub description: String,
	pub phase: String,
	pub category: String,
	pub pos_x: f64,
	pub pos_y: f64,
	pub checklist: Vec<String>,
	pub deliverables: Vec<String>,
	pub key_stakeholders: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeCreate {
	pub source: String,
	pub target: String,
	#[serde(rename = "type")]
	pub kind: EdgeType,
	pub reason: String,
}

impl EdgeCreate {
	/// A required dependency without a stated reason.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind: EdgeType::Hard,
			reason: String::new(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedId {
	pub id: String,
}

/// Entry of the template catalogue a project can be forked from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TemplateSummary {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub icon: String,
	#[serde(default)]
	pub node_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectCreate {
	pub name: String,
	pub template_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub template_id: String,
	#[serde(default)]
	pub updated_at: String,
	#[serde(default)]
	pub node_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub template_id: String,
	#[serde(default)]
	pub created_at: String,
	#[serde(default)]
	pub updated_at: String,
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl ProjectData {
	pub fn graph(&self) -> ProjectGraph {
		ProjectGraph {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}
}

/// Predecessors of a goal node, `path_order` topologically sorted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReverseTree {
	pub goal_node_id: String,
	#[serde(default)]
	pub path_order: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeDepth {
	Overview,
	Practical,
	Expert,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
	pub depth: KnowledgeDepth,
	pub title: String,
	pub content: String,
	#[serde(default)]
	pub references: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
	pub node_id: String,
	#[serde(default)]
	pub entries: Vec<KnowledgeEntry>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn patch_serializes_only_set_fields() {
		let patch = NodePatch {
			pos_x: Some(1.5),
			pos_y: Some(-2.0),
			..Default::default()
		};
		assert_eq!(
			serde_json::to_value(&patch).unwrap(),
			serde_json::json!({"pos_x": 1.5, "pos_y": -2.0})
		);
	}

	#[test]
	fn status_patch_uses_backend_spelling() {
		let patch = NodePatch {
			status: Some(NodeStatus::InReview),
			..Default::default()
		};
		assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"status":"検討中"}"#);
	}

	#[test]
	fn edge_create_wire_shape() {
		assert_eq!(
			serde_json::to_value(EdgeCreate::new("a", "b")).unwrap(),
			serde_json::json!({"source": "a", "target": "b", "type": "hard", "reason": ""})
		);
	}

	#[test]
	fn template_catalogue_decodes_with_defaults() {
		let json = r#"[
			{"id": "office", "name": "Office building", "description": "Mid-rise", "icon": "🏢",
			 "tags": ["office"], "version": "2.0", "source": "default", "node_count": 42, "edge_count": 60},
			{"id": "blank", "name": "Blank"}
		]"#;
		let templates: Vec<TemplateSummary> = serde_json::from_str(json).unwrap();
		assert_eq!(templates[0].node_count, 42);
		assert_eq!(templates[0].icon, "🏢");
		assert_eq!(templates[1].description, "");
	}

	#[test]
	fn project_create_wire_shape() {
		let req = ProjectCreate {
			name: "Tower A".into(),
			template_id: "office".into(),
		};
		assert_eq!(
			serde_json::to_value(&req).unwrap(),
			serde_json::json!({"name": "Tower A", "template_id": "office"})
		);
		let created: CreatedId =
			serde_json::from_str(r#"{"id":"p1","name":"Tower A","template_id":"office","message":"ok"}"#).unwrap();
		assert_eq!(created.id, "p1");
	}

	#[test]
	fn reverse_tree_ignores_extra_fields() {
		let json = r#"{"goal_node_id":"g","nodes":[],"edges":[],"path_order":["a","b","g"]}"#;
		let tree: ReverseTree = serde_json::from_str(json).unwrap();
		assert_eq!(tree.path_order, vec!["a", "b", "g"]);
	}
}
