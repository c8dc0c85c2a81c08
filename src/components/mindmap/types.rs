use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Review status of a task node. On the wire the backend only knows its
/// localized spelling; the English names are accepted on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
	#[default]
	#[serde(rename = "未着手", alias = "not_started")]
	NotStarted,
	#[serde(rename = "検討中", alias = "in_review", alias = "in_progress")]
	InReview,
	#[serde(rename = "決定済み", alias = "decided", alias = "completed")]
	Decided,
}

impl NodeStatus {
	/// Status reached by one click on the status toggle.
	pub fn cycled(self) -> Self {
		match self {
			Self::NotStarted => Self::InReview,
			Self::InReview => Self::Decided,
			Self::Decided => Self::NotStarted,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::NotStarted => "Not started",
			Self::InReview => "In review",
			Self::Decided => "Decided",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
	/// Required dependency.
	#[default]
	Hard,
	/// Suggested ordering.
	Soft,
	/// Annotation only.
	Info,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(default)]
	pub description: String,
	pub phase: String,
	pub category: String,
	#[serde(default)]
	pub checklist: Vec<String>,
	#[serde(default)]
	pub deliverables: Vec<String>,
	#[serde(default, alias = "key_stakeholders")]
	pub stakeholders: Vec<String>,
	#[serde(default)]
	pub position: Position,
	#[serde(default)]
	pub status: NodeStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	#[serde(default)]
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(default, rename = "type")]
	pub kind: EdgeType,
	#[serde(default)]
	pub reason: String,
}

/// The authoritative node/edge set of one project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl ProjectGraph {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// True if `id` is the source of any edge, regardless of filtering.
	pub fn has_outgoing(&self, id: &str) -> bool {
		self.edges.iter().any(|e| e.source == id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_accepts_localized_spelling() {
		let s: NodeStatus = serde_json::from_str("\"決定済み\"").unwrap();
		assert_eq!(s, NodeStatus::Decided);
		let s: NodeStatus = serde_json::from_str("\"in_review\"").unwrap();
		assert_eq!(s, NodeStatus::InReview);
		let s: NodeStatus = serde_json::from_str("\"completed\"").unwrap();
		assert_eq!(s, NodeStatus::Decided);
	}

	#[test]
	fn status_is_written_in_backend_spelling() {
		assert_eq!(serde_json::to_string(&NodeStatus::NotStarted).unwrap(), "\"未着手\"");
		assert_eq!(serde_json::to_string(&NodeStatus::InReview).unwrap(), "\"検討中\"");
		assert_eq!(serde_json::to_string(&NodeStatus::Decided).unwrap(), "\"決定済み\"");
	}

	#[test]
	fn status_cycle_wraps() {
		assert_eq!(NodeStatus::Decided.cycled(), NodeStatus::NotStarted);
		assert_eq!(NodeStatus::NotStarted.cycled().cycled(), NodeStatus::Decided);
	}

	#[test]
	fn backend_node_payload_decodes() {
		let json = r#"{
			"id": "n1", "label": "Survey", "phase": "basic_plan", "category": "structure",
			"key_stakeholders": ["owner"], "position": {"x": 10, "y": 20},
			"status": "検討中", "is_custom": false
		}"#;
		let node: GraphNode = serde_json::from_str(json).unwrap();
		assert_eq!(node.stakeholders, vec!["owner".to_string()]);
		assert_eq!(node.position, Position::new(10.0, 20.0));
		assert_eq!(node.status, NodeStatus::InReview);

		let edge: GraphEdge =
			serde_json::from_str(r#"{"source":"a","target":"b","type":"soft"}"#).unwrap();
		assert_eq!(edge.kind, EdgeType::Soft);
		assert!(edge.reason.is_empty());
	}
}
