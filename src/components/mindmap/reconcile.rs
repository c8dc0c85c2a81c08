//! Scene state for the mindmap canvas.
//!
//! The domain graph is the source of truth at rest. While a node is being
//! dragged, refreshes of that data keep every on-screen position so a poll
//! or an optimistic round trip cannot teleport the node under the pointer.

use std::collections::{BTreeSet, HashMap};

use super::session::Selection;
use super::types::{EdgeType, GraphEdge, NodeStatus, Position};
use super::visibility::{CollapseState, VisibleGraph};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Stable palette color for a phase name.
pub fn phase_color(phase: &str) -> &'static str {
	let h = phase
		.bytes()
		.fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
	COLORS[h % COLORS.len()]
}

/// Side effects the host performs on behalf of the canvas. The canvas never
/// waits on them and never rolls back when they fail.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasIntent {
	Move { node_id: String, x: f64, y: f64 },
	Relabel { node_id: String, label: String },
	Connect { source: String, target: String },
	CreateAt { label: String, x: f64, y: f64, source: Option<String> },
	DeleteNodes(Vec<String>),
	DeleteEdges(Vec<String>),
	/// Implemented by the host as delete-then-create.
	RetargetEdge { old: GraphEdge, source: String, target: String },
	ToggleCollapse(String),
	/// `None` clears the selection; `additive` toggles membership.
	Select { node_id: Option<String>, additive: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub label: String,
	pub phase: String,
	pub category: String,
	pub status: NodeStatus,
	pub position: Position,
	pub color: &'static str,
	/// The sole selected node (drives the detail panel).
	pub is_selected: bool,
	/// Member of a multi-selection.
	pub in_batch: bool,
	pub is_highlighted: bool,
	pub is_dimmed: bool,
	pub has_children: bool,
	pub is_collapsed: bool,
	pub hidden_descendants: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub edge: GraphEdge,
	pub kind: EdgeType,
}

/// View-local inputs that decorate the scene.
#[derive(Clone, Copy, Debug)]
pub struct SceneInputs<'a> {
	pub selection: &'a Selection,
	pub highlight: &'a BTreeSet<String>,
	pub collapsed: &'a CollapseState,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Debug, Default)]
pub struct Reconciler {
	nodes: Vec<SceneNode>,
	edges: Vec<SceneEdge>,
	index: HashMap<String, usize>,
	drag: DragState,
}

impl Reconciler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[SceneNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[SceneEdge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn edge(&self, id: &str) -> Option<&SceneEdge> {
		self.edges.iter().find(|e| e.edge.id == id)
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.active
	}

	/// Re-derive the scene from the latest visible graph.
	pub fn reconcile(&mut self, visible: &VisibleGraph, inputs: SceneInputs<'_>) {
		let highlighting = !inputs.highlight.is_empty();
		let primary = inputs.selection.primary();
		let batch = inputs.selection.len() > 1;

		let nodes: Vec<SceneNode> = visible
			.nodes
			.iter()
			.map(|n| {
				let position = match self.node(&n.id) {
					Some(on_screen) if self.drag.active => on_screen.position,
					_ => n.position,
				};
				let is_highlighted = !highlighting || inputs.highlight.contains(&n.id);
				SceneNode {
					id: n.id.clone(),
					label: n.label.clone(),
					phase: n.phase.clone(),
					category: n.category.clone(),
					status: n.status,
					position,
					color: phase_color(&n.phase),
					is_selected: primary == Some(n.id.as_str()),
					in_batch: batch && inputs.selection.contains(&n.id),
					is_highlighted,
					is_dimmed: !is_highlighted,
					has_children: visible.with_children.contains(&n.id),
					is_collapsed: inputs.collapsed.is_collapsed(&n.id),
					hidden_descendants: visible.hidden_descendants(&n.id),
				}
			})
			.collect();

		if self.drag.active {
			if let Some(id) = &self.drag.node_id {
				if !nodes.iter().any(|n| &n.id == id) {
					log::debug!("dragged node {id} vanished from the scene");
				}
			}
		}

		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		self.nodes = nodes;
		self.edges = visible
			.edges
			.iter()
			.map(|e| SceneEdge {
				edge: e.clone(),
				kind: e.kind,
			})
			.collect();
	}

	/// Idle -> Dragging. `(x, y)` is the pointer in graph coordinates.
	pub fn begin_drag(&mut self, node_id: &str, x: f64, y: f64) -> bool {
		let Some(node) = self.node(node_id) else {
			return false;
		};
		self.drag = DragState {
			active: true,
			node_id: Some(node_id.to_string()),
			start_x: x,
			start_y: y,
			node_start: node.position,
		};
		log::debug!("drag start {node_id}");
		true
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		let Some(pos) = self.drag_position(x, y) else {
			return;
		};
		if let Some(node) = self.dragged_mut() {
			node.position = pos;
		}
	}

	/// Dragging -> Idle. The pointer-reported position becomes the node's new
	/// position; a gesture that did not move anything emits no intent.
	pub fn end_drag(&mut self, x: f64, y: f64) -> Option<CanvasIntent> {
		if !self.drag.active {
			return None;
		}
		let pos = self.drag_position(x, y)?;
		let moved = pos != self.drag.node_start;
		let intent = match self.dragged_mut() {
			Some(node) => {
				node.position = pos;
				moved.then(|| CanvasIntent::Move {
					node_id: node.id.clone(),
					x: pos.x,
					y: pos.y,
				})
			}
			None => None,
		};
		self.drag = DragState::default();
		intent
	}

	/// Abort a drag and put the node back where it started.
	pub fn cancel_drag(&mut self) {
		if !self.drag.active {
			return;
		}
		let origin = self.drag.node_start;
		if let Some(node) = self.dragged_mut() {
			node.position = origin;
		}
		self.drag = DragState::default();
	}

	fn drag_position(&self, x: f64, y: f64) -> Option<Position> {
		self.drag.active.then(|| {
			Position::new(
				self.drag.node_start.x + (x - self.drag.start_x),
				self.drag.node_start.y + (y - self.drag.start_y),
			)
		})
	}

	fn dragged_mut(&mut self) -> Option<&mut SceneNode> {
		let id = self.drag.node_id.as_ref()?;
		let &i = self.index.get(id)?;
		self.nodes.get_mut(i)
	}

	pub fn request_relabel(&self, node_id: &str, text: &str) -> Option<CanvasIntent> {
		let label = text.trim();
		let node = self.node(node_id)?;
		if label.is_empty() || label == node.label {
			return None;
		}
		Some(CanvasIntent::Relabel {
			node_id: node_id.to_string(),
			label: label.to_string(),
		})
	}

	pub fn request_connect(&self, source: &str, target: &str) -> Option<CanvasIntent> {
		if source == target || self.node(source).is_none() || self.node(target).is_none() {
			return None;
		}
		Some(CanvasIntent::Connect {
			source: source.to_string(),
			target: target.to_string(),
		})
	}

	pub fn request_create_at(
		&self,
		label: &str,
		x: f64,
		y: f64,
		source: Option<&str>,
	) -> Option<CanvasIntent> {
		let label = label.trim();
		if label.is_empty() {
			return None;
		}
		Some(CanvasIntent::CreateAt {
			label: label.to_string(),
			x,
			y,
			source: source.filter(|s| self.node(s).is_some()).map(str::to_string),
		})
	}

	pub fn request_delete_nodes(&self, ids: &[String]) -> Option<CanvasIntent> {
		let ids: Vec<String> = ids.iter().filter(|id| self.node(id).is_some()).cloned().collect();
		(!ids.is_empty()).then_some(CanvasIntent::DeleteNodes(ids))
	}

	pub fn request_delete_edges(&self, ids: &[String]) -> Option<CanvasIntent> {
		let ids: Vec<String> = ids.iter().filter(|id| self.edge(id).is_some()).cloned().collect();
		(!ids.is_empty()).then_some(CanvasIntent::DeleteEdges(ids))
	}

	pub fn request_edge_retarget(
		&self,
		edge_id: &str,
		source: &str,
		target: &str,
	) -> Option<CanvasIntent> {
		let old = &self.edge(edge_id)?.edge;
		if (old.source == source && old.target == target) || source == target {
			return None;
		}
		self.node(source)?;
		self.node(target)?;
		Some(CanvasIntent::RetargetEdge {
			old: old.clone(),
			source: source.to_string(),
			target: target.to_string(),
		})
	}

	pub fn toggle_collapse(&self, node_id: &str) -> Option<CanvasIntent> {
		self.node(node_id)
			.filter(|n| n.has_children)
			.map(|n| CanvasIntent::ToggleCollapse(n.id.clone()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mindmap::types::{GraphNode, ProjectGraph};
	use crate::components::mindmap::visibility::{Filters, resolve};

	struct Fixture {
		graph: ProjectGraph,
		selection: Selection,
		highlight: BTreeSet<String>,
		collapsed: CollapseState,
	}

	impl Fixture {
		fn new() -> Self {
			let node = |id: &str, x: f64| GraphNode {
				id: id.into(),
				label: format!("Task {id}"),
				phase: "plan".into(),
				category: "structure".into(),
				position: Position::new(x, 0.0),
				..Default::default()
			};
			Self {
				graph: ProjectGraph {
					nodes: vec![node("a", 0.0), node("b", 100.0)],
					edges: vec![GraphEdge {
						id: "e1".into(),
						source: "a".into(),
						target: "b".into(),
						..Default::default()
					}],
				},
				selection: Selection::default(),
				highlight: BTreeSet::new(),
				collapsed: CollapseState::default(),
			}
		}

		fn sync(&self, r: &mut Reconciler) {
			let visible = resolve(&self.graph, &self.collapsed, &Filters::default());
			r.reconcile(
				&visible,
				SceneInputs {
					selection: &self.selection,
					highlight: &self.highlight,
					collapsed: &self.collapsed,
				},
			);
		}
	}

	#[test]
	fn refresh_mid_drag_keeps_on_screen_position() {
		let mut fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);

		assert!(r.begin_drag("a", 5.0, 5.0));
		r.drag_to(55.0, 25.0);
		assert_eq!(r.node("a").unwrap().position, Position::new(50.0, 20.0));

		// background refresh still carries the stored position, plus a new label
		fx.graph.nodes[0].label = "Renamed".into();
		fx.sync(&mut r);
		let a = r.node("a").unwrap();
		assert_eq!(a.position, Position::new(50.0, 20.0));
		assert_eq!(a.label, "Renamed");

		let intent = r.end_drag(65.0, 25.0);
		assert_eq!(
			intent,
			Some(CanvasIntent::Move { node_id: "a".into(), x: 60.0, y: 20.0 })
		);
		assert!(!r.is_dragging());

		// host accepts the move; the next pass takes the domain position
		fx.graph.nodes[0].position = Position::new(60.0, 20.0);
		fx.sync(&mut r);
		assert_eq!(r.node("a").unwrap().position, Position::new(60.0, 20.0));
	}

	#[test]
	fn at_rest_domain_data_wins() {
		let mut fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		fx.graph.nodes[1].position = Position::new(300.0, 40.0);
		fx.graph.nodes[1].status = NodeStatus::Decided;
		fx.sync(&mut r);
		let b = r.node("b").unwrap();
		assert_eq!(b.position, Position::new(300.0, 40.0));
		assert_eq!(b.status, NodeStatus::Decided);
	}

	#[test]
	fn rejected_move_jumps_back() {
		let fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		r.begin_drag("b", 100.0, 0.0);
		assert!(r.end_drag(140.0, 0.0).is_some());
		// host never applied the move
		fx.sync(&mut r);
		assert_eq!(r.node("b").unwrap().position, Position::new(100.0, 0.0));
	}

	#[test]
	fn click_without_motion_emits_nothing() {
		let fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		r.begin_drag("a", 1.0, 1.0);
		assert_eq!(r.end_drag(1.0, 1.0), None);
	}

	#[test]
	fn cancel_restores_origin() {
		let fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		r.begin_drag("a", 0.0, 0.0);
		r.drag_to(80.0, 80.0);
		r.cancel_drag();
		assert!(!r.is_dragging());
		assert_eq!(r.node("a").unwrap().position, Position::new(0.0, 0.0));
		assert_eq!(r.end_drag(10.0, 10.0), None);
	}

	#[test]
	fn highlight_is_opt_in() {
		let mut fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		assert!(r.nodes().iter().all(|n| n.is_highlighted && !n.is_dimmed));

		fx.highlight.insert("b".into());
		fx.highlight.insert("ghost".into());
		fx.sync(&mut r);
		assert!(r.node("a").unwrap().is_dimmed);
		assert!(r.node("b").unwrap().is_highlighted);
	}

	#[test]
	fn selection_and_collapse_flags() {
		let mut fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.selection.select_only("a");
		fx.sync(&mut r);
		assert!(r.node("a").unwrap().is_selected);
		assert!(r.node("a").unwrap().has_children);
		assert!(!r.node("b").unwrap().has_children);

		assert_eq!(r.toggle_collapse("b"), None);
		assert_eq!(r.toggle_collapse("a"), Some(CanvasIntent::ToggleCollapse("a".into())));

		fx.selection.toggle("b");
		fx.collapsed.toggle(&fx.graph, "a");
		fx.sync(&mut r);
		let a = r.node("a").unwrap();
		assert!(!a.is_selected);
		assert!(a.in_batch);
		assert!(a.is_collapsed);
		assert_eq!(a.hidden_descendants, 1);
		assert!(r.node("b").is_none());
	}

	#[test]
	fn relabel_ignores_unchanged_text() {
		let fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		assert_eq!(r.request_relabel("a", "  Task a "), None);
		assert_eq!(r.request_relabel("a", "   "), None);
		assert_eq!(
			r.request_relabel("a", " Foundations "),
			Some(CanvasIntent::Relabel { node_id: "a".into(), label: "Foundations".into() })
		);
	}

	#[test]
	fn connect_and_retarget_validation() {
		let mut fx = Fixture::new();
		fx.graph.nodes.push(GraphNode { id: "c".into(), phase: "plan".into(), ..Default::default() });
		let mut r = Reconciler::new();
		fx.sync(&mut r);

		assert_eq!(r.request_connect("a", "a"), None);
		assert_eq!(r.request_connect("a", "zzz"), None);
		assert!(r.request_connect("b", "c").is_some());

		assert_eq!(r.request_edge_retarget("e1", "a", "b"), None);
		match r.request_edge_retarget("e1", "a", "c") {
			Some(CanvasIntent::RetargetEdge { old, source, target }) => {
				assert_eq!(old.id, "e1");
				assert_eq!((source.as_str(), target.as_str()), ("a", "c"));
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn create_and_delete_requests() {
		let fx = Fixture::new();
		let mut r = Reconciler::new();
		fx.sync(&mut r);
		assert_eq!(r.request_create_at("  ", 0.0, 0.0, None), None);
		assert_eq!(
			r.request_create_at("Permit", 10.0, 20.0, Some("a")),
			Some(CanvasIntent::CreateAt { label: "Permit".into(), x: 10.0, y: 20.0, source: Some("a".into()) })
		);
		assert_eq!(r.request_delete_nodes(&["ghost".into()]), None);
		assert_eq!(
			r.request_delete_edges(&["e1".into(), "nope".into()]),
			Some(CanvasIntent::DeleteEdges(vec!["e1".into()]))
		);
	}
}
