//! Host-owned editor state: the authoritative graph plus view-local
//! collapse, selection, highlight and filter state.
//!
//! [`Session::apply`] performs the optimistic local update for a canvas
//! intent and returns the backend operations the host must run, in order.

use std::collections::BTreeSet;

use crate::api::{EdgeCreate, NodeCreate, NodePatch};

use super::reconcile::CanvasIntent;
use super::types::{GraphNode, Position, ProjectGraph};
use super::visibility::{CollapseState, Filters, VisibleGraph, resolve};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	ids: Vec<String>,
}

impl Selection {
	pub fn ids(&self) -> &[String] {
		&self.ids
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.ids.iter().any(|s| s == id)
	}

	/// The selected node when exactly one is selected.
	pub fn primary(&self) -> Option<&str> {
		match self.ids.as_slice() {
			[only] => Some(only.as_str()),
			_ => None,
		}
	}

	pub fn select_only(&mut self, id: &str) {
		self.ids.clear();
		self.ids.push(id.to_string());
	}

	pub fn toggle(&mut self, id: &str) {
		if let Some(i) = self.ids.iter().position(|s| s == id) {
			self.ids.remove(i);
		} else {
			self.ids.push(id.to_string());
		}
	}

	pub fn clear(&mut self) {
		self.ids.clear();
	}

	fn retain_existing(&mut self, graph: &ProjectGraph) {
		self.ids.retain(|id| graph.node(id).is_some());
	}
}

/// One backend call. Operations returned together run sequentially.
#[derive(Clone, Debug, PartialEq)]
pub enum PersistOp {
	UpdateNode { node_id: String, patch: NodePatch },
	/// Create a node, then link `link_from -> new node` once the id is known.
	CreateNode { payload: NodeCreate, link_from: Option<String> },
	DeleteNode(String),
	CreateEdge(EdgeCreate),
	DeleteEdge(String),
}

impl PersistOp {
	/// Operations whose outcome (new ids) only arrives with a re-fetch.
	pub fn needs_refetch(&self) -> bool {
		matches!(self, Self::CreateNode { .. } | Self::CreateEdge(_))
	}
}

/// Taken when a fetch is issued; see [`Session::accept_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
	revision: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
	pub graph: ProjectGraph,
	pub collapsed: CollapseState,
	pub selection: Selection,
	pub highlight: BTreeSet<String>,
	pub filters: Filters,
	/// Bumped by every optimistic mutation and every finished save.
	revision: u64,
	saving: usize,
}

impl Session {
	pub fn new(graph: ProjectGraph) -> Self {
		Self {
			graph,
			..Default::default()
		}
	}

	pub fn visible(&self) -> VisibleGraph {
		resolve(&self.graph, &self.collapsed, &self.filters)
	}

	/// Install freshly fetched authoritative data. Selection drops ids that
	/// disappeared; collapsed ids are kept since stale ones resolve to nothing.
	pub fn replace_graph(&mut self, graph: ProjectGraph) {
		self.graph = graph;
		self.selection.retain_existing(&self.graph);
	}

	pub fn begin_fetch(&self) -> FetchTicket {
		FetchTicket {
			revision: self.revision,
		}
	}

	/// Install a fetched graph unless local state moved on since `ticket`
	/// was taken or a save is still in flight. Returns whether it was applied.
	pub fn accept_fetch(&mut self, ticket: FetchTicket, graph: ProjectGraph) -> bool {
		if self.saving > 0 || ticket.revision != self.revision {
			log::debug!(
				"dropping stale fetch (revision {} vs {}, {} saves pending)",
				ticket.revision,
				self.revision,
				self.saving
			);
			return false;
		}
		self.replace_graph(graph);
		true
	}

	pub fn save_started(&mut self) {
		self.saving += 1;
	}

	/// A fetch issued while the save ran may or may not have seen it.
	pub fn save_finished(&mut self) {
		self.saving = self.saving.saturating_sub(1);
		self.revision += 1;
	}

	pub fn selected_node(&self) -> Option<&GraphNode> {
		self.selection.primary().and_then(|id| self.graph.node(id))
	}

	pub fn set_highlight(&mut self, path: impl IntoIterator<Item = String>) {
		self.highlight = path.into_iter().collect();
	}

	pub fn clear_highlight(&mut self) {
		self.highlight.clear();
	}

	/// Distinct phase values in first-seen order.
	pub fn phases(&self) -> Vec<String> {
		distinct(self.graph.nodes.iter().map(|n| n.phase.as_str()))
	}

	pub fn categories(&self) -> Vec<String> {
		distinct(self.graph.nodes.iter().map(|n| n.category.as_str()))
	}

	pub fn cycle_status(&mut self, node_id: &str) -> Vec<PersistOp> {
		let Some(node) = self.graph.node_mut(node_id) else {
			return Vec::new();
		};
		node.status = node.status.cycled();
		let status = node.status;
		self.revision += 1;
		vec![PersistOp::UpdateNode {
			node_id: node_id.to_string(),
			patch: NodePatch {
				status: Some(status),
				..Default::default()
			},
		}]
	}

	pub fn apply(&mut self, intent: CanvasIntent) -> Vec<PersistOp> {
		let ops = self.apply_locally(intent);
		if !ops.is_empty() {
			self.revision += 1;
		}
		ops
	}

	fn apply_locally(&mut self, intent: CanvasIntent) -> Vec<PersistOp> {
		match intent {
			CanvasIntent::Move { node_id, x, y } => {
				let Some(node) = self.graph.node_mut(&node_id) else {
					return Vec::new();
				};
				node.position = Position::new(x, y);
				vec![PersistOp::UpdateNode {
					node_id,
					patch: NodePatch {
						pos_x: Some(x),
						pos_y: Some(y),
						..Default::default()
					},
				}]
			}
			CanvasIntent::Relabel { node_id, label } => {
				let Some(node) = self.graph.node_mut(&node_id) else {
					return Vec::new();
				};
				if node.label == label {
					return Vec::new();
				}
				node.label = label.clone();
				vec![PersistOp::UpdateNode {
					node_id,
					patch: NodePatch {
						label: Some(label),
						..Default::default()
					},
				}]
			}
			CanvasIntent::Connect { source, target } => {
				let duplicate = self
					.graph
					.edges
					.iter()
					.any(|e| e.source == source && e.target == target);
				if duplicate || source == target {
					log::debug!("ignoring connect {source} -> {target}");
					return Vec::new();
				}
				vec![PersistOp::CreateEdge(EdgeCreate::new(source, target))]
			}
			CanvasIntent::CreateAt { label, x, y, source } => {
				let template = source
					.as_deref()
					.and_then(|s| self.graph.node(s))
					.or_else(|| self.graph.nodes.first());
				let (phase, category) = template
					.map(|n| (n.phase.clone(), n.category.clone()))
					.unwrap_or_default();
				vec![PersistOp::CreateNode {
					payload: NodeCreate {
						label,
						phase,
						category,
						pos_x: x,
						pos_y: y,
						..Default::default()
					},
					link_from: source,
				}]
			}
			CanvasIntent::DeleteNodes(ids) => {
				let doomed: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
				self.graph.nodes.retain(|n| !doomed.contains(n.id.as_str()));
				self.graph
					.edges
					.retain(|e| !doomed.contains(e.source.as_str()) && !doomed.contains(e.target.as_str()));
				self.selection.retain_existing(&self.graph);
				ids.into_iter().map(PersistOp::DeleteNode).collect()
			}
			CanvasIntent::DeleteEdges(ids) => {
				self.graph.edges.retain(|e| !ids.contains(&e.id));
				ids.into_iter().map(PersistOp::DeleteEdge).collect()
			}
			CanvasIntent::RetargetEdge { old, source, target } => {
				self.graph.edges.retain(|e| e.id != old.id);
				// not atomic: a failure between the two calls loses the edge
				vec![
					PersistOp::DeleteEdge(old.id.clone()),
					PersistOp::CreateEdge(EdgeCreate {
						source,
						target,
						kind: old.kind,
						reason: old.reason,
					}),
				]
			}
			CanvasIntent::ToggleCollapse(id) => {
				if !self.collapsed.toggle(&self.graph, &id) {
					log::debug!("{id} has no children to collapse");
				}
				Vec::new()
			}
			CanvasIntent::Select { node_id, additive } => {
				match (node_id, additive) {
					(None, _) => self.selection.clear(),
					(Some(id), true) => self.selection.toggle(&id),
					(Some(id), false) => self.selection.select_only(&id),
				}
				Vec::new()
			}
		}
	}
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
	let mut seen = BTreeSet::new();
	values
		.filter(|v| seen.insert(*v))
		.map(str::to_string)
		.collect()
}
