use super::reconcile::{CanvasIntent, Reconciler, SceneEdge, SceneNode};
use super::types::Position;

pub const NODE_WIDTH: f64 = 160.0;
pub const NODE_HEIGHT: f64 = 56.0;
pub const HANDLE_RADIUS: f64 = 7.0;
pub const BADGE_RADIUS: f64 = 10.0;
/// How close (world units) the pointer must be to grab an edge.
pub const EDGE_HIT: f64 = 6.0;
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEnd {
	Source,
	Target,
}

/// What lies under the pointer, in priority order.
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
	Badge(String),
	Handle(String),
	EdgeEnd(String, EdgeEnd),
	Node(String),
	Edge(String),
	Empty,
}

/// A pointer gesture other than node dragging, which the reconciler owns.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	NodePress { node_id: String, additive: bool, start: Position },
	Connecting { source: String, cursor: Position },
	Retargeting { edge_id: String, end: EdgeEnd, cursor: Position },
	Panning,
}

/// Something the host has to act on after a pointer or key event.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
	Intent(CanvasIntent),
	/// Ask the user for a label, then create a node at `(x, y)`.
	PromptLabel { x: f64, y: f64, source: Option<String> },
	EditLabel { node_id: String, label: String },
}

pub fn output_handle(node: &SceneNode) -> Position {
	Position::new(node.position.x + NODE_WIDTH, node.position.y + NODE_HEIGHT / 2.0)
}

pub fn input_anchor(node: &SceneNode) -> Position {
	Position::new(node.position.x, node.position.y + NODE_HEIGHT / 2.0)
}

pub fn collapse_badge(node: &SceneNode) -> Position {
	Position::new(node.position.x + NODE_WIDTH, node.position.y + NODE_HEIGHT)
}

fn distance(a: Position, b: Position) -> f64 {
	((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	if len2 < f64::EPSILON {
		return distance(p, a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
	distance(p, Position::new(a.x + t * dx, a.y + t * dy))
}

pub struct MindmapCanvasState {
	pub scene: Reconciler,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub gesture: Gesture,
	pub hover: Option<String>,
	pub selected_edge: Option<String>,
	pub width: f64,
	pub height: f64,
	min_zoom: f64,
	max_zoom: f64,
}

impl MindmapCanvasState {
	pub fn new(width: f64, height: f64, min_zoom: f64, max_zoom: f64) -> Self {
		Self {
			scene: Reconciler::new(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			gesture: Gesture::Idle,
			hover: None,
			selected_edge: None,
			width,
			height,
			min_zoom,
			max_zoom,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Edge endpoints as drawn, `None` when an end is off-scene.
	pub fn edge_ends(&self, edge: &SceneEdge) -> Option<(Position, Position)> {
		let source = self.scene.node(&edge.edge.source)?;
		let target = self.scene.node(&edge.edge.target)?;
		Some((output_handle(source), input_anchor(target)))
	}

	pub fn hit_test(&self, sx: f64, sy: f64) -> Hit {
		let p = self.screen_to_graph(sx, sy);
		// later nodes are drawn on top
		for node in self.scene.nodes().iter().rev() {
			if node.has_children && distance(p, collapse_badge(node)) <= BADGE_RADIUS {
				return Hit::Badge(node.id.clone());
			}
			if distance(p, output_handle(node)) <= HANDLE_RADIUS {
				return Hit::Handle(node.id.clone());
			}
		}
		// endpoints only grab once the edge is selected; otherwise a press on
		// a card's input anchor is a plain node press
		let selected = self
			.selected_edge
			.as_deref()
			.and_then(|id| self.scene.edge(id))
			.and_then(|edge| Some((edge, self.edge_ends(edge)?)));
		if let Some((edge, (a, b))) = selected {
			if distance(p, b) <= HANDLE_RADIUS {
				return Hit::EdgeEnd(edge.edge.id.clone(), EdgeEnd::Target);
			}
			if distance(p, a) <= HANDLE_RADIUS {
				return Hit::EdgeEnd(edge.edge.id.clone(), EdgeEnd::Source);
			}
		}
		for node in self.scene.nodes().iter().rev() {
			let pos = node.position;
			if p.x >= pos.x && p.x <= pos.x + NODE_WIDTH && p.y >= pos.y && p.y <= pos.y + NODE_HEIGHT {
				return Hit::Node(node.id.clone());
			}
		}
		for edge in self.scene.edges() {
			if let Some((a, b)) = self.edge_ends(edge) {
				if distance_to_segment(p, a, b) <= EDGE_HIT {
					return Hit::Edge(edge.edge.id.clone());
				}
			}
		}
		Hit::Empty
	}

	fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.screen_to_graph(sx, sy);
		self.scene
			.nodes()
			.iter()
			.rev()
			.find(|n| {
				p.x >= n.position.x
					&& p.x <= n.position.x + NODE_WIDTH
					&& p.y >= n.position.y
					&& p.y <= n.position.y + NODE_HEIGHT
			})
			.map(|n| n.id.clone())
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64, shift: bool) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		match self.hit_test(sx, sy) {
			Hit::Badge(id) => {
				return self.scene.toggle_collapse(&id).map(CanvasEvent::Intent).into_iter().collect();
			}
			Hit::Handle(id) => {
				self.gesture = Gesture::Connecting { source: id, cursor: p };
			}
			Hit::EdgeEnd(edge_id, end) => {
				self.selected_edge = Some(edge_id.clone());
				self.gesture = Gesture::Retargeting { edge_id, end, cursor: p };
			}
			Hit::Node(id) => {
				self.selected_edge = None;
				self.scene.begin_drag(&id, p.x, p.y);
				self.gesture = Gesture::NodePress { node_id: id, additive: shift, start: Position::new(sx, sy) };
			}
			Hit::Edge(id) => {
				self.selected_edge = Some(id);
			}
			Hit::Empty => {
				self.pan = PanState {
					active: true,
					moved: false,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
				self.gesture = Gesture::Panning;
			}
		}
		Vec::new()
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.gesture == Gesture::Idle {
			self.hover = self.node_at(sx, sy);
			return;
		}
		let p = self.screen_to_graph(sx, sy);
		match &mut self.gesture {
			Gesture::NodePress { .. } => self.scene.drag_to(p.x, p.y),
			Gesture::Connecting { cursor, .. } | Gesture::Retargeting { cursor, .. } => *cursor = p,
			Gesture::Panning => {
				self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
				self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
				self.pan.moved |= (sx - self.pan.start_x).abs() + (sy - self.pan.start_y).abs() > CLICK_SLOP;
			}
			Gesture::Idle => {}
		}
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		let gesture = std::mem::take(&mut self.gesture);
		let intent = match gesture {
			Gesture::Idle => None,
			Gesture::NodePress { node_id, additive, start } => {
				let clicked = (sx - start.x).abs() + (sy - start.y).abs() <= CLICK_SLOP;
				if clicked {
					self.scene.cancel_drag();
					Some(CanvasIntent::Select { node_id: Some(node_id), additive })
				} else {
					self.scene.end_drag(p.x, p.y)
				}
			}
			Gesture::Connecting { source, .. } => match self.node_at(sx, sy) {
				Some(target) => self.scene.request_connect(&source, &target),
				None => {
					return vec![CanvasEvent::PromptLabel { x: p.x, y: p.y, source: Some(source) }];
				}
			},
			Gesture::Retargeting { edge_id, end, .. } => {
				let dropped = self.node_at(sx, sy);
				let edge = self.scene.edge(&edge_id).map(|e| e.edge.clone());
				match (dropped, edge) {
					(Some(node), Some(edge)) => match end {
						EdgeEnd::Target => self.scene.request_edge_retarget(&edge_id, &edge.source, &node),
						EdgeEnd::Source => self.scene.request_edge_retarget(&edge_id, &node, &edge.target),
					},
					_ => None,
				}
			}
			Gesture::Panning => {
				let moved = self.pan.moved;
				self.pan = PanState::default();
				if moved {
					None
				} else {
					self.selected_edge = None;
					Some(CanvasIntent::Select { node_id: None, additive: false })
				}
			}
		};
		intent.map(CanvasEvent::Intent).into_iter().collect()
	}

	/// Pointer left the canvas: a drag ends where the pointer left, other
	/// gestures are dropped.
	pub fn pointer_leave(&mut self, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let events = match self.gesture {
			Gesture::NodePress { .. } => self.pointer_up(sx, sy),
			_ => Vec::new(),
		};
		self.gesture = Gesture::Idle;
		self.pan = PanState::default();
		self.hover = None;
		events
	}

	pub fn double_click(&mut self, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		match self.node_at(sx, sy).and_then(|id| self.scene.node(&id).cloned()) {
			Some(node) => vec![CanvasEvent::EditLabel { node_id: node.id, label: node.label }],
			None => vec![CanvasEvent::PromptLabel { x: p.x, y: p.y, source: None }],
		}
	}

	pub fn context_menu(&mut self, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let intent = match self.hit_test(sx, sy) {
			Hit::Node(id) | Hit::Handle(id) | Hit::Badge(id) => self.scene.request_delete_nodes(&[id]),
			Hit::Edge(id) | Hit::EdgeEnd(id, _) => self.scene.request_delete_edges(&[id]),
			Hit::Empty => None,
		};
		intent.map(CanvasEvent::Intent).into_iter().collect()
	}

	pub fn key_down(&mut self, key: &str) -> Vec<CanvasEvent> {
		match key {
			"Delete" | "Backspace" => {
				let intent = match self.selected_edge.take() {
					Some(edge) => self.scene.request_delete_edges(&[edge]),
					None => {
						let ids: Vec<String> = self
							.scene
							.nodes()
							.iter()
							.filter(|n| n.is_selected || n.in_batch)
							.map(|n| n.id.clone())
							.collect();
						self.scene.request_delete_nodes(&ids)
					}
				};
				intent.map(CanvasEvent::Intent).into_iter().collect()
			}
			"Escape" => {
				self.scene.cancel_drag();
				self.gesture = Gesture::Idle;
				self.selected_edge = None;
				Vec::new()
			}
			_ => Vec::new(),
		}
	}

	/// Zoom about the pointer.
	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
