use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::reconcile::SceneNode;
use super::state::{
	BADGE_RADIUS, EdgeEnd, Gesture, HANDLE_RADIUS, MindmapCanvasState, NODE_HEIGHT, NODE_WIDTH, collapse_badge,
	input_anchor, output_handle,
};
use super::types::{EdgeType, NodeStatus, Position};

fn status_color(status: NodeStatus) -> &'static str {
	match status {
		NodeStatus::NotStarted => "#6b7280",
		NodeStatus::InReview => "#f59e0b",
		NodeStatus::Decided => "#10b981",
	}
}

pub fn render(state: &MindmapCanvasState, ctx: &CanvasRenderingContext2d, editing: Option<&str>) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_gesture(state, ctx);
	for node in state.scene.nodes() {
		draw_node(state, ctx, node, editing == Some(node.id.as_str()));
	}
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: &[f64]) {
	let pattern = js_sys::Array::new();
	for d in dash {
		pattern.push(&JsValue::from_f64(*d));
	}
	let _ = ctx.set_line_dash(&pattern);
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, from: Position, to: Position, size: f64, color: &str) {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let (back_x, back_y) = (to.x - ux * size, to.y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	set_dash(ctx, &[]);
	ctx.set_fill_style_str(color);
	ctx.begin_path();
	ctx.move_to(to.x, to.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_edges(state: &MindmapCanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for edge in state.scene.edges() {
		let Some((a, b)) = state.edge_ends(edge) else {
			continue;
		};
		let dimmed = [&edge.edge.source, &edge.edge.target]
			.iter()
			.any(|id| state.scene.node(id).is_some_and(|n| n.is_dimmed));
		let selected = state.selected_edge.as_ref() == Some(&edge.edge.id);

		let (width, dash) = match edge.kind {
			EdgeType::Hard => (2.0, &[] as &[f64]),
			EdgeType::Soft => (1.5, &[8.0, 4.0] as &[f64]),
			EdgeType::Info => (1.0, &[2.0, 4.0] as &[f64]),
		};
		let alpha = if dimmed { 0.15 } else { 0.8 };
		let color = if selected {
			format!("rgba(255, 255, 255, {})", alpha)
		} else {
			format!("rgba(100, 180, 255, {})", alpha)
		};

		ctx.set_stroke_style_str(&color);
		let width = if selected { width * 1.6 } else { width };
		ctx.set_line_width(width / k.max(0.5));
		set_dash(ctx, dash);
		// horizontal S-curve between the two anchors
		let bend = ((b.x - a.x).abs() / 2.0).max(40.0);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.bezier_curve_to(a.x + bend, a.y, b.x - bend, b.y, b.x, b.y);
		ctx.stroke();
		draw_arrow(ctx, Position::new(b.x - bend, b.y), b, 8.0, &color);
	}
	set_dash(ctx, &[]);
}

fn draw_gesture(state: &MindmapCanvasState, ctx: &CanvasRenderingContext2d) {
	let (from, to) = match &state.gesture {
		Gesture::Connecting { source, cursor } => match state.scene.node(source) {
			Some(node) => (output_handle(node), *cursor),
			None => return,
		},
		Gesture::Retargeting { edge_id, end, cursor } => {
			let Some((a, b)) = state.scene.edge(edge_id).and_then(|e| state.edge_ends(e)) else {
				return;
			};
			match end {
				EdgeEnd::Target => (a, *cursor),
				EdgeEnd::Source => (*cursor, b),
			}
		}
		_ => return,
	};
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
	ctx.set_line_width(1.5);
	set_dash(ctx, &[6.0, 4.0]);
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(to.x, to.y);
	ctx.stroke();
	set_dash(ctx, &[]);
}

fn draw_node(
	state: &MindmapCanvasState,
	ctx: &CanvasRenderingContext2d,
	node: &SceneNode,
	editing: bool,
) {
	let Position { x, y } = node.position;
	let hovered = state.hover.as_deref() == Some(node.id.as_str());

	ctx.set_global_alpha(if node.is_dimmed { 0.3 } else { 1.0 });

	ctx.set_fill_style_str("#24243e");
	ctx.fill_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
	// phase band and status stripe
	ctx.set_fill_style_str(node.color);
	ctx.fill_rect(x, y, NODE_WIDTH, 4.0);
	ctx.set_fill_style_str(status_color(node.status));
	ctx.fill_rect(x, y + 4.0, 4.0, NODE_HEIGHT - 4.0);

	let outline = if node.is_selected {
		Some(("white", 2.5))
	} else if node.in_batch {
		Some(("#93c5fd", 2.0))
	} else if hovered {
		Some(("rgba(255, 255, 255, 0.5)", 1.0))
	} else {
		None
	};
	if let Some((color, width)) = outline {
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		ctx.stroke_rect(x, y, NODE_WIDTH, NODE_HEIGHT);
	}

	if !editing {
		ctx.set_fill_style_str("white");
		ctx.set_font("13px sans-serif");
		let _ = ctx.fill_text_with_max_width(&node.label, x + 12.0, y + 26.0, NODE_WIDTH - 20.0);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.55)");
		ctx.set_font("10px sans-serif");
		let _ = ctx.fill_text_with_max_width(
			&format!("{} · {}", node.phase, node.category),
			x + 12.0,
			y + 44.0,
			NODE_WIDTH - 20.0,
		);
	}

	let handle = output_handle(node);
	ctx.begin_path();
	let _ = ctx.arc(handle.x, handle.y, HANDLE_RADIUS * 0.6, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(100, 180, 255, 0.9)");
	ctx.fill();

	let anchor = input_anchor(node);
	ctx.begin_path();
	let _ = ctx.arc(anchor.x, anchor.y, 3.0, 0.0, 2.0 * PI);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.4)");
	ctx.fill();

	if node.has_children {
		let badge = collapse_badge(node);
		ctx.begin_path();
		let _ = ctx.arc(badge.x, badge.y, BADGE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(if node.is_collapsed { "#f59e0b" } else { "#374151" });
		ctx.fill();
		let text = if node.is_collapsed {
			format!("+{}", node.hidden_descendants)
		} else {
			"−".to_string()
		};
		ctx.set_fill_style_str("white");
		ctx.set_font("10px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&text, badge.x, badge.y + 3.5);
		ctx.set_text_align("start");
	}

	ctx.set_global_alpha(1.0);
}
