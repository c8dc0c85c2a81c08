use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::edit::{EditKey, LabelEditor};
use super::reconcile::{CanvasIntent, SceneInputs};
use super::render;
use super::session::Selection;
use super::state::{CanvasEvent, MindmapCanvasState, NODE_WIDTH};
use super::visibility::{CollapseState, VisibleGraph};
use crate::config::MindmapConfig;

type SharedState = Rc<RefCell<MindmapCanvasState>>;

/// Screen placement of the inline label editor.
#[derive(Clone, Copy, Debug, PartialEq)]
struct EditorBox {
	left: f64,
	top: f64,
	width: f64,
}

fn local_coords(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn fit_to_parent(canvas: &HtmlCanvasElement, state: &SharedState) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	state.borrow_mut().resize(w, h);
}

/// Canvas editor for a project graph.
///
/// Scene state is re-derived whenever one of the input signals changes; user
/// gestures come back out through `on_intent` and are never applied here.
#[component]
pub fn MindmapCanvas(
	#[prop(into)] visible: Signal<VisibleGraph>,
	#[prop(into)] selection: Signal<Selection>,
	#[prop(into)] highlight: Signal<BTreeSet<String>>,
	#[prop(into)] collapsed: Signal<CollapseState>,
	#[prop(into)] on_intent: Callback<CanvasIntent>,
) -> impl IntoView {
	let config = use_context::<MindmapConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(MindmapCanvasState::new(
		800.0,
		600.0,
		config.min_zoom,
		config.max_zoom,
	)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let editor = RwSignal::new(LabelEditor::default());
	let editor_box = RwSignal::new(None::<EditorBox>);

	// Reconcile on every change of the domain-derived inputs.
	let state_rec = state.clone();
	Effect::new(move |_| {
		let visible = visible.get();
		let selection = selection.get();
		let highlight = highlight.get();
		let collapsed = collapsed.get();
		state_rec.borrow_mut().scene.reconcile(
			&visible,
			SceneInputs {
				selection: &selection,
				highlight: &highlight,
				collapsed: &collapsed,
			},
		);
	});

	let (state_init, animate_init, resize_init) = (state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		fit_to_parent(&canvas, &state_init);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				log::error!("2d canvas context unavailable");
				return;
			}
		};

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			fit_to_parent(&canvas_resize, &state_resize);
		}));
		if let Some(ref cb) = *resize_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let editing = editor.with_untracked(|e| e.current().map(|c| c.node_id.clone()));
			render::render(&state_anim.borrow(), &ctx, editing.as_deref());
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
		log::info!("mindmap canvas mounted");
	});

	let dispatch = move |s: &MindmapCanvasState, events: Vec<CanvasEvent>| {
		for event in events {
			match event {
				CanvasEvent::Intent(intent) => {
					log::debug!("intent {intent:?}");
					on_intent.run(intent);
				}
				CanvasEvent::PromptLabel { x, y, source } => {
					let label = web_sys::window()
						.and_then(|w| w.prompt_with_message("Label for the new node").ok().flatten());
					if let Some(intent) = label
						.and_then(|label| s.scene.request_create_at(&label, x, y, source.as_deref()))
					{
						on_intent.run(intent);
					}
				}
				CanvasEvent::EditLabel { node_id, label } => {
					let Some(node) = s.scene.node(&node_id) else {
						continue;
					};
					let t = &s.transform;
					editor_box.set(Some(EditorBox {
						left: node.position.x * t.k + t.x,
						top: node.position.y * t.k + t.y,
						width: NODE_WIDTH * t.k,
					}));
					editor.update(|e| e.begin(&node_id, &label));
				}
			}
		}
	};

	let commit_edit = move || {
		editor_box.set(None);
		if let Some((node_id, label)) = editor.try_update(|e| e.commit()).flatten() {
			on_intent.run(CanvasIntent::Relabel { node_id, label });
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get() {
			let _ = canvas.focus();
		}
		let mut s = state_md.borrow_mut();
		let events = s.pointer_down(x, y, ev.shift_key());
		dispatch(&s, events);
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_coords(canvas_ref, &ev) {
			state_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_mu.borrow_mut();
		let events = s.pointer_up(x, y);
		dispatch(&s, events);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_ml.borrow_mut();
		let events = s.pointer_leave(x, y);
		dispatch(&s, events);
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_dc.borrow_mut();
		let events = s.double_click(x, y);
		dispatch(&s, events);
	};

	let state_cm = state.clone();
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_coords(canvas_ref, &ev) else {
			return;
		};
		let mut s = state_cm.borrow_mut();
		let events = s.context_menu(x, y);
		dispatch(&s, events);
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		let mut s = state_kd.borrow_mut();
		let events = s.key_down(&ev.key());
		dispatch(&s, events);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_coords(canvas_ref, &ev) {
			state_wh.borrow_mut().zoom(x, y, ev.delta_y());
		}
	};

	let label_editor = move || {
		let rect = editor_box.get()?;
		let draft = editor.with_untracked(|e| e.current().map(|c| c.draft.clone()))?;
		Some(view! {
			<textarea
				class="mindmap-label-editor"
				style=format!(
					"position: absolute; left: {}px; top: {}px; width: {}px;",
					rect.left,
					rect.top,
					rect.width,
				)
				prop:value=draft
				autofocus=true
				on:input=move |ev| editor.update(|e| e.update(&event_target_value(&ev)))
				on:keydown=move |ev: KeyboardEvent| match EditKey::classify(&ev.key(), ev.shift_key()) {
					EditKey::Commit => {
						ev.prevent_default();
						commit_edit();
					}
					EditKey::Cancel => {
						editor.update(|e| {
							e.cancel();
						});
						editor_box.set(None);
					}
					EditKey::Type => {}
				}
				on:blur=move |_| commit_edit()
			/>
		})
	};

	view! {
		<div class="mindmap-canvas" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				tabindex="0"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:contextmenu=on_contextmenu
				on:keydown=on_keydown
				on:wheel=on_wheel
				style="display: block; cursor: grab; outline: none;"
			/>
			{label_editor}
		</div>
	}
}
