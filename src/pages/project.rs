//! Editor page for one project. Owns the authoritative graph and all
//! view-local state, applies canvas intents optimistically and persists them.

use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;

use crate::api::{KnowledgeDepth, KnowledgeNode, MindmapClient};
use crate::components::mindmap::{
	CanvasIntent, CollapseState, Debouncer, MindmapCanvas, PersistOp, Session, admits_value, next_actions,
	progress, toggle_value,
};
use crate::config::MindmapConfig;

/// Handles shared by the page's async helpers. All fields are arena handles.
#[derive(Clone, Copy)]
struct Host {
	project_id: Memo<String>,
	session: RwSignal<Session>,
	template_id: RwSignal<String>,
	name: RwSignal<String>,
	error: RwSignal<Option<String>>,
	client: StoredValue<MindmapClient, LocalStorage>,
}

impl Host {
	/// Replace local state with the backend's. Also the rollback path after
	/// a failed persist. Responses that raced a local edit are dropped.
	fn refetch(self) {
		let project_id = self.project_id.get_untracked();
		if project_id.is_empty() {
			return;
		}
		let client = self.client.get_value();
		let ticket = self.session.with_untracked(Session::begin_fetch);
		spawn_local(async move {
			match client.get_project(&project_id).await {
				Ok(data) => {
					if self.project_id.get_untracked() != project_id {
						return;
					}
					let graph = data.graph();
					self.name.set(data.name);
					self.template_id.set(data.template_id);
					self.session.maybe_update(|s| s.accept_fetch(ticket, graph));
				}
				Err(e) => {
					log::error!("fetching project {project_id} failed: {e}");
					self.error.set(Some(format!("Could not load project: {e}")));
				}
			}
		});
	}

	fn persist(self, ops: Vec<PersistOp>) {
		if ops.is_empty() {
			return;
		}
		let project_id = self.project_id.get_untracked();
		let client = self.client.get_value();
		let refetch = ops.iter().any(PersistOp::needs_refetch);
		self.session.update(Session::save_started);
		spawn_local(async move {
			let saved = client.persist(&project_id, &ops).await;
			self.session.update(Session::save_finished);
			match saved {
				Ok(()) if refetch => self.refetch(),
				Ok(()) => {}
				Err(e) => {
					log::error!("saving changes failed: {e}");
					self.error.set(Some(format!("Saving failed: {e}")));
					self.refetch();
				}
			}
		});
	}

	fn apply(self, intent: CanvasIntent) {
		let ops = self.session.try_update(|s| s.apply(intent)).unwrap_or_default();
		self.persist(ops);
	}

	fn undo(self) {
		let project_id = self.project_id.get_untracked();
		let client = self.client.get_value();
		spawn_local(async move {
			if let Err(e) = client.undo(&project_id).await {
				log::warn!("undo failed: {e}");
				self.error.set(Some(format!("Nothing to undo: {e}")));
			}
			self.refetch();
		});
	}

	fn highlight_path(self, goal_id: String) {
		let template_id = self.template_id.get_untracked();
		let client = self.client.get_value();
		spawn_local(async move {
			match client.goal_path(&template_id, &goal_id).await {
				Ok(path) => self.session.update(|s| s.set_highlight(path)),
				Err(e) => {
					log::warn!("goal path for {goal_id} failed: {e}");
					self.error.set(Some(format!("Could not trace the path: {e}")));
				}
			}
		});
	}
}

fn depth_label(depth: KnowledgeDepth) -> &'static str {
	match depth {
		KnowledgeDepth::Overview => "Overview",
		KnowledgeDepth::Practical => "Practical",
		KnowledgeDepth::Expert => "Expert",
	}
}

/// Project editor: canvas plus side panel.
#[component]
pub fn ProjectPage() -> impl IntoView {
	let config = use_context::<MindmapConfig>().unwrap_or_default();
	let params = use_params_map();
	let host = Host {
		project_id: Memo::new(move |_| params.read().get("id").unwrap_or_default()),
		session: RwSignal::new(Session::default()),
		template_id: RwSignal::new(String::new()),
		name: RwSignal::new(String::new()),
		error: RwSignal::new(None),
		client: StoredValue::new_local(MindmapClient::new(config.base_url())),
	};
	let session = host.session;
	let knowledge = RwSignal::new(None::<KnowledgeNode>);
	let search = StoredValue::new(Debouncer::<String>::new());
	let search_timer = StoredValue::new(None::<TimeoutHandle>);

	// Initial load, and again whenever the route switches projects.
	Effect::new(move |_| {
		let _ = host.project_id.get();
		session.set(Session::default());
		host.refetch();
	});

	if config.poll_interval_ms > 0 {
		match set_interval_with_handle(
			move || host.refetch(),
			Duration::from_millis(config.poll_interval_ms),
		) {
			Ok(handle) => on_cleanup(move || handle.clear()),
			Err(e) => log::warn!("polling disabled: {e:?}"),
		}
	}

	let visible = Memo::new(move |_| session.with(|s| s.visible()));
	let selection = Memo::new(move |_| session.with(|s| s.selection.clone()));
	let highlight = Memo::new(move |_| session.with(|s| s.highlight.clone()));
	let collapsed = Memo::new(move |_| session.with(|s| s.collapsed.clone()));
	let selected_id = Memo::new(move |_| session.with(|s| s.selection.primary().map(str::to_string)));

	// Related knowledge for the selected node, once the selection settles.
	let search_delay = Duration::from_millis(config.search_debounce_ms);
	Effect::new(move |_| {
		let selected = selected_id.get();
		knowledge.set(None);
		if let Some(handle) = search_timer.try_update_value(Option::take).flatten() {
			handle.clear();
		}
		let Some(ticket) = search.try_update_value(|d| d.restart(selected.clone())) else {
			return;
		};
		if selected.is_none() {
			return;
		}
		let timer = set_timeout_with_handle(
			move || {
				let Some(node_id) = search.with_value(|d| d.fire(ticket)) else {
					return;
				};
				let client = host.client.get_value();
				spawn_local(async move {
					let result = client.knowledge(&node_id).await;
					if !search.with_value(|d| d.accepts(ticket, &node_id)) {
						log::debug!("discarding stale knowledge for {node_id}");
						return;
					}
					match result {
						Ok(found) => knowledge.set(Some(found)),
						Err(e) => log::warn!("knowledge lookup for {node_id} failed: {e}"),
					}
				});
			},
			search_delay,
		);
		match timer {
			Ok(handle) => search_timer.set_value(Some(handle)),
			Err(e) => log::warn!("could not schedule knowledge search: {e:?}"),
		}
	});

	let on_intent = Callback::new(move |intent: CanvasIntent| host.apply(intent));

	view! {
		<div class="mindmap-page">
			<header class="mindmap-header">
				<a href="/">"← Projects"</a>
				<h1>{move || host.name.get()}</h1>
				<button on:click=move |_| host.undo()>"Undo"</button>
			</header>
			{move || {
				host.error
					.get()
					.map(|message| {
						view! {
							<div class="error-banner">
								<span>{message}</span>
								<button on:click=move |_| host.error.set(None)>"Dismiss"</button>
							</div>
						}
					})
			}}
			<div class="mindmap-body">
				<div class="mindmap-stage">
					<MindmapCanvas
						visible=Signal::from(visible)
						selection=Signal::from(selection)
						highlight=Signal::from(highlight)
						collapsed=Signal::from(collapsed)
						on_intent=on_intent
					/>
				</div>
				<aside class="mindmap-panel">
					<ProgressPanel session=session />
					<FilterPanel session=session />
					<DetailPanel host=host knowledge=knowledge />
				</aside>
			</div>
		</div>
	}
}

#[component]
fn ProgressPanel(session: RwSignal<Session>) -> impl IntoView {
	let summary = Memo::new(move |_| session.with(|s| progress(&s.graph.nodes)));
	let actions = Memo::new(move |_| session.with(|s| next_actions(&s.graph.nodes, &s.graph.edges)));
	view! {
		<section class="progress">
			<h2>"Progress"</h2>
			<p>
				{move || {
					let p = summary.get();
					format!("{}% decided ({} of {}, {} in review)", p.percent, p.decided, p.total, p.in_review)
				}}
			</p>
			<h3>"Ready to start"</h3>
			<ul>
				{move || {
					actions
						.get()
						.into_iter()
						.map(|a| {
							let id = a.node_id.clone();
							view! {
								<li on:click=move |_| session.update(|s| s.selection.select_only(&id))>
									{a.label}
									<span class="meta">{format!(" {} · {}", a.phase, a.category)}</span>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</section>
	}
}

#[component]
fn FilterPanel(session: RwSignal<Session>) -> impl IntoView {
	let phases = Memo::new(move |_| session.with(|s| s.phases()));
	let categories = Memo::new(move |_| session.with(|s| s.categories()));

	let phase_boxes = move || {
		let all = phases.get();
		all.clone()
			.into_iter()
			.map(|value| {
				let all = all.clone();
				let checked_value = value.clone();
				let toggled = value.clone();
				view! {
					<label>
						<input
							type="checkbox"
							prop:checked=move || session.with(|s| admits_value(&s.filters.phases, &checked_value))
							on:change=move |_| session.update(|s| toggle_value(&mut s.filters.phases, &all, &toggled))
						/>
						{value}
					</label>
				}
			})
			.collect_view()
	};
	let category_boxes = move || {
		let all = categories.get();
		all.clone()
			.into_iter()
			.map(|value| {
				let all = all.clone();
				let checked_value = value.clone();
				let toggled = value.clone();
				view! {
					<label>
						<input
							type="checkbox"
							prop:checked=move || session.with(|s| admits_value(&s.filters.categories, &checked_value))
							on:change=move |_| session.update(|s| toggle_value(&mut s.filters.categories, &all, &toggled))
						/>
						{value}
					</label>
				}
			})
			.collect_view()
	};

	view! {
		<section class="filters">
			<h2>"Phases"</h2>
			{phase_boxes}
			<h2>"Categories"</h2>
			{category_boxes}
			<button on:click=move |_| session.update(|s| s.collapsed = CollapseState::default())>
				"Expand all"
			</button>
		</section>
	}
}

#[component]
fn DetailPanel(host: Host, knowledge: RwSignal<Option<KnowledgeNode>>) -> impl IntoView {
	let session = host.session;
	let selected = Memo::new(move |_| session.with(|s| s.selected_node().cloned()));
	let batch = Memo::new(move |_| session.with(|s| (s.selection.len() > 1).then(|| s.selection.ids().to_vec())));
	let highlighting = Memo::new(move |_| session.with(|s| !s.highlight.is_empty()));

	let batch_view = move || {
		batch.get().map(|ids| {
			let count = ids.len();
			view! {
				<section class="batch">
					<p>{format!("{count} nodes selected")}</p>
					<button on:click=move |_| host.apply(CanvasIntent::DeleteNodes(ids.clone()))>
						"Delete selected"
					</button>
					<button on:click=move |_| host.apply(CanvasIntent::Select { node_id: None, additive: false })>
						"Clear selection"
					</button>
				</section>
			}
		})
	};

	let node_view = move || {
		selected.get().map(|node| {
			let (status_id, path_id, collapse_id) = (node.id.clone(), node.id.clone(), node.id.clone());
			let list = |items: Vec<String>| {
				items
					.into_iter()
					.map(|item| view! { <li>{item}</li> })
					.collect_view()
			};
			view! {
				<section class="detail">
					<h2>{node.label.clone()}</h2>
					<p class="meta">{format!("{} · {}", node.phase, node.category)}</p>
					<p>{node.description.clone()}</p>
					<button on:click=move |_| {
						let ops = session.try_update(|s| s.cycle_status(&status_id)).unwrap_or_default();
						host.persist(ops);
					}>{format!("Status: {}", node.status.label())}</button>
					<button on:click=move |_| host.highlight_path(path_id.clone())>"Highlight path to here"</button>
					<button on:click=move |_| host.apply(CanvasIntent::ToggleCollapse(collapse_id.clone()))>
						"Collapse / expand"
					</button>
					<h3>"Checklist"</h3>
					<ul>{list(node.checklist.clone())}</ul>
					<h3>"Deliverables"</h3>
					<ul>{list(node.deliverables.clone())}</ul>
					<h3>"Stakeholders"</h3>
					<ul>{list(node.stakeholders.clone())}</ul>
				</section>
			}
		})
	};

	let knowledge_view = move || {
		knowledge.get().map(|found| {
			view! {
				<section class="knowledge">
					<h3>"Related knowledge"</h3>
					{found
						.entries
						.into_iter()
						.map(|entry| {
							view! {
								<article>
									<h4>{format!("[{}] {}", depth_label(entry.depth), entry.title)}</h4>
									<p>{entry.content}</p>
									<ul>
										{entry
											.references
											.into_iter()
											.map(|r| view! { <li>{r}</li> })
											.collect_view()}
									</ul>
								</article>
							}
						})
						.collect_view()}
				</section>
			}
		})
	};

	view! {
		<div class="detail-panel">
			<Show when=move || highlighting.get()>
				<button on:click=move |_| session.update(|s| s.clear_highlight())>"Clear highlight"</button>
			</Show>
			{batch_view}
			{node_view}
			{knowledge_view}
		</div>
	}
}
