use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

use crate::api::{MindmapClient, ProjectCreate, ProjectSummary};
use crate::config::MindmapConfig;

/// Project list, with forking from a template and deletion.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<MindmapConfig>().unwrap_or_default();
	let client = StoredValue::new_local(MindmapClient::new(config.base_url()));
	let reload = RwSignal::new(0u32);
	let error = RwSignal::new(None::<String>);

	let projects = LocalResource::new(move || {
		reload.track();
		let client = client.get_value();
		async move { client.list_projects().await.map_err(|e| e.to_string()) }
	});
	let templates = LocalResource::new(move || {
		let client = client.get_value();
		async move { client.list_templates().await.map_err(|e| e.to_string()) }
	});

	let name = RwSignal::new(String::new());
	let template_id = RwSignal::new(String::new());
	let navigate = use_navigate();
	let on_create = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let req = ProjectCreate {
			name: name.get_untracked().trim().to_string(),
			template_id: template_id.get_untracked(),
		};
		if req.name.is_empty() || req.template_id.is_empty() {
			error.set(Some("Enter a name and pick a template.".into()));
			return;
		}
		let client = client.get_value();
		let navigate = navigate.clone();
		spawn_local(async move {
			match client.create_project(&req).await {
				Ok(id) => {
					log::info!("created project {id} from {}", req.template_id);
					navigate(&format!("/projects/{id}"), Default::default());
				}
				Err(e) => {
					log::error!("creating project failed: {e}");
					error.set(Some(format!("Could not create project: {e}")));
				}
			}
		});
	};

	let delete = move |project: ProjectSummary| {
		let confirmed = window()
			.confirm_with_message(&format!("Delete project \"{}\"?", project.name))
			.unwrap_or(false);
		if !confirmed {
			return;
		}
		let client = client.get_value();
		spawn_local(async move {
			match client.delete_project(&project.id).await {
				Ok(()) => reload.update(|n| *n += 1),
				Err(e) => {
					log::error!("deleting project {} failed: {e}", project.id);
					error.set(Some(format!("Could not delete project: {e}")));
				}
			}
		});
	};

	let template_options = move || {
		templates.get().map(|result| match result {
			Ok(list) => list
				.into_iter()
				.map(|t| {
					view! { <option value=t.id>{format!("{} {} ({} nodes)", t.icon, t.name, t.node_count)}</option> }
				})
				.collect_view()
				.into_any(),
			Err(e) => {
				log::warn!("template list failed: {e}");
				().into_any()
			}
		})
	};

	view! {
		<div class="project-list">
			<h1>"Projects"</h1>
			{move || {
				error
					.get()
					.map(|message| {
						view! {
							<div class="error-banner">
								<span>{message}</span>
								<button on:click=move |_| error.set(None)>"Dismiss"</button>
							</div>
						}
					})
			}}
			<form class="project-create" on:submit=on_create>
				<input
					type="text"
					placeholder="Project name"
					prop:value=move || name.get()
					on:input=move |ev| name.set(event_target_value(&ev))
				/>
				<select on:change=move |ev| template_id.set(event_target_value(&ev))>
					<option value="">"Choose a template"</option>
					{template_options}
				</select>
				<button type="submit">"Create"</button>
			</form>
			<Suspense fallback=|| view! { <p>"Loading projects…"</p> }>
				{move || {
					projects
						.get()
						.map(|result| match result {
							Ok(list) if list.is_empty() => {
								view! { <p>"No projects yet."</p> }.into_any()
							}
							Ok(list) => {
								view! {
									<ul>
										{list
											.into_iter()
											.map(|p| {
												let href = format!("/projects/{}", p.id);
												let meta = format!(" {} nodes · updated {}", p.node_count, p.updated_at);
												let label = p.name.clone();
												view! {
													<li>
														<a href=href>{label}</a>
														<span class="meta">{meta}</span>
														<button on:click=move |_| delete(p.clone())>"Delete"</button>
													</li>
												}
											})
											.collect_view()}
									</ul>
								}
									.into_any()
							}
							Err(e) => {
								log::error!("project list failed: {e}");
								view! { <p class="error">{format!("Could not load projects: {e}")}</p> }
									.into_any()
							}
						})
				}}
			</Suspense>
		</div>
	}
}
