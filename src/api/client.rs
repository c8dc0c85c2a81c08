//! HTTP client for the mindmap backend.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::*;
use crate::components::mindmap::PersistOp;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Unauthorized")]
	Unauthorized,

	#[error("Server error: {0}")]
	Server(String),
}

/// Client for one backend base URL.
#[derive(Debug, Clone)]
pub struct MindmapClient {
	base_url: String,
	client: Client,
}

impl MindmapClient {
	/// `base_url` must be absolute, without a trailing slash.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client: Client::new(),
		}
	}

	fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
		self.client.request(method, format!("{}{}", self.base_url, path))
	}

	async fn error_for(response: reqwest::Response) -> ClientError {
		let status = response.status();
		let body = response.text().await.unwrap_or_default();
		match status {
			StatusCode::NOT_FOUND => ClientError::NotFound(body),
			StatusCode::BAD_REQUEST => ClientError::BadRequest(body),
			StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
			_ => ClientError::Server(format!("{}: {}", status, body)),
		}
	}

	async fn handle_response<T: DeserializeOwned>(
		response: reqwest::Response,
	) -> Result<T, ClientError> {
		if response.status().is_success() {
			Ok(response.json().await?)
		} else {
			Err(Self::error_for(response).await)
		}
	}

	async fn handle_empty_response(response: reqwest::Response) -> Result<(), ClientError> {
		if response.status().is_success() {
			Ok(())
		} else {
			Err(Self::error_for(response).await)
		}
	}

	// ============================================================
	// Projects
	// ============================================================

	pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError> {
		let response = self.request(reqwest::Method::GET, "/projects").send().await?;
		Self::handle_response(response).await
	}

	pub async fn get_project(&self, project_id: &str) -> Result<ProjectData, ClientError> {
		let response = self
			.request(reqwest::Method::GET, &format!("/projects/{}", project_id))
			.send()
			.await?;
		Self::handle_response(response).await
	}

	/// Fork a project from a template. Returns the new project's id.
	pub async fn create_project(&self, req: &ProjectCreate) -> Result<String, ClientError> {
		let response = self
			.request(reqwest::Method::POST, "/projects")
			.json(req)
			.send()
			.await?;
		let created: CreatedId = Self::handle_response(response).await?;
		Ok(created.id)
	}

	pub async fn delete_project(&self, project_id: &str) -> Result<(), ClientError> {
		let response = self
			.request(reqwest::Method::DELETE, &format!("/projects/{}", project_id))
			.send()
			.await?;
		Self::handle_empty_response(response).await
	}

	/// Revert the last persisted mutation of a project.
	pub async fn undo(&self, project_id: &str) -> Result<(), ClientError> {
		let response = self
			.request(reqwest::Method::POST, &format!("/projects/{}/undo", project_id))
			.send()
			.await?;
		Self::handle_empty_response(response).await
	}

	// ============================================================
	// Templates
	// ============================================================

	pub async fn list_templates(&self) -> Result<Vec<TemplateSummary>, ClientError> {
		let response = self.request(reqwest::Method::GET, "/templates").send().await?;
		Self::handle_response(response).await
	}

	// ============================================================
	// Nodes
	// ============================================================

	pub async fn update_node(
		&self,
		project_id: &str,
		node_id: &str,
		patch: &NodePatch,
	) -> Result<(), ClientError> {
		let response = self
			.request(
				reqwest::Method::PUT,
				&format!("/projects/{}/nodes/{}", project_id, node_id),
			)
			.json(patch)
			.send()
			.await?;
		Self::handle_empty_response(response).await
	}

	/// Returns the id assigned by the backend.
	pub async fn create_node(
		&self,
		project_id: &str,
		node: &NodeCreate,
	) -> Result<String, ClientError> {
		let response = self
			.request(reqwest::Method::POST, &format!("/projects/{}/nodes", project_id))
			.json(node)
			.send()
			.await?;
		let created: CreatedId = Self::handle_response(response).await?;
		Ok(created.id)
	}

	/// The backend removes edges touching the node.
	pub async fn delete_node(&self, project_id: &str, node_id: &str) -> Result<(), ClientError> {
		let response = self
			.request(
				reqwest::Method::DELETE,
				&format!("/projects/{}/nodes/{}", project_id, node_id),
			)
			.send()
			.await?;
		Self::handle_empty_response(response).await
	}

	// ============================================================
	// Edges
	// ============================================================

	pub async fn create_edge(
		&self,
		project_id: &str,
		edge: &EdgeCreate,
	) -> Result<String, ClientError> {
		let response = self
			.request(reqwest::Method::POST, &format!("/projects/{}/edges", project_id))
			.json(edge)
			.send()
			.await?;
		let created: CreatedId = Self::handle_response(response).await?;
		Ok(created.id)
	}

	pub async fn delete_edge(&self, project_id: &str, edge_id: &str) -> Result<(), ClientError> {
		let response = self
			.request(
				reqwest::Method::DELETE,
				&format!("/projects/{}/edges/{}", project_id, edge_id),
			)
			.send()
			.await?;
		Self::handle_empty_response(response).await
	}

	// ============================================================
	// Queries
	// ============================================================

	/// Dependency path leading to `goal_id`, in topological order.
	pub async fn goal_path(&self, template_id: &str, goal_id: &str) -> Result<Vec<String>, ClientError> {
		let response = self
			.request(
				reqwest::Method::GET,
				&format!("/tree/{}/{}", template_id, goal_id),
			)
			.send()
			.await?;
		let tree: ReverseTree = Self::handle_response(response).await?;
		Ok(tree.path_order)
	}

	pub async fn knowledge(&self, node_id: &str) -> Result<KnowledgeNode, ClientError> {
		let response = self
			.request(reqwest::Method::GET, &format!("/knowledge/{}", node_id))
			.send()
			.await?;
		match Self::handle_response::<KnowledgeNode>(response).await {
			Err(ClientError::NotFound(_)) => Ok(KnowledgeNode {
				node_id: node_id.to_string(),
				entries: Vec::new(),
			}),
			other => other,
		}
	}

	/// Run a batch of operations in order, stopping at the first failure.
	pub async fn persist(&self, project_id: &str, ops: &[PersistOp]) -> Result<(), ClientError> {
		for op in ops {
			log::debug!("persist {op:?}");
			match op {
				PersistOp::UpdateNode { node_id, patch } => {
					self.update_node(project_id, node_id, patch).await?
				}
				PersistOp::CreateNode { payload, link_from } => {
					let id = self.create_node(project_id, payload).await?;
					if let Some(source) = link_from {
						self.create_edge(project_id, &EdgeCreate::new(source.clone(), id))
							.await?;
					}
				}
				PersistOp::DeleteNode(id) => self.delete_node(project_id, id).await?,
				PersistOp::CreateEdge(edge) => {
					self.create_edge(project_id, edge).await?;
				}
				PersistOp::DeleteEdge(id) => self.delete_edge(project_id, id).await?,
			}
		}
		Ok(())
	}
}
