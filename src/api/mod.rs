//! Backend collaborator: project CRUD, goal path and knowledge queries.

mod client;
mod types;

pub use client::{ClientError, MindmapClient};
pub use types::{
	EdgeCreate, KnowledgeDepth, KnowledgeEntry, KnowledgeNode, NodeCreate, NodePatch, ProjectCreate,
	ProjectData, ProjectSummary, ReverseTree, TemplateSummary,
};
