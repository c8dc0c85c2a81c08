//! Project progress and "what can start now" summaries.

use std::collections::HashMap;

use super::types::{EdgeType, GraphEdge, GraphNode, NodeStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
	pub total: usize,
	pub decided: usize,
	pub in_review: usize,
	pub percent: u32,
}

pub fn progress(nodes: &[GraphNode]) -> Progress {
	let total = nodes.len();
	let count = |s: NodeStatus| nodes.iter().filter(|n| n.status == s).count();
	let decided = count(NodeStatus::Decided);
	let percent = if total == 0 {
		0
	} else {
		(decided as f64 / total as f64 * 100.0).round() as u32
	};
	Progress {
		total,
		decided,
		in_review: count(NodeStatus::InReview),
		percent,
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextAction {
	pub node_id: String,
	pub label: String,
	pub phase: String,
	pub category: String,
	pub dep_count: usize,
}

/// Nodes not yet started whose hard dependencies are all decided.
/// A hard dependency on a node that no longer exists blocks the node.
pub fn next_actions(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<NextAction> {
	let by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
	let mut deps: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in edges.iter().filter(|e| e.kind == EdgeType::Hard) {
		deps.entry(edge.target.as_str())
			.or_default()
			.push(edge.source.as_str());
	}

	nodes
		.iter()
		.filter(|n| n.status == NodeStatus::NotStarted)
		.filter_map(|n| {
			let required = deps.get(n.id.as_str()).map(Vec::as_slice).unwrap_or_default();
			let resolved = required.iter().all(|dep| {
				by_id
					.get(dep)
					.is_some_and(|d| d.status == NodeStatus::Decided)
			});
			resolved.then(|| NextAction {
				node_id: n.id.clone(),
				label: n.label.clone(),
				phase: n.phase.clone(),
				category: n.category.clone(),
				dep_count: required.len(),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, status: NodeStatus) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: id.into(),
			status,
			..Default::default()
		}
	}

	fn dep(source: &str, target: &str, kind: EdgeType) -> GraphEdge {
		GraphEdge {
			id: format!("{source}{target}"),
			source: source.into(),
			target: target.into(),
			kind,
			reason: String::new(),
		}
	}

	#[test]
	fn percent_rounds() {
		let nodes = vec![
			node("a", NodeStatus::Decided),
			node("b", NodeStatus::InReview),
			node("c", NodeStatus::NotStarted),
		];
		let p = progress(&nodes);
		assert_eq!(p, Progress { total: 3, decided: 1, in_review: 1, percent: 33 });
		assert_eq!(progress(&[]).percent, 0);
	}

	#[test]
	fn only_hard_dependencies_gate() {
		let nodes = vec![
			node("a", NodeStatus::Decided),
			node("b", NodeStatus::InReview),
			node("c", NodeStatus::NotStarted),
			node("d", NodeStatus::NotStarted),
			node("e", NodeStatus::NotStarted),
		];
		let edges = vec![
			dep("a", "c", EdgeType::Hard),
			dep("b", "c", EdgeType::Soft),
			dep("b", "d", EdgeType::Hard),
			dep("ghost", "e", EdgeType::Hard),
		];
		let actions = next_actions(&nodes, &edges);
		assert_eq!(actions.len(), 1);
		assert_eq!(actions[0].node_id, "c");
		assert_eq!(actions[0].dep_count, 1);
	}

	#[test]
	fn roots_are_ready() {
		let nodes = vec![node("a", NodeStatus::NotStarted)];
		let actions = next_actions(&nodes, &[]);
		assert_eq!(actions[0].dep_count, 0);
	}
}
