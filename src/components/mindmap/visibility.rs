//! Which nodes and edges of a project graph are on screen, given the
//! collapsed set and the phase/category filters.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::types::{GraphEdge, GraphNode, ProjectGraph};

/// Node ids the user has folded. Descendants of a collapsed node are hidden.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseState {
	ids: BTreeSet<String>,
}

impl CollapseState {
	pub fn ids(&self) -> &BTreeSet<String> {
		&self.ids
	}

	pub fn is_collapsed(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	/// Flip the collapsed flag of `id`. A node without outgoing edges cannot
	/// be collapsed; expanding always works so stale ids can be cleared.
	/// Returns whether the set changed.
	pub fn toggle(&mut self, graph: &ProjectGraph, id: &str) -> bool {
		if self.ids.remove(id) {
			return true;
		}
		if !graph.has_outgoing(id) {
			return false;
		}
		self.ids.insert(id.to_string())
	}
}

/// Allowed values for one categorical attribute. `None` lets everything
/// through; `Some(set)` only the listed values.
pub type ValueFilter = Option<BTreeSet<String>>;

/// Flip `value` in `filter`, where `all` is the full vocabulary. Allowing
/// every value collapses back to `None`.
pub fn toggle_value(filter: &mut ValueFilter, all: &[String], value: &str) {
	let mut set = filter
		.take()
		.unwrap_or_else(|| all.iter().cloned().collect());
	if !set.remove(value) {
		set.insert(value.to_string());
	}
	let everything = all.iter().all(|v| set.contains(v));
	*filter = (!everything).then_some(set);
}

pub fn admits_value(filter: &ValueFilter, value: &str) -> bool {
	filter.as_ref().is_none_or(|set| set.contains(value))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters {
	pub phases: ValueFilter,
	pub categories: ValueFilter,
}

impl Filters {
	fn admits(&self, node: &GraphNode) -> bool {
		admits_value(&self.phases, &node.phase) && admits_value(&self.categories, &node.category)
	}
}

/// Output of [`resolve`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleGraph {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
	/// For each collapsed id: number of nodes reachable from it, itself excluded.
	pub descendant_counts: BTreeMap<String, usize>,
	/// Ids that are the source of some edge in the full graph.
	pub with_children: BTreeSet<String>,
}

impl VisibleGraph {
	pub fn hidden_descendants(&self, id: &str) -> usize {
		self.descendant_counts.get(id).copied().unwrap_or(0)
	}
}

fn adjacency(edges: &[GraphEdge]) -> HashMap<&str, Vec<&str>> {
	let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in edges {
		forward
			.entry(edge.source.as_str())
			.or_default()
			.push(edge.target.as_str());
	}
	forward
}

/// Every node reachable from `root`, `root` excluded unless a cycle leads
/// back to it.
fn descendants<'a>(forward: &HashMap<&'a str, Vec<&'a str>>, root: &'a str) -> HashSet<&'a str> {
	let mut seen = HashSet::new();
	let mut queue = VecDeque::from([root]);
	while let Some(current) = queue.pop_front() {
		let Some(targets) = forward.get(current) else {
			continue;
		};
		for &target in targets {
			if seen.insert(target) {
				queue.push_back(target);
			}
		}
	}
	seen
}

/// Compute the visible subgraph.
///
/// Collapse hides the union of every collapsed node's reachable set over the
/// full edge list. A node that is also reachable through an uncollapsed
/// parent stays hidden: collapse means "fold this subtree", not "hide what
/// is only reachable through here".
///
/// Edges pointing at unknown nodes and collapsed ids that no longer exist
/// are tolerated and simply drop out.
pub fn resolve(graph: &ProjectGraph, collapsed: &CollapseState, filters: &Filters) -> VisibleGraph {
	let forward = adjacency(&graph.edges);
	let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

	let mut hidden: HashSet<&str> = HashSet::new();
	let mut descendant_counts = BTreeMap::new();
	for id in collapsed.ids() {
		let reached = descendants(&forward, id.as_str());
		let count = reached
			.iter()
			.filter(|d| **d != id.as_str() && known.contains(**d))
			.count();
		descendant_counts.insert(id.clone(), count);
		// a collapsed node on a cycle would otherwise hide itself
		hidden.extend(reached.into_iter().filter(|d| *d != id.as_str()));
	}

	let nodes: Vec<GraphNode> = graph
		.nodes
		.iter()
		.filter(|n| filters.admits(n) && !hidden.contains(n.id.as_str()))
		.cloned()
		.collect();
	let visible_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let edges = graph
		.edges
		.iter()
		.filter(|e| {
			let ok = visible_ids.contains(e.source.as_str()) && visible_ids.contains(e.target.as_str());
			if !ok && !(known.contains(e.source.as_str()) && known.contains(e.target.as_str())) {
				log::warn!("edge {} references a missing node", e.id);
			}
			ok
		})
		.cloned()
		.collect();

	let with_children = graph
		.edges
		.iter()
		.filter(|e| known.contains(e.source.as_str()))
		.map(|e| e.source.clone())
		.collect();

	VisibleGraph {
		nodes,
		edges,
		descendant_counts,
		with_children,
	}
}
