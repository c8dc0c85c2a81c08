use std::collections::BTreeSet;

use mindmap_canvas::components::mindmap::*;
use speculate2::speculate;

fn node(id: &str, phase: &str, category: &str, x: f64, y: f64) -> GraphNode {
	GraphNode {
		id: id.to_string(),
		label: id.to_uppercase(),
		phase: phase.to_string(),
		category: category.to_string(),
		position: Position::new(x, y),
		..Default::default()
	}
}

fn edge(source: &str, target: &str) -> GraphEdge {
	GraphEdge {
		id: format!("{source}-{target}"),
		source: source.to_string(),
		target: target.to_string(),
		..Default::default()
	}
}

fn visible_ids(visible: &VisibleGraph) -> Vec<&str> {
	visible.nodes.iter().map(|n| n.id.as_str()).collect()
}

/// Push the session's current view into the scene, the way the canvas does
/// on every change.
fn sync(scene: &mut Reconciler, session: &Session) {
	scene.reconcile(
		&session.visible(),
		SceneInputs {
			selection: &session.selection,
			highlight: &session.highlight,
			collapsed: &session.collapsed,
		},
	);
}

speculate! {
	before {
		let mut session = Session::new(ProjectGraph {
			nodes: vec![
				node("a", "plan", "structure", 0.0, 0.0),
				node("b", "plan", "mep", 200.0, 0.0),
				node("c", "design", "structure", 400.0, 0.0),
				node("d", "design", "mep", 0.0, 200.0),
			],
			edges: vec![edge("a", "b"), edge("b", "c"), edge("d", "c")],
		});
		let mut scene = Reconciler::new();
		sync(&mut scene, &session);
	}

	describe "collapse" {
		it "hides the subtree and reports how much is folded" {
			session.apply(CanvasIntent::ToggleCollapse("a".into()));
			let visible = session.visible();

			assert_eq!(visible_ids(&visible), vec!["a", "d"]);
			assert_eq!(visible.hidden_descendants("a"), 2);
			assert!(visible.edges.is_empty());
		}

		it "expanding restores the full graph" {
			session.apply(CanvasIntent::ToggleCollapse("a".into()));
			session.apply(CanvasIntent::ToggleCollapse("a".into()));

			assert_eq!(session.visible().nodes.len(), 4);
			assert!(session.collapsed.ids().is_empty());
		}

		it "ignores leaves" {
			let ops = session.apply(CanvasIntent::ToggleCollapse("c".into()));

			assert!(ops.is_empty());
			assert!(!session.collapsed.is_collapsed("c"));
		}

		it "survives deleting the collapsed node" {
			session.apply(CanvasIntent::ToggleCollapse("b".into()));
			session.apply(CanvasIntent::DeleteNodes(vec!["b".into()]));

			assert_eq!(visible_ids(&session.visible()), vec!["a", "c", "d"]);
		}

		it "shows the badge on the collapsed card" {
			session.apply(CanvasIntent::ToggleCollapse("b".into()));
			sync(&mut scene, &session);

			let b = scene.node("b").unwrap();
			assert!(b.is_collapsed);
			assert!(b.has_children);
			assert_eq!(b.hidden_descendants, 1);
		}
	}

	describe "filters" {
		it "drop nodes and every edge touching them" {
			let phases = session.phases();
			toggle_value(&mut session.filters.phases, &phases, "design");
			let visible = session.visible();

			assert_eq!(visible_ids(&visible), vec!["a", "b"]);
			assert_eq!(visible.edges.len(), 1);
			for e in &visible.edges {
				assert!(visible.nodes.iter().any(|n| n.id == e.source));
				assert!(visible.nodes.iter().any(|n| n.id == e.target));
			}
		}

		it "combine phase and category" {
			let phases = session.phases();
			let categories = session.categories();
			toggle_value(&mut session.filters.phases, &phases, "plan");
			toggle_value(&mut session.filters.categories, &categories, "structure");

			assert_eq!(visible_ids(&session.visible()), vec!["d"]);
		}

		it "re-allowing every value clears the filter" {
			let phases = session.phases();
			toggle_value(&mut session.filters.phases, &phases, "plan");
			toggle_value(&mut session.filters.phases, &phases, "plan");

			assert_eq!(session.filters.phases, None);
		}
	}

	describe "dragging" {
		it "keeps the dragged card under the pointer across a refresh" {
			assert!(scene.begin_drag("a", 10.0, 10.0));
			scene.drag_to(60.0, 40.0);

			// a poll lands mid-drag with the stale stored position
			sync(&mut scene, &session);
			assert_eq!(scene.node("a").unwrap().position, Position::new(50.0, 30.0));

			let intent = scene.end_drag(60.0, 40.0).unwrap();
			let ops = session.apply(intent);
			assert_eq!(ops.len(), 1);
			assert_eq!(session.graph.node("a").unwrap().position, Position::new(50.0, 30.0));

			sync(&mut scene, &session);
			assert_eq!(scene.node("a").unwrap().position, Position::new(50.0, 30.0));
		}

		it "a refresh that raced the drop does not snap the card back" {
			let before_drop = session.graph.clone();
			let ticket = session.begin_fetch();
			scene.begin_drag("a", 0.0, 0.0);
			scene.drag_to(50.0, 0.0);
			let intent = scene.end_drag(50.0, 0.0).unwrap();
			session.apply(intent);

			assert!(!session.accept_fetch(ticket, before_drop));
			sync(&mut scene, &session);
			assert_eq!(scene.node("a").unwrap().position, Position::new(50.0, 0.0));
		}

		it "a press without motion moves nothing" {
			scene.begin_drag("b", 5.0, 5.0);

			assert_eq!(scene.end_drag(5.0, 5.0), None);
			assert_eq!(scene.node("b").unwrap().position, Position::new(200.0, 0.0));
		}
	}

	describe "selection" {
		it "single selection drives the primary id" {
			session.apply(CanvasIntent::Select { node_id: Some("c".into()), additive: false });
			sync(&mut scene, &session);

			assert_eq!(session.selection.primary(), Some("c"));
			assert!(scene.node("c").unwrap().is_selected);
		}

		it "additive selection builds a batch" {
			session.apply(CanvasIntent::Select { node_id: Some("a".into()), additive: false });
			session.apply(CanvasIntent::Select { node_id: Some("d".into()), additive: true });
			sync(&mut scene, &session);

			assert_eq!(session.selection.len(), 2);
			assert_eq!(session.selection.primary(), None);
			assert!(scene.node("a").unwrap().in_batch);
			assert!(scene.node("d").unwrap().in_batch);
		}

		it "batch delete removes nodes and their edges" {
			let ops = session.apply(CanvasIntent::DeleteNodes(vec!["b".into(), "d".into()]));

			assert_eq!(ops.len(), 2);
			assert!(session.graph.edges.is_empty());
		}

		it "a refresh drops selected ids that are gone" {
			session.apply(CanvasIntent::Select { node_id: Some("c".into()), additive: false });
			let mut graph = session.graph.clone();
			graph.nodes.retain(|n| n.id != "c");
			session.replace_graph(graph);

			assert!(session.selection.is_empty());
		}
	}

	describe "highlight" {
		it "dims everything off the path" {
			session.set_highlight(["a".to_string(), "b".to_string()]);
			sync(&mut scene, &session);

			assert!(scene.node("a").unwrap().is_highlighted);
			assert!(scene.node("c").unwrap().is_dimmed);
		}

		it "clearing it restores every card" {
			session.set_highlight(["a".to_string()]);
			session.clear_highlight();
			sync(&mut scene, &session);

			assert!(scene.nodes().iter().all(|n| !n.is_dimmed));
		}
	}

	describe "editing" {
		it "connect persists a new edge without touching local edges" {
			let intent = scene.request_connect("a", "d").unwrap();
			let ops = session.apply(intent);

			assert!(matches!(ops.as_slice(), [PersistOp::CreateEdge(e)] if e.source == "a" && e.target == "d"));
			assert!(ops[0].needs_refetch());
			assert_eq!(session.graph.edges.len(), 3);
		}

		it "duplicate connections are dropped" {
			assert!(session.apply(CanvasIntent::Connect { source: "a".into(), target: "b".into() }).is_empty());
		}

		it "relabel goes through the editor and the scene" {
			let mut editor = LabelEditor::default();
			editor.begin("c", "C");
			editor.update("  Structure review ");
			let (node_id, text) = editor.commit().unwrap();
			let intent = scene.request_relabel(&node_id, &text).unwrap();
			session.apply(intent);

			assert_eq!(session.graph.node("c").unwrap().label, "Structure review");
		}

		it "retarget deletes then recreates the edge" {
			let old = session.graph.edges[0].clone();
			let intent = scene.request_edge_retarget(&old.id, "a", "c").unwrap();
			let ops = session.apply(intent);

			assert!(matches!(ops[0], PersistOp::DeleteEdge(ref id) if *id == old.id));
			assert!(matches!(ops[1], PersistOp::CreateEdge(ref e) if e.target == "c"));
		}
	}

	describe "progress" {
		it "counts decided nodes and unblocked work" {
			session.graph.node_mut("a").unwrap().status = NodeStatus::Decided;
			let p = progress(&session.graph.nodes);
			let ready: BTreeSet<String> = next_actions(&session.graph.nodes, &session.graph.edges)
				.into_iter()
				.map(|a| a.node_id)
				.collect();

			assert_eq!(p.decided, 1);
			assert_eq!(p.percent, 25);
			assert!(ready.contains("d"));
			assert!(!ready.contains("c"));
		}
	}
}
