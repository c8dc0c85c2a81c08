mod component;
mod edit;
mod progress;
mod reconcile;
mod render;
mod search;
mod session;
mod state;
mod types;
mod visibility;

pub use component::MindmapCanvas;
pub use edit::{EditKey, LabelEditor};
pub use progress::{NextAction, Progress, next_actions, progress};
pub use reconcile::{CanvasIntent, Reconciler, SceneEdge, SceneInputs, SceneNode, phase_color};
pub use search::{Debouncer, Ticket};
pub use session::{FetchTicket, PersistOp, Selection, Session};
pub use state::{CanvasEvent, Hit, MindmapCanvasState};
pub use types::{EdgeType, GraphEdge, GraphNode, NodeStatus, Position, ProjectGraph};
pub use visibility::{CollapseState, Filters, ValueFilter, VisibleGraph, admits_value, resolve, toggle_value};
