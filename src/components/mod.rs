//! Reusable view components.

pub mod mindmap;
