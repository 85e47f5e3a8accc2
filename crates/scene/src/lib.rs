//! Scene Graph: a small tree of transform nodes.
//!
//! The hierarchy is fixed for a session: root → lights, root → board →
//! model. Nodes are never removed.
//!
//! # Invariants
//! - Node ids are stable indices; a node's parent always precedes it.
//! - The model is attached at most once, under a single board node.

pub mod graph;

pub use graph::{Light, Node, NodeId, NodeKind, SceneError, SceneGraph};
