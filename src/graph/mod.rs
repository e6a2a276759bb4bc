//! The constraint graph, its islands, and the coloring of its constraints.

pub use self::activation::SleepState;
pub use self::coloring::ConstraintColor;
pub use self::constraint_graph::{
    ConstraintGraph, EdgeIndex, GraphEdge, GraphError, GraphNode, NodeFlags, NodeIndex,
};
pub use self::contact_graph::ContactGraph;
pub use self::island::Island;

mod activation;
mod coloring;
mod constraint_graph;
mod contact_graph;
mod island;
