//! The world driving the graph pipeline at each step.

pub use self::graph_world::GraphWorld;

mod graph_world;
