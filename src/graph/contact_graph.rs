use std::collections::VecDeque;

use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex as VertexIndex};
use petgraph::Direction;

use crate::graph::{ConstraintGraph, EdgeIndex, NodeIndex};
use crate::object::{BodyHandle, ConstraintHandle, ContainerId};
use crate::solver::LevelingMode;

const UNREACHED: usize = usize::MAX;

/// Assigns a level to each constraint of an island.
///
/// Constraints with a lower level are solved before those with a higher level.
#[derive(Clone, Debug, Default)]
pub struct ContactGraph {
    levels: Vec<Option<(EdgeIndex, usize)>>,
    distances: Vec<usize>,
    local_ids: Vec<usize>,
    edges: Vec<EdgeIndex>,
    queue: VecDeque<NodeIndex>,
}

impl ContactGraph {
    /// Creates an empty contact graph.
    pub fn new() -> Self {
        ContactGraph::default()
    }

    /// The level computed for `edge`, or `None` if `edge` was not leveled since it was added to
    /// the graph.
    #[inline]
    pub fn level(&self, edge: EdgeIndex) -> Option<usize> {
        match self.levels.get(edge.slot()) {
            Some(Some((leveled, level))) if *leveled == edge => Some(*level),
            _ => None,
        }
    }

    /// Levels the constraints of `container` that belong to `island`, and returns the largest
    /// level found.
    pub fn compute_levels<Handle: BodyHandle, C: ConstraintHandle>(
        &mut self,
        graph: &ConstraintGraph<Handle, C>,
        island: usize,
        container: ContainerId,
        mode: LevelingMode,
    ) -> usize {
        if self.levels.len() < graph.edge_capacity() {
            self.levels.resize(graph.edge_capacity(), None);
        }

        if self.distances.len() < graph.node_capacity() {
            self.distances.resize(graph.node_capacity(), UNREACHED);
            self.local_ids.resize(graph.node_capacity(), 0);
        }

        self.edges.clear();
        self.edges.extend(
            graph
                .island(island)
                .edges()
                .iter()
                .copied()
                .filter(|e| graph.edges[e.0].container == container),
        );

        match mode {
            LevelingMode::Disabled => {
                for edge in &self.edges {
                    self.levels[edge.slot()] = Some((*edge, 0));
                }

                0
            }
            LevelingMode::AnchorDistance => self.compute_anchor_levels(graph, island, container),
            LevelingMode::DirectedGraph => self.compute_directed_levels(graph),
        }
    }

    fn compute_anchor_levels<Handle: BodyHandle, C: ConstraintHandle>(
        &mut self,
        graph: &ConstraintGraph<Handle, C>,
        island: usize,
        container: ContainerId,
    ) -> usize {
        for edge in &self.edges {
            for node in graph.edges[edge.0].nodes.iter().flatten() {
                self.distances[node.slot()] = UNREACHED;
            }
        }

        self.queue.clear();

        for edge in &self.edges {
            for node in graph.edges[edge.0].nodes.iter().flatten() {
                if !graph.nodes[node.0].is_dynamic() && self.distances[node.slot()] != 0 {
                    self.distances[node.slot()] = 0;
                    self.queue.push_back(*node);
                }
            }
        }

        // Bodies held by a single-body constraint are one step away from an implicit anchor.
        for edge in &self.edges {
            if let [Some(node), None] | [None, Some(node)] = graph.edges[edge.0].nodes {
                if self.distances[node.slot()] > 1 {
                    self.distances[node.slot()] = 1;
                    self.queue.push_back(node);
                }
            }
        }

        while let Some(curr) = self.queue.pop_front() {
            let next = self.distances[curr.slot()] + 1;

            for edge_id in &graph.nodes[curr.0].edges {
                let edge = &graph.edges[edge_id.0];

                if edge.container != container || edge.island != Some(island) {
                    continue;
                }

                if let Some(other) = edge.other_node(curr) {
                    if graph.nodes[other.0].is_dynamic() && self.distances[other.slot()] == UNREACHED {
                        self.distances[other.slot()] = next;
                        self.queue.push_back(other);
                    }
                }
            }
        }

        let mut max_level = 0usize;

        for edge in &self.edges {
            let mut farthest = 0usize;
            let mut reached = true;

            for node in graph.edges[edge.0].nodes.iter().flatten() {
                match self.distances[node.slot()] {
                    UNREACHED => reached = false,
                    dist => farthest = farthest.max(dist),
                }
            }

            // Floating constraints stay at level 0.
            let level = if reached { farthest.saturating_sub(1) } else { 0 };
            self.levels[edge.slot()] = Some((*edge, level));
            max_level = max_level.max(level);
        }

        max_level
    }

    fn compute_directed_levels<Handle: BodyHandle, C: ConstraintHandle>(
        &mut self,
        graph: &ConstraintGraph<Handle, C>,
    ) -> usize {
        let mut digraph =
            DiGraph::<NodeIndex, ()>::with_capacity(self.edges.len(), self.edges.len());

        for edge in &self.edges {
            for node in graph.edges[edge.0].nodes.iter().flatten() {
                self.local_ids[node.slot()] = UNREACHED;
            }
        }

        for edge in &self.edges {
            for node in graph.edges[edge.0].nodes.iter().flatten() {
                if self.local_ids[node.slot()] == UNREACHED {
                    self.local_ids[node.slot()] = digraph.add_node(*node).index();
                }
            }
        }

        for edge in &self.edges {
            if let Some((Some(upstream), Some(downstream))) = graph.edges[edge.0].orientation() {
                if upstream != downstream {
                    let _ = digraph.add_edge(
                        VertexIndex::new(self.local_ids[upstream.slot()]),
                        VertexIndex::new(self.local_ids[downstream.slot()]),
                        (),
                    );
                }
            }
        }

        // Each strongly connected component becomes a single vertex of a DAG.
        let condensed = algo::condensation(digraph, true);
        let order = algo::toposort(&condensed, None).unwrap_or_default();
        let mut component_levels = vec![0usize; condensed.node_count()];

        for component in order {
            let next_level = component_levels[component.index()] + 1;

            for succ in condensed.neighbors_directed(component, Direction::Outgoing) {
                if component_levels[succ.index()] < next_level {
                    component_levels[succ.index()] = next_level;
                }
            }
        }

        // Node levels are stored in the distance buffer.
        for component in condensed.node_indices() {
            for node in &condensed[component] {
                self.distances[node.slot()] = component_levels[component.index()];
            }
        }

        let distances = &self.distances;
        let mut max_level = 0usize;

        for edge in &self.edges {
            let level = graph.edges[edge.0]
                .nodes
                .iter()
                .flatten()
                .map(|n| distances[n.slot()])
                .max()
                .unwrap_or(0);

            self.levels[edge.slot()] = Some((*edge, level));
            max_level = max_level.max(level);
        }

        max_level
    }
}
