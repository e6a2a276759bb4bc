use std::collections::{HashSet, VecDeque};

use na::RealField;
use tracing::trace;

use crate::graph::{ConstraintGraph, ContactGraph, EdgeIndex, NodeIndex};
use crate::object::{BodyHandle, ConstraintHandle, ContainerId};
use crate::solver::{ColorSchedule, GraphParameters};
use crate::utils::IndexMut2;

#[derive(Clone, Debug, Default)]
struct NodeColor {
    stamp: usize,
    next_color: usize,
    used_colors: HashSet<usize>,
    enqueued: bool,
}

impl NodeColor {
    fn touch(&mut self, stamp: usize) {
        if self.stamp != stamp {
            self.stamp = stamp;
            self.next_color = 0;
            self.used_colors.clear();
            self.enqueued = false;
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct EdgeColor {
    edge: Option<EdgeIndex>,
    stamp: usize,
    level: usize,
    color: Option<usize>,
}

#[derive(Clone, Debug)]
struct IslandColoring<C> {
    level_to_color_to_constraints: Vec<Vec<Vec<C>>>,
    max_level: Option<usize>,
    max_color: Option<usize>,
}

impl<C> IslandColoring<C> {
    fn new() -> Self {
        IslandColoring {
            level_to_color_to_constraints: Vec::new(),
            max_level: None,
            max_color: None,
        }
    }

    fn clear(&mut self) {
        self.level_to_color_to_constraints.clear();
        self.max_level = None;
        self.max_color = None;
    }

    fn push(&mut self, level: usize, color: usize, constraint: C) {
        if self.level_to_color_to_constraints.len() <= level {
            self.level_to_color_to_constraints
                .resize_with(level + 1, Vec::new);
        }

        let colors = &mut self.level_to_color_to_constraints[level];

        if colors.len() <= color {
            colors.resize_with(color + 1, Vec::new);
        }

        colors[color].push(constraint);
        self.max_level = Some(self.max_level.map_or(level, |l| l.max(level)));
        self.max_color = Some(self.max_color.map_or(color, |c| c.max(color)));
    }
}

// Smallest color free at both ends; only the candidate of `node` is bumped.
fn pick_color(node: &mut NodeColor, other: Option<&mut NodeColor>) -> usize {
    let offered = node.next_color;
    let mut color = offered;

    while node.used_colors.contains(&color)
        || other
            .as_ref()
            .map_or(false, |o| o.used_colors.contains(&color))
    {
        color += 1;
    }

    if color == offered {
        node.next_color += 1;
    }

    let _ = node.used_colors.insert(color);

    if let Some(other) = other {
        let _ = other.used_colors.insert(color);
    }

    color
}

/// Splits the constraints of each island into levels and colors.
///
/// Two constraints with the same level and color never share a dynamic body.
pub struct ConstraintColor<C: ConstraintHandle> {
    islands: Vec<IslandColoring<C>>,
    nodes: Vec<NodeColor>,
    edges: Vec<EdgeColor>,
    contact_graph: ContactGraph,
    queue: VecDeque<NodeIndex>,
    timestamp: usize,
}

impl<C: ConstraintHandle> ConstraintColor<C> {
    /// Creates an empty coloring.
    pub fn new() -> Self {
        ConstraintColor {
            islands: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            contact_graph: ContactGraph::new(),
            queue: VecDeque::new(),
            timestamp: 0,
        }
    }

    /// Forgets the colors of the previous step and allocates one result per island of `graph`.
    pub fn initialize_color<Handle: BodyHandle>(&mut self, graph: &ConstraintGraph<Handle, C>) {
        self.islands.truncate(graph.num_islands());

        for island in &mut self.islands {
            island.clear();
        }

        self.islands
            .resize_with(graph.num_islands(), IslandColoring::new);

        for edge in &mut self.edges {
            *edge = EdgeColor::default();
        }
    }

    /// Levels and colors the constraints of `container` belonging to `island`.
    ///
    /// Bodies are visited breadth-first starting from the smallest body handle, so the result
    /// only depends on the graph contents. Panics if `island` is out of range.
    pub fn compute_color<N: RealField, Handle: BodyHandle>(
        &mut self,
        graph: &ConstraintGraph<Handle, C>,
        island: usize,
        container: ContainerId,
        parameters: &GraphParameters<N>,
    ) {
        let island_data = graph.island(island);

        if self.islands.len() < graph.num_islands() {
            self.islands
                .resize_with(graph.num_islands(), IslandColoring::new);
        }

        if self.nodes.len() < graph.node_capacity() {
            self.nodes.resize_with(graph.node_capacity(), NodeColor::default);
        }

        if self.edges.len() < graph.edge_capacity() {
            self.edges.resize(graph.edge_capacity(), EdgeColor::default());
        }

        self.timestamp += 1;
        let stamp = self.timestamp;
        let _ = self
            .contact_graph
            .compute_levels(graph, island, container, parameters.leveling);

        let result = &mut self.islands[island];
        result.clear();

        for edge in island_data.edges() {
            if graph.edges[edge.0].container == container {
                self.edges[edge.slot()] = EdgeColor {
                    edge: Some(*edge),
                    stamp,
                    level: self.contact_graph.level(*edge).unwrap_or(0),
                    color: None,
                };
            }
        }

        let mut seeds: Vec<(Handle, NodeIndex)> = island_data
            .dynamic_particles()
            .iter()
            .filter_map(|h| graph.node_index(*h).map(|n| (*h, n)))
            .collect();
        seeds.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for (_, seed) in seeds {
            let seed_color = &mut self.nodes[seed.slot()];
            seed_color.touch(stamp);

            if seed_color.enqueued {
                continue;
            }

            seed_color.enqueued = true;
            self.queue.push_back(seed);

            while let Some(curr) = self.queue.pop_front() {
                for edge_id in &graph.nodes[curr.0].edges {
                    let edge_color = &mut self.edges[edge_id.slot()];

                    if edge_color.stamp != stamp || edge_color.color.is_some() {
                        continue;
                    }

                    let edge = &graph.edges[edge_id.0];
                    let other = edge
                        .other_node(curr)
                        .filter(|o| *o != curr && graph.nodes[o.0].is_dynamic());

                    let color = match other {
                        Some(other) => {
                            let (curr_color, other_color) =
                                self.nodes.index_mut2(curr.slot(), other.slot());
                            other_color.touch(stamp);
                            let color = pick_color(curr_color, Some(&mut *other_color));

                            if !other_color.enqueued {
                                other_color.enqueued = true;
                                self.queue.push_back(other);
                            }

                            color
                        }
                        None => pick_color(&mut self.nodes[curr.slot()], None),
                    };

                    edge_color.color = Some(color);
                    result.push(edge_color.level, color, edge.constraint);
                }
            }
        }

        trace!(
            island,
            container = container.0,
            max_level = ?result.max_level,
            max_color = ?result.max_color,
            "island colored"
        );
    }

    /// The constraints of an island, indexed by level then by color.
    pub fn island_level_to_color_to_constraints(&self, island: usize) -> &[Vec<Vec<C>>] {
        &self.island_coloring(island).level_to_color_to_constraints[..]
    }

    /// The largest level of the constraints of an island, or `None` if it has no constraint.
    pub fn island_max_level(&self, island: usize) -> Option<usize> {
        self.island_coloring(island).max_level
    }

    /// The largest color of the constraints of an island, or `None` if it has no constraint.
    pub fn island_max_color(&self, island: usize) -> Option<usize> {
        self.island_coloring(island).max_color
    }

    /// The level assigned to the constraint of `edge` during this step.
    pub fn constraint_level(&self, edge: EdgeIndex) -> Option<usize> {
        self.edge_color(edge)
            .filter(|e| e.color.is_some())
            .map(|e| e.level)
    }

    /// The color assigned to the constraint of `edge` during this step.
    ///
    /// Returns `None` for edges removed from the graph, even if their slot was reused.
    pub fn constraint_color(&self, edge: EdgeIndex) -> Option<usize> {
        self.edge_color(edge).and_then(|e| e.color)
    }

    fn edge_color(&self, edge: EdgeIndex) -> Option<&EdgeColor> {
        self.edges
            .get(edge.slot())
            .filter(|e| e.edge == Some(edge))
    }

    /// The execution schedule of the constraints of an island.
    pub fn schedule(&self, island: usize) -> ColorSchedule<C> {
        ColorSchedule::from_buckets(self.island_level_to_color_to_constraints(island).to_vec())
    }

    fn island_coloring(&self, island: usize) -> &IslandColoring<C> {
        assert!(
            island < self.islands.len(),
            "Island index {} out of range.",
            island
        );
        &self.islands[island]
    }
}

impl<C: ConstraintHandle> Default for ConstraintColor<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::ConstraintColor;
    use crate::graph::ConstraintGraph;
    use crate::object::{ContainerId, DefaultBodySet, Particle};
    use crate::solver::{GraphParameters, LevelingMode};

    const CONTACTS: ContainerId = ContainerId(0);

    #[test]
    fn chain_alternates_two_colors() {
        let mut bodies = DefaultBodySet::<f32>::new();
        let handles: Vec<_> = (0..5).map(|_| bodies.insert(Particle::new_dynamic())).collect();

        let mut graph = ConstraintGraph::new();
        graph.initialize_graph(&bodies);

        for (i, pair) in handles.windows(2).enumerate() {
            let _ = graph
                .add_constraint(CONTACTS, i, (Some(pair[0]), Some(pair[1])))
                .unwrap();
        }

        graph.update_islands(&mut bodies);

        let params = GraphParameters::<f32>::default().with_leveling(LevelingMode::Disabled);
        let mut coloring = ConstraintColor::new();
        coloring.initialize_color(&graph);
        coloring.compute_color(&graph, 0, CONTACTS, &params);

        assert_eq!(coloring.island_max_level(0), Some(0));
        assert_eq!(coloring.island_max_color(0), Some(1));
        assert_eq!(
            coloring.island_level_to_color_to_constraints(0),
            &[vec![vec![0usize, 2], vec![1, 3]]]
        );
    }

    #[test]
    fn other_containers_are_ignored() {
        let mut bodies = DefaultBodySet::<f32>::new();
        let a = bodies.insert(Particle::new_dynamic());
        let b = bodies.insert(Particle::new_dynamic());

        let mut graph = ConstraintGraph::new();
        graph.initialize_graph(&bodies);
        let _ = graph.add_constraint(CONTACTS, 0usize, (Some(a), Some(b))).unwrap();
        let joint = graph
            .add_constraint(ContainerId(1), 0, (Some(a), Some(b)))
            .unwrap();
        graph.update_islands(&mut bodies);

        let mut coloring = ConstraintColor::new();
        coloring.initialize_color(&graph);
        coloring.compute_color(&graph, 0, CONTACTS, &GraphParameters::<f32>::default());

        assert_eq!(coloring.island_max_color(0), Some(0));
        assert_eq!(coloring.constraint_color(joint), None);
        assert_eq!(coloring.schedule(0).len(), 1);
    }

    #[test]
    fn stale_edge_has_no_color() {
        let mut bodies = DefaultBodySet::<f32>::new();
        let a = bodies.insert(Particle::new_dynamic());
        let b = bodies.insert(Particle::new_dynamic());
        let params = GraphParameters::<f32>::default();

        let mut graph = ConstraintGraph::new();
        let mut coloring = ConstraintColor::new();

        graph.initialize_graph(&bodies);
        let old = graph.add_constraint(CONTACTS, 0usize, (Some(a), Some(b))).unwrap();
        graph.update_islands(&mut bodies);
        coloring.initialize_color(&graph);
        coloring.compute_color(&graph, 0, CONTACTS, &params);
        assert_eq!(coloring.constraint_color(old), Some(0));
        assert_eq!(coloring.constraint_level(old), Some(0));

        graph.initialize_graph(&bodies);
        let new = graph.add_constraint(CONTACTS, 1, (Some(a), Some(b))).unwrap();
        graph.update_islands(&mut bodies);
        coloring.initialize_color(&graph);
        coloring.compute_color(&graph, 0, CONTACTS, &params);

        assert_eq!(old.slot(), new.slot());
        assert_eq!(coloring.constraint_color(old), None);
        assert_eq!(coloring.constraint_level(old), None);
        assert_eq!(coloring.constraint_color(new), Some(0));
    }
}
