use std::collections::{HashMap, VecDeque};

use generational_arena::{Arena, Index};
use na::RealField;
use thiserror::Error;

use crate::graph::Island;
use crate::object::{Body, BodyHandle, BodySet, BodyStatus, ConstraintHandle, ContainerId};
use crate::utils::DeterministicState;

/// Errors returned by fallible graph operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A constraint was added without any body attached to it.
    #[error("a constraint must be attached to at least one body")]
    MissingEndpoints,
}

/// The index of a node of the constraint graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) Index);

/// The index of an edge of the constraint graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(pub(crate) Index);

impl NodeIndex {
    /// The arena slot of this node. Slots are recycled once a node is removed.
    #[inline]
    pub fn slot(&self) -> usize {
        self.0.into_raw_parts().0
    }
}

impl EdgeIndex {
    /// The arena slot of this edge. Slots are recycled once an edge is removed.
    #[inline]
    pub fn slot(&self) -> usize {
        self.0.into_raw_parts().0
    }
}

bitflags! {
    /// Bookkeeping flags of a graph node.
    pub struct NodeFlags: u8 {
        /// The edges or island of the node changed since the last graph initialization.
        const UPDATED = 0b0001;
        /// The node is a kinematic body with a non-zero velocity.
        const MOVING  = 0b0010;
    }
}

/// A body of the constraint graph.
#[derive(Clone, Debug)]
pub struct GraphNode<Handle> {
    pub(crate) body: Handle,
    pub(crate) edges: Vec<EdgeIndex>,
    pub(crate) island: Option<usize>,
    // Last island this node was recorded into as an anchor.
    pub(crate) anchor_stamp: Option<usize>,
    pub(crate) status: BodyStatus,
    pub(crate) flags: NodeFlags,
}

impl<Handle: BodyHandle> GraphNode<Handle> {
    fn new(body: Handle, status: BodyStatus) -> Self {
        GraphNode {
            body,
            edges: Vec::new(),
            island: None,
            anchor_stamp: None,
            status,
            flags: NodeFlags::UPDATED,
        }
    }

    /// The body this node stands for.
    #[inline]
    pub fn body(&self) -> Handle {
        self.body
    }

    /// The edges attached to this node.
    #[inline]
    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges[..]
    }

    /// The island of this node. Always `None` for static and kinematic bodies.
    #[inline]
    pub fn island(&self) -> Option<usize> {
        self.island
    }

    /// The body status cached during the last island update.
    #[inline]
    pub fn status(&self) -> BodyStatus {
        self.status
    }

    /// The bookkeeping flags of this node.
    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether this node stands for a dynamic body.
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.status == BodyStatus::Dynamic
    }

    /// Whether this node stands for a static or kinematic body.
    #[inline]
    pub fn is_anchor(&self) -> bool {
        match self.status {
            BodyStatus::Static | BodyStatus::Kinematic => true,
            _ => false,
        }
    }

    pub(crate) fn reset_island(&mut self) {
        self.island = None;
        self.anchor_stamp = None;
    }
}

/// A constraint of the constraint graph.
#[derive(Clone, Debug)]
pub struct GraphEdge<C> {
    pub(crate) container: ContainerId,
    pub(crate) constraint: C,
    pub(crate) nodes: [Option<NodeIndex>; 2],
    pub(crate) island: Option<usize>,
    // Index into `nodes` of the upstream endpoint.
    pub(crate) upstream: Option<usize>,
}

impl<C: ConstraintHandle> GraphEdge<C> {
    /// The container this constraint belongs to.
    #[inline]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// The container-specific handle of this constraint.
    #[inline]
    pub fn constraint(&self) -> C {
        self.constraint
    }

    /// The nodes attached to this edge. A missing node stands for a fixed anchor.
    #[inline]
    pub fn nodes(&self) -> [Option<NodeIndex>; 2] {
        self.nodes
    }

    /// The island this edge belongs to, if any.
    #[inline]
    pub fn island(&self) -> Option<usize> {
        self.island
    }

    /// The endpoints of this edge ordered as `(upstream, downstream)`, if it is oriented.
    #[inline]
    pub fn orientation(&self) -> Option<(Option<NodeIndex>, Option<NodeIndex>)> {
        self.upstream
            .map(|i| (self.nodes[i], self.nodes[1 - i]))
    }

    /// The endpoint of this edge that is not `node`.
    #[inline]
    pub fn other_node(&self, node: NodeIndex) -> Option<NodeIndex> {
        if self.nodes[0] == Some(node) {
            self.nodes[1]
        } else {
            self.nodes[0]
        }
    }

    pub(crate) fn reset_island(&mut self) {
        self.island = None;
    }
}

/// The graph of bodies linked by constraints, and the islands it splits into.
pub struct ConstraintGraph<Handle: BodyHandle, C: ConstraintHandle> {
    pub(crate) nodes: Arena<GraphNode<Handle>>,
    pub(crate) edges: Arena<GraphEdge<C>>,
    pub(crate) body_to_node: HashMap<Handle, NodeIndex, DeterministicState>,
    constraint_to_edge: HashMap<(ContainerId, C), EdgeIndex, DeterministicState>,
    updated_nodes: Vec<NodeIndex>,
    pub(crate) islands: Vec<Island<Handle>>,
    pub(crate) queue: VecDeque<NodeIndex>,
}

impl<Handle: BodyHandle, C: ConstraintHandle> ConstraintGraph<Handle, C> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        ConstraintGraph {
            nodes: Arena::new(),
            edges: Arena::new(),
            body_to_node: HashMap::with_hasher(DeterministicState::new()),
            constraint_to_edge: HashMap::with_hasher(DeterministicState::new()),
            updated_nodes: Vec::new(),
            islands: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// Reserves room for `additional` more nodes.
    pub fn reserve_particles(&mut self, additional: usize) {
        self.nodes.reserve(additional);
        self.body_to_node.reserve(additional);
    }

    /// Reserves room for `additional` more edges.
    pub fn reserve_constraints(&mut self, additional: usize) {
        self.edges.reserve(additional);
        self.constraint_to_edge.reserve(additional);
    }

    /// Adds a node for `body`, or returns its existing node.
    ///
    /// The node status stays `Static` until the next island update reads it from the body set.
    pub fn add_particle(&mut self, body: Handle) -> NodeIndex {
        self.add_particle_with_status(body, BodyStatus::Static)
    }

    fn add_particle_with_status(&mut self, body: Handle, status: BodyStatus) -> NodeIndex {
        if let Some(node) = self.body_to_node.get(&body) {
            return *node;
        }

        let node = NodeIndex(self.nodes.insert(GraphNode::new(body, status)));
        let _ = self.body_to_node.insert(body, node);
        self.updated_nodes.push(node);
        node
    }

    /// Removes the node of `body`, and removes it from its island.
    ///
    /// The edges attached to it are left untouched. Returns `false` if `body` had no node.
    pub fn remove_particle(&mut self, body: Handle) -> bool {
        let node = match self.body_to_node.remove(&body) {
            Some(node) => node,
            None => return false,
        };

        if let Some(node) = self.nodes.remove(node.0) {
            if let Some(island) = node.island {
                if let Some(island) = self.islands.get_mut(island) {
                    island.remove_particle(body);
                }
            }
        }

        true
    }

    fn mark_updated(&mut self, node: NodeIndex) {
        let data = &mut self.nodes[node.0];

        if !data.flags.contains(NodeFlags::UPDATED) {
            data.flags.insert(NodeFlags::UPDATED);
            self.updated_nodes.push(node);
        }
    }

    /// Adds an edge for the constraint `constraint` of the container `container`.
    ///
    /// Nodes are created for bodies that do not have one yet. Adding a constraint that is
    /// already registered returns its existing edge.
    pub fn add_constraint(
        &mut self,
        container: ContainerId,
        constraint: C,
        bodies: (Option<Handle>, Option<Handle>),
    ) -> Result<EdgeIndex, GraphError> {
        if bodies.0.is_none() && bodies.1.is_none() {
            return Err(GraphError::MissingEndpoints);
        }

        if let Some(edge) = self.constraint_to_edge.get(&(container, constraint)) {
            return Ok(*edge);
        }

        let node1 = bodies.0.map(|b| self.add_particle(b));
        let node2 = bodies.1.map(|b| self.add_particle(b));

        let edge = EdgeIndex(self.edges.insert(GraphEdge {
            container,
            constraint,
            nodes: [node1, node2],
            island: None,
            upstream: None,
        }));
        let _ = self.constraint_to_edge.insert((container, constraint), edge);

        for node in [node1, node2].iter().flatten() {
            self.nodes[node.0].edges.push(edge);
            self.mark_updated(*node);
        }

        // A constraint between a body and itself is only listed once.
        if let (Some(n1), Some(n2)) = (node1, node2) {
            if n1 == n2 {
                let _ = self.nodes[n1.0].edges.pop();
            }
        }

        Ok(edge)
    }

    /// Marks `upstream` as the upstream body of a registered constraint.
    ///
    /// Returns `false` if the constraint is unknown or `upstream` is not attached to it.
    pub fn orient_constraint(&mut self, container: ContainerId, constraint: C, upstream: Handle) -> bool {
        let edge = try_ret!(self.constraint_to_edge.get(&(container, constraint)).copied(), false);
        let node = try_ret!(self.body_to_node.get(&upstream).copied(), false);
        let edge = &mut self.edges[edge.0];

        match edge.nodes.iter().position(|n| *n == Some(node)) {
            Some(i) => {
                edge.upstream = Some(i);
                true
            }
            None => false,
        }
    }

    /// Removes the edge of a constraint, if it is still attached to `bodies`.
    ///
    /// Returns `false` if nothing was removed.
    pub fn remove_constraint(
        &mut self,
        container: ContainerId,
        constraint: C,
        bodies: (Option<Handle>, Option<Handle>),
    ) -> bool {
        let edge = try_ret!(self.constraint_to_edge.get(&(container, constraint)).copied(), false);
        let expected = [
            bodies.0.and_then(|b| self.body_to_node.get(&b).copied()),
            bodies.1.and_then(|b| self.body_to_node.get(&b).copied()),
        ];

        if self.edges[edge.0].nodes != expected {
            return false;
        }

        self.detach_edge(edge);
        true
    }

    pub(crate) fn detach_edge(&mut self, edge: EdgeIndex) {
        let data = match self.edges.remove(edge.0) {
            Some(data) => data,
            None => return,
        };
        let _ = self
            .constraint_to_edge
            .remove(&(data.container, data.constraint));

        for node in data.nodes.iter().flatten() {
            if let Some(node) = self.nodes.get_mut(node.0) {
                node.edges.retain(|e| *e != edge);
            }
        }

        if let Some(island) = data.island {
            if let Some(island) = self.islands.get_mut(island) {
                island.remove_edge(edge);
            }
        }
    }

    /// Prepares the graph for the constraints of a new step.
    ///
    /// The first call creates a node for every non-disabled body. Then, the nodes modified since
    /// the last call lose their edges and island, and every edge is removed.
    pub fn initialize_graph<N: RealField, Bodies: BodySet<N, Handle = Handle>>(&mut self, bodies: &Bodies) {
        if self.nodes.is_empty() {
            bodies.foreach(|handle, body| {
                if body.is_enabled() {
                    let _ = self.add_particle_with_status(handle, body.status());
                }
            });
        }

        for node in self.updated_nodes.drain(..) {
            if let Some(node) = self.nodes.get_mut(node.0) {
                node.edges.clear();
                node.reset_island();
                node.flags.remove(NodeFlags::UPDATED);
            }
        }

        // `retain` bumps generations, unlike `clear`, so stale edge indices are never reused.
        self.edges.retain(|_, _| false);
        self.constraint_to_edge.clear();

        for island in &mut self.islands {
            island.clear_edges();
        }
    }

    /// The node of `body`, if any.
    #[inline]
    pub fn node_index(&self, body: Handle) -> Option<NodeIndex> {
        self.body_to_node.get(&body).copied()
    }

    /// Gets the node at `index`.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode<Handle>> {
        self.nodes.get(index.0)
    }

    /// Gets the edge at `index`.
    #[inline]
    pub fn edge(&self, index: EdgeIndex) -> Option<&GraphEdge<C>> {
        self.edges.get(index.0)
    }

    /// The number of nodes of this graph.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges of this graph.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// An upper bound of the slots of the nodes of this graph.
    #[inline]
    pub fn node_capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// An upper bound of the slots of the edges of this graph.
    #[inline]
    pub fn edge_capacity(&self) -> usize {
        self.edges.capacity()
    }

    /// Iter through all the nodes of this graph.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode<Handle>)> {
        self.nodes.iter().map(|(i, n)| (NodeIndex(i), n))
    }

    /// Iter through all the edges of this graph.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &GraphEdge<C>)> {
        self.edges.iter().map(|(i, e)| (EdgeIndex(i), e))
    }

    /// The bodies linked to `body` by a constraint.
    ///
    /// A body linked by several constraints is yielded once per constraint.
    pub fn neighbors<'a>(&'a self, body: Handle) -> impl Iterator<Item = Handle> + 'a {
        let node = self.node_index(body);
        let edges = node
            .and_then(|n| self.nodes.get(n.0))
            .map(|n| &n.edges[..])
            .unwrap_or(&[]);

        edges.iter().filter_map(move |e| {
            let other = self.edges.get(e.0)?.other_node(node?)?;
            Some(self.nodes.get(other.0)?.body)
        })
    }

    /// The edge of a registered constraint.
    #[inline]
    pub fn constraint_edge(&self, container: ContainerId, constraint: C) -> Option<EdgeIndex> {
        self.constraint_to_edge.get(&(container, constraint)).copied()
    }

    /// The island of a registered constraint.
    pub fn constraint_island(&self, container: ContainerId, constraint: C) -> Option<usize> {
        let edge = self.constraint_edge(container, constraint)?;
        self.edges.get(edge.0)?.island
    }

    /// The island of `body`. Always `None` for static and kinematic bodies.
    pub fn particle_island(&self, body: Handle) -> Option<usize> {
        let node = self.node_index(body)?;
        self.nodes.get(node.0)?.island
    }
}

impl<Handle: BodyHandle, C: ConstraintHandle> Default for ConstraintGraph<Handle, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{ConstraintGraph, GraphError};
    use crate::object::ContainerId;

    const CONTACTS: ContainerId = ContainerId(0);

    #[test]
    fn add_particle_is_idempotent() {
        let mut graph = ConstraintGraph::<u32, u32>::new();
        let a = graph.add_particle(1);
        let b = graph.add_particle(1);

        assert_eq!(a, b);
        assert_eq!(graph.num_nodes(), 1);
    }

    #[test]
    fn constraint_without_bodies_is_rejected() {
        let mut graph = ConstraintGraph::<u32, u32>::new();

        assert_eq!(
            graph.add_constraint(CONTACTS, 0, (None, None)),
            Err(GraphError::MissingEndpoints)
        );
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn add_constraint_creates_nodes_once() {
        let mut graph = ConstraintGraph::<u32, u32>::new();
        let e1 = graph.add_constraint(CONTACTS, 0, (Some(1), Some(2))).unwrap();
        let e2 = graph.add_constraint(CONTACTS, 0, (Some(1), Some(2))).unwrap();

        assert_eq!(e1, e2);
        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn remove_constraint_checks_endpoints() {
        let mut graph = ConstraintGraph::<u32, u32>::new();
        let _ = graph.add_constraint(CONTACTS, 0, (Some(1), None)).unwrap();

        assert!(!graph.remove_constraint(CONTACTS, 0, (Some(2), None)));
        assert!(!graph.remove_constraint(ContainerId(1), 0, (Some(1), None)));
        assert!(graph.remove_constraint(CONTACTS, 0, (Some(1), None)));
        assert!(!graph.remove_constraint(CONTACTS, 0, (Some(1), None)));

        assert_eq!(graph.num_edges(), 0);
        let node = graph.node_index(1).unwrap();
        assert!(graph.node(node).unwrap().edges().is_empty());
    }

    #[test]
    fn orientation_requires_an_attached_body() {
        let mut graph = ConstraintGraph::<u32, u32>::new();
        let edge = graph.add_constraint(CONTACTS, 7, (Some(1), Some(2))).unwrap();
        let _ = graph.add_particle(3);

        assert!(!graph.orient_constraint(CONTACTS, 7, 3));
        assert!(graph.orient_constraint(CONTACTS, 7, 2));

        let n1 = graph.node_index(1);
        let n2 = graph.node_index(2);
        assert_eq!(graph.edge(edge).unwrap().orientation(), Some((n2, n1)));
    }

    #[test]
    fn removed_particle_keeps_its_edges() {
        let mut graph = ConstraintGraph::<u32, u32>::new();
        let edge = graph.add_constraint(CONTACTS, 0, (Some(1), Some(2))).unwrap();

        assert!(graph.remove_particle(1));
        assert!(!graph.remove_particle(1));
        assert!(graph.edge(edge).is_some());
        assert_eq!(graph.num_nodes(), 1);
    }
}
