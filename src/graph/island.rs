use std::collections::HashMap;
use std::mem;

use na::RealField;
use tracing::debug;

use crate::graph::{ConstraintGraph, EdgeIndex, NodeFlags, NodeIndex, SleepState};
use crate::object::{Body, BodyHandle, BodySet, BodyStatus, ConstraintHandle};
use crate::utils::DeterministicState;

/// A maximal set of dynamic bodies linked by constraints, with the anchors touching them.
#[derive(Clone, Debug)]
pub struct Island<Handle> {
    particles: Vec<Handle>,
    num_dynamic: usize,
    edges: Vec<EdgeIndex>,
    persistent: bool,
    previous_index: Option<usize>,
    pub(crate) sleep_counter: u32,
    pub(crate) sleep_state: SleepState,
    needs_resync: bool,
}

impl<Handle: BodyHandle> Island<Handle> {
    fn new() -> Self {
        Island {
            particles: Vec::new(),
            num_dynamic: 0,
            edges: Vec::new(),
            persistent: false,
            previous_index: None,
            sleep_counter: 0,
            sleep_state: SleepState::Awake,
            needs_resync: true,
        }
    }

    /// All the bodies of this island: the dynamic ones first, then the anchors touching them.
    #[inline]
    pub fn particles(&self) -> &[Handle] {
        &self.particles[..]
    }

    /// The dynamic bodies of this island.
    #[inline]
    pub fn dynamic_particles(&self) -> &[Handle] {
        &self.particles[..self.num_dynamic]
    }

    /// The static and kinematic bodies touching this island.
    ///
    /// An anchor may touch several islands.
    #[inline]
    pub fn anchors(&self) -> &[Handle] {
        &self.particles[self.num_dynamic..]
    }

    /// The constraints of this island.
    #[inline]
    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges[..]
    }

    /// Whether this island has the same dynamic bodies as an island of the previous update.
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// The index this island had during the previous update, if it is persistent.
    #[inline]
    pub fn previous_index(&self) -> Option<usize> {
        self.previous_index
    }

    /// The number of consecutive updates this island spent at rest.
    #[inline]
    pub fn sleep_counter(&self) -> u32 {
        self.sleep_counter
    }

    /// The sleep state of this island.
    #[inline]
    pub fn sleep_state(&self) -> SleepState {
        self.sleep_state
    }

    /// Whether this island is asleep.
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleep_state == SleepState::Asleep
    }

    /// Whether the membership of this island changed, so per-island caches must be rebuilt.
    #[inline]
    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    pub(crate) fn set_needs_resync(&mut self, needs_resync: bool) {
        self.needs_resync = needs_resync
    }

    pub(crate) fn insert_dynamic(&mut self, body: Handle) {
        self.particles.insert(self.num_dynamic, body);
        self.num_dynamic += 1;
        self.needs_resync = true;
    }

    pub(crate) fn remove_particle(&mut self, body: Handle) {
        if let Some(i) = self.particles.iter().position(|p| *p == body) {
            let _ = self.particles.remove(i);

            if i < self.num_dynamic {
                self.num_dynamic -= 1;
            }

            self.needs_resync = true;
        }
    }

    pub(crate) fn remove_edge(&mut self, edge: EdgeIndex) {
        if let Some(i) = self.edges.iter().position(|e| *e == edge) {
            let _ = self.edges.swap_remove(i);
        }
    }

    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear()
    }

    fn inherit(&mut self, previous: &Self, previous_index: usize) {
        self.persistent = true;
        self.previous_index = Some(previous_index);
        self.sleep_counter = previous.sleep_counter;
        self.sleep_state = previous.sleep_state;
        self.needs_resync = previous.needs_resync;
    }
}

fn wake_bodies<N, Handle, Bodies>(island: &Island<Handle>, bodies: &mut Bodies) -> usize
where
    N: RealField,
    Handle: BodyHandle,
    Bodies: BodySet<N, Handle = Handle>,
{
    let mut nwoken = 0;

    for handle in island.dynamic_particles() {
        if let Some(body) = bodies.get_mut(*handle) {
            if body.is_sleeping() {
                body.set_sleeping(false);
                nwoken += 1;
            }
        }
    }

    nwoken
}

impl<Handle: BodyHandle, C: ConstraintHandle> ConstraintGraph<Handle, C> {
    /// The islands computed by the last call to `update_islands`.
    #[inline]
    pub fn islands(&self) -> &[Island<Handle>] {
        &self.islands[..]
    }

    /// The number of islands computed by the last call to `update_islands`.
    #[inline]
    pub fn num_islands(&self) -> usize {
        self.islands.len()
    }

    /// Gets the island at `index`.
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn island(&self, index: usize) -> &Island<Handle> {
        assert!(
            index < self.islands.len(),
            "Island index {} out of range.",
            index
        );
        &self.islands[index]
    }

    /// Marks an island as synchronized with per-island caches.
    pub fn clear_needs_resync(&mut self, index: usize) {
        assert!(
            index < self.islands.len(),
            "Island index {} out of range.",
            index
        );
        self.islands[index].set_needs_resync(false)
    }

    /// Splits the graph into islands and reconciles them with the islands of the previous call.
    ///
    /// Panics if a node references a body missing from `bodies`.
    pub fn update_islands<N: RealField, Bodies: BodySet<N, Handle = Handle>>(&mut self, bodies: &mut Bodies) {
        let previous = mem::replace(&mut self.islands, Vec::new());
        let mut previous_island_of: HashMap<Handle, usize, DeterministicState> =
            HashMap::with_hasher(DeterministicState::new());

        for (i, island) in previous.iter().enumerate() {
            for handle in island.dynamic_particles() {
                let _ = previous_island_of.insert(*handle, i);
            }
        }

        self.reset_islands();

        for (_, node) in self.nodes.iter_mut() {
            let body = match bodies.get(node.body) {
                Some(body) => body,
                None => panic!("The body {:?} of a graph node is missing.", node.body),
            };

            node.status = body.status();
            node.flags
                .set(NodeFlags::MOVING, body.is_kinematic() && !body.velocity().is_zero());
        }

        let mut seeds: Vec<(Handle, NodeIndex)> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_dynamic())
            .map(|(i, node)| (node.body, NodeIndex(i)))
            .collect();
        seeds.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for (_, seed) in seeds {
            if self.nodes[seed.0].island.is_none() {
                let island = self.flood_island(seed, self.islands.len());
                self.islands.push(island);
            }
        }

        let mut nwoken = 0;
        let mut npersistent = 0;
        let nodes = &self.nodes;
        let body_to_node = &self.body_to_node;

        for island in self.islands.iter_mut() {
            let mut previous_index = None;
            let mut same_origin = true;

            for handle in island.dynamic_particles() {
                match (previous_island_of.get(handle), previous_index) {
                    (Some(&p), None) => previous_index = Some(p),
                    (Some(&p), Some(q)) if p == q => {}
                    _ => {
                        same_origin = false;
                        break;
                    }
                }
            }

            let previous_index = previous_index
                .filter(|p| same_origin && previous[*p].num_dynamic == island.num_dynamic);

            if let Some(p) = previous_index {
                npersistent += 1;
                island.inherit(&previous[p], p);

                if island.is_sleeping() {
                    let body_woken = island.dynamic_particles().iter().any(|h| {
                        bodies.get(*h).map_or(false, |b| !b.is_sleeping())
                    });
                    let anchor_moving = island.anchors().iter().any(|h| {
                        body_to_node
                            .get(h)
                            .map_or(false, |n| nodes[n.0].flags.contains(NodeFlags::MOVING))
                    });

                    if body_woken || anchor_moving {
                        island.sleep_state = SleepState::Awake;
                        island.sleep_counter = 0;
                        nwoken += wake_bodies(island, bodies);
                    }
                }
            } else {
                nwoken += wake_bodies(island, bodies);
            }
        }

        debug!(
            nislands = self.islands.len(),
            npersistent,
            nwoken,
            "islands updated"
        );
    }

    fn reset_islands(&mut self) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let mut nodes: Vec<_> = self.nodes.iter_mut().map(|(_, node)| node).collect();
            nodes.par_iter_mut().for_each(|node| node.reset_island());
            let mut edges: Vec<_> = self.edges.iter_mut().map(|(_, edge)| edge).collect();
            edges.par_iter_mut().for_each(|edge| edge.reset_island());
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (_, node) in self.nodes.iter_mut() {
                node.reset_island()
            }

            for (_, edge) in self.edges.iter_mut() {
                edge.reset_island()
            }
        }
    }

    fn flood_island(&mut self, seed: NodeIndex, id: usize) -> Island<Handle> {
        let mut island = Island::new();
        let mut anchors = Vec::new();

        self.nodes[seed.0].island = Some(id);
        self.queue.clear();
        self.queue.push_back(seed);

        while let Some(curr) = self.queue.pop_front() {
            island.particles.push(self.nodes[curr.0].body);

            for k in 0..self.nodes[curr.0].edges.len() {
                let edge_id = self.nodes[curr.0].edges[k];
                let edge = &mut self.edges[edge_id.0];

                if edge.island == Some(id) {
                    continue;
                }

                edge.island = Some(id);
                island.edges.push(edge_id);

                if let Some(other) = edge.other_node(curr) {
                    let other_node = &mut self.nodes[other.0];

                    if other_node.is_dynamic() {
                        if other_node.island.is_none() {
                            other_node.island = Some(id);
                            self.queue.push_back(other);
                        }
                    } else if other_node.status != BodyStatus::Disabled
                        && other_node.anchor_stamp != Some(id)
                    {
                        other_node.anchor_stamp = Some(id);
                        anchors.push(other_node.body);
                    }
                }
            }
        }

        island.num_dynamic = island.particles.len();
        island.particles.append(&mut anchors);
        island
    }
}
