use na::{self, RealField};
use tracing::trace;

use crate::graph::ConstraintGraph;
use crate::object::{Body, BodyHandle, BodySet, ConstraintHandle};
use crate::solver::GraphParameters;

/// The sleep state of an island.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SleepState {
    /// The island moves.
    Awake,
    /// The island is at rest and counts the updates before it falls asleep.
    CountingDown,
    /// The island and its bodies are asleep.
    Asleep,
}

impl<Handle: BodyHandle, C: ConstraintHandle> ConstraintGraph<Handle, C> {
    /// Advances the sleep state machine of the given island.
    ///
    /// The island falls asleep once it stayed at rest for more consecutive calls than the
    /// largest sleep counter threshold of its dynamic bodies. Returns `true` if the island is
    /// asleep after this call.
    pub fn sleep_inactive<N, Bodies>(
        &mut self,
        island: usize,
        bodies: &mut Bodies,
        parameters: &GraphParameters<N>,
    ) -> bool
    where
        N: RealField,
        Bodies: BodySet<N, Handle = Handle>,
    {
        assert!(
            island < self.islands.len(),
            "Island index {} out of range.",
            island
        );

        let data = &mut self.islands[island];

        if data.is_sleeping() {
            return true;
        }

        if data.dynamic_particles().is_empty() {
            return false;
        }

        let mut linear_threshold: Option<N> = None;
        let mut angular_threshold: Option<N> = None;
        let mut counter_threshold = 0u32;

        for handle in data.dynamic_particles() {
            match bodies
                .get(*handle)
                .and_then(|b| b.sleep_material())
                .filter(|m| m.is_valid())
            {
                Some(material) => {
                    if linear_threshold.map_or(true, |t| material.linear_threshold < t) {
                        linear_threshold = Some(material.linear_threshold);
                    }

                    if angular_threshold.map_or(true, |t| material.angular_threshold < t) {
                        angular_threshold = Some(material.angular_threshold);
                    }

                    counter_threshold = counter_threshold.max(material.sleep_counter_threshold);
                }
                None => {
                    linear_threshold = None;
                    break;
                }
            }
        }

        let multiplier = parameters.sleep_threshold_multiplier;
        let can_sleep = linear_threshold.is_some();
        let linear_threshold = linear_threshold.unwrap_or_else(na::zero) * multiplier;
        let angular_threshold = angular_threshold.unwrap_or_else(na::zero) * multiplier;

        let is_moving = |body: &Bodies::Body| {
            let vel = body.velocity();
            vel.linear_norm_squared() > linear_threshold * linear_threshold
                || vel.angular_norm_squared() > angular_threshold * angular_threshold
        };

        let active = !can_sleep
            || data
                .dynamic_particles()
                .iter()
                .any(|h| bodies.get(*h).map_or(false, |b| is_moving(b)))
            || data.anchors().iter().any(|h| {
                bodies
                    .get(*h)
                    .map_or(false, |b| b.is_kinematic() && !b.velocity().is_zero())
            });

        if active {
            data.sleep_counter = 0;
            data.sleep_state = SleepState::Awake;
            return false;
        }

        data.sleep_counter += 1;

        if data.sleep_counter > counter_threshold {
            data.sleep_state = SleepState::Asleep;

            for handle in data.dynamic_particles() {
                if let Some(body) = bodies.get_mut(*handle) {
                    body.set_sleeping(true);
                }
            }

            trace!(island, ndynamic = data.dynamic_particles().len(), "island fell asleep");
            true
        } else {
            data.sleep_state = SleepState::CountingDown;
            false
        }
    }

    /// Wakes up the given island and all its dynamic bodies.
    pub fn wake_island<N, Bodies>(&mut self, island: usize, bodies: &mut Bodies)
    where
        N: RealField,
        Bodies: BodySet<N, Handle = Handle>,
    {
        assert!(
            island < self.islands.len(),
            "Island index {} out of range.",
            island
        );

        let data = &mut self.islands[island];
        data.sleep_state = SleepState::Awake;
        data.sleep_counter = 0;

        for handle in data.dynamic_particles() {
            if let Some(body) = bodies.get_mut(*handle) {
                body.set_sleeping(false);
            }
        }
    }

    /// Wakes up every island.
    pub fn wake_islands<N, Bodies>(&mut self, bodies: &mut Bodies)
    where
        N: RealField,
        Bodies: BodySet<N, Handle = Handle>,
    {
        for island in 0..self.islands.len() {
            self.wake_island(island, bodies)
        }
    }

    /// Adds `body` to the graph.
    ///
    /// If `parent` already belongs to an island, a dynamic `body` joins it and takes its sleep
    /// state.
    pub fn enable_particle<N, Bodies>(&mut self, bodies: &mut Bodies, body: Handle, parent: Option<Handle>)
    where
        N: RealField,
        Bodies: BodySet<N, Handle = Handle>,
    {
        let node = self.add_particle(body);

        if let Some(status) = bodies.get(body).map(|b| b.status()) {
            self.nodes[node.0].status = status;
        }

        if !self.nodes[node.0].is_dynamic() || self.nodes[node.0].island.is_some() {
            return;
        }

        let island = try_ret!(parent.and_then(|p| self.particle_island(p)));

        if let Some(data) = self.islands.get_mut(island) {
            data.insert_dynamic(body);
            self.nodes[node.0].island = Some(island);

            let sleeping = data.is_sleeping();

            if let Some(body) = bodies.get_mut(body) {
                body.set_sleeping(sleeping);
            }
        }
    }

    /// Removes `body` and all the constraints attached to it from the graph.
    ///
    /// The island it belonged to is woken up.
    pub fn disable_particle<N, Bodies>(&mut self, bodies: &mut Bodies, body: Handle)
    where
        N: RealField,
        Bodies: BodySet<N, Handle = Handle>,
    {
        let node = try_ret!(self.node_index(body));
        let edges = std::mem::replace(&mut self.nodes[node.0].edges, Vec::new());
        let island = self.nodes[node.0].island;

        for edge in edges {
            self.detach_edge(edge);
        }

        let _ = self.remove_particle(body);

        if let Some(island) = island.filter(|i| *i < self.islands.len()) {
            self.wake_island(island, bodies);
        }
    }
}
