use std::collections::HashMap;

use na::RealField;
use tracing::debug;

use crate::counters::Counters;
use crate::graph::{ConstraintColor, ConstraintGraph};
use crate::object::{
    Body, BodyHandle, BodySet, ConstraintContainer, ConstraintHandle, ContainerId,
};
use crate::solver::{ColorSchedule, GraphParameters};
use crate::utils::DeterministicState;

/// The world responsible for building the constraint graph and scheduling its constraints.
pub struct GraphWorld<N: RealField, Handle: BodyHandle, C: ConstraintHandle> {
    /// Performance counters used for debugging and benchmarking.
    pub counters: Counters,
    /// The parameters of the graph pipeline.
    pub parameters: GraphParameters<N>,
    graph: ConstraintGraph<Handle, C>,
    colorings: HashMap<ContainerId, ConstraintColor<C>, DeterministicState>,
    schedules: HashMap<ContainerId, ColorSchedule<C>, DeterministicState>,
}

impl<N: RealField, Handle: BodyHandle, C: ConstraintHandle> GraphWorld<N, Handle, C> {
    /// Creates a new graph world with default parameters and disabled counters.
    pub fn new() -> Self {
        Self::with_parameters(GraphParameters::default())
    }

    /// Creates a new graph world with the given parameters.
    pub fn with_parameters(parameters: GraphParameters<N>) -> Self {
        GraphWorld {
            counters: Counters::new(false),
            parameters,
            graph: ConstraintGraph::new(),
            colorings: HashMap::with_hasher(DeterministicState::new()),
            schedules: HashMap::with_hasher(DeterministicState::new()),
        }
    }

    /// The constraint graph.
    pub fn graph(&self) -> &ConstraintGraph<Handle, C> {
        &self.graph
    }

    /// The constraint graph, mutably.
    pub fn graph_mut(&mut self) -> &mut ConstraintGraph<Handle, C> {
        &mut self.graph
    }

    /// The coloring computed for the constraints of `container` during the last step.
    pub fn coloring(&self, container: ContainerId) -> Option<&ConstraintColor<C>> {
        self.colorings.get(&container)
    }

    /// The schedule of the constraints of `container` on awake islands, computed during the
    /// last step.
    pub fn schedule(&self, container: ContainerId) -> Option<&ColorSchedule<C>> {
        self.schedules.get(&container)
    }

    /// Removes the bodies deleted from `bodies` from the graph, and adds the enabled bodies
    /// inserted since the last call.
    pub fn maintain<Bodies: BodySet<N, Handle = Handle>>(&mut self, bodies: &mut Bodies) {
        while let Some(handle) = bodies.pop_removal_event() {
            self.graph.disable_particle(bodies, handle);
        }

        while let Some(handle) = bodies.pop_insertion_event() {
            if bodies.get(handle).map_or(false, |b| b.is_enabled()) {
                self.graph.enable_particle(bodies, handle, None);
            }
        }
    }

    /// Rebuilds the graph and its islands, updates sleeping, and schedules the constraints of
    /// each container.
    pub fn step<Bodies: BodySet<N, Handle = Handle>>(
        &mut self,
        bodies: &mut Bodies,
        containers: &[&dyn ConstraintContainer<Handle, C>],
    ) {
        self.counters.step_started();
        self.maintain(bodies);

        self.counters.graph_initialization_started();
        self.graph.initialize_graph(bodies);

        for container in containers {
            container.add_to_graph(&mut self.graph);
        }

        self.counters.graph_initialization_completed();

        self.counters.island_construction_started();
        self.graph.update_islands(bodies);
        self.counters.island_construction_completed();

        self.counters.sleep_started();
        let mut nsleeping = 0;

        for island in 0..self.graph.num_islands() {
            let sleeping = if self.parameters.sleeping_enabled {
                self.graph.sleep_inactive(island, bodies, &self.parameters)
            } else {
                self.graph.island(island).is_sleeping()
            };

            if sleeping {
                nsleeping += 1;
            }
        }

        self.counters.sleep_completed();

        self.counters.coloring_started();
        let mut max_level = 0usize;
        let mut max_color = 0usize;

        for container in containers {
            let id = container.container_id();
            let coloring = self.colorings.entry(id).or_insert_with(ConstraintColor::new);
            let schedule = self.schedules.entry(id).or_insert_with(ColorSchedule::new);

            coloring.initialize_color(&self.graph);
            schedule.clear();

            for (i, island) in self.graph.islands().iter().enumerate() {
                let sleeping = island.is_sleeping();

                if sleeping && !self.parameters.color_sleeping_islands {
                    continue;
                }

                coloring.compute_color(&self.graph, i, id, &self.parameters);
                max_level = max_level.max(coloring.island_max_level(i).unwrap_or(0));
                max_color = max_color.max(coloring.island_max_color(i).unwrap_or(0));

                if !sleeping {
                    schedule.append_island(coloring.island_level_to_color_to_constraints(i));
                }
            }
        }

        self.counters.coloring_completed();

        self.counters
            .set_graph_size(self.graph.num_nodes(), self.graph.num_edges());
        self.counters
            .set_nislands(self.graph.num_islands(), nsleeping);
        self.counters.set_coloring_extents(max_level, max_color);
        self.counters.step_completed();

        debug!(
            nislands = self.graph.num_islands(),
            nsleeping,
            max_level,
            max_color,
            "graph step completed"
        );
    }
}

impl<N: RealField, Handle: BodyHandle, C: ConstraintHandle> Default for GraphWorld<N, Handle, C> {
    fn default() -> Self {
        Self::new()
    }
}
