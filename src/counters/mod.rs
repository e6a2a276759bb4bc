//! Counters for benchmarking the various stages of the graph pipeline.

use std::fmt::{Display, Formatter, Result};

pub use self::graph_counters::GraphCounters;
pub use self::stages_counters::StagesCounters;
pub use self::timer::Timer;

mod graph_counters;
mod stages_counters;
mod timer;

/// Aggregation of all the performance counters tracked by the graph pipeline.
pub struct Counters {
    enabled: bool,
    step_time: Timer,
    stages: StagesCounters,
    graph: GraphCounters,
}

impl Counters {
    /// Create a new set of counters initialized to zero.
    pub fn new(enabled: bool) -> Self {
        Counters {
            enabled,
            step_time: Timer::new(),
            stages: StagesCounters::new(),
            graph: GraphCounters::new(),
        }
    }

    /// Enable all the counters.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Return `true` if the counters are enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disable all the counters.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Notify that the time-step has started.
    pub fn step_started(&mut self) {
        if self.enabled {
            self.step_time.start();
        }
    }

    /// Notify that the time-step has finished.
    pub fn step_completed(&mut self) {
        if self.enabled {
            self.step_time.pause();
        }
    }

    /// Total time spent for one step of the graph pipeline.
    pub fn step_time(&self) -> f64 {
        self.step_time.time()
    }

    /// The graph statistics recorded during the last step.
    ///
    /// Unlike timers, these are always recorded.
    pub fn graph(&self) -> &GraphCounters {
        &self.graph
    }

    /// Set the number of nodes and edges of the graph.
    pub fn set_graph_size(&mut self, nnodes: usize, nedges: usize) {
        self.graph.nnodes = nnodes;
        self.graph.nedges = nedges;
    }

    /// Set the number of islands, and how many of them are asleep.
    pub fn set_nislands(&mut self, nislands: usize, nsleeping: usize) {
        self.graph.nislands = nislands;
        self.graph.nsleeping_islands = nsleeping;
    }

    /// Set the largest level and color indices found by the colorer.
    pub fn set_coloring_extents(&mut self, max_level: usize, max_color: usize) {
        self.graph.max_level = max_level;
        self.graph.max_color = max_color;
    }
}

macro_rules! measure_method {
    ($started:ident, $stopped:ident, $time:ident, $info:ident. $timer:ident) => {
        impl Counters {
            /// Start this timer.
            pub fn $started(&mut self) {
                if self.enabled {
                    self.$info.$timer.start()
                }
            }

            /// Stop this timer.
            pub fn $stopped(&mut self) {
                if self.enabled {
                    self.$info.$timer.pause()
                }
            }

            /// Gets the time elapsed for this timer.
            pub fn $time(&self) -> f64 {
                if self.enabled {
                    self.$info.$timer.time()
                } else {
                    0.0
                }
            }
        }
    };
}

measure_method!(
    graph_initialization_started,
    graph_initialization_completed,
    graph_initialization_time,
    stages.graph_initialization_time
);
measure_method!(
    island_construction_started,
    island_construction_completed,
    island_construction_time,
    stages.island_construction_time
);
measure_method!(
    sleep_started,
    sleep_completed,
    sleep_time,
    stages.sleep_time
);
measure_method!(
    coloring_started,
    coloring_completed,
    coloring_time,
    stages.coloring_time
);

impl Display for Counters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Total timestep time: {}", self.step_time)?;
        self.stages.fmt(f)?;
        self.graph.fmt(f)
    }
}
