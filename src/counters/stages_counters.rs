use crate::counters::Timer;
use std::fmt::{Display, Formatter, Result};

/// Time spent by each stage of the graph pipeline.
pub struct StagesCounters {
    /// Time spent resetting the graph and registering constraints.
    pub graph_initialization_time: Timer,
    /// Time spent computing the islands and reconciling their sleep state.
    pub island_construction_time: Timer,
    /// Time spent deciding which islands fall asleep.
    pub sleep_time: Timer,
    /// Time spent computing constraint levels and colors.
    pub coloring_time: Timer,
}

impl StagesCounters {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        StagesCounters {
            graph_initialization_time: Timer::new(),
            island_construction_time: Timer::new(),
            sleep_time: Timer::new(),
            coloring_time: Timer::new(),
        }
    }
}

impl Display for StagesCounters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(
            f,
            "Graph initialization time: {}",
            self.graph_initialization_time
        )?;
        writeln!(
            f,
            "Island construction time: {}",
            self.island_construction_time
        )?;
        writeln!(f, "Sleep time: {}", self.sleep_time)?;
        writeln!(f, "Coloring time: {}", self.coloring_time)
    }
}
