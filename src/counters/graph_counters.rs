use std::fmt::{Display, Formatter, Result};

/// Statistics about the constraint graph after the last step.
#[derive(Copy, Clone, Debug, Default)]
pub struct GraphCounters {
    /// Number of graph nodes.
    pub nnodes: usize,
    /// Number of live graph edges.
    pub nedges: usize,
    /// Number of islands.
    pub nislands: usize,
    /// Number of islands that are asleep.
    pub nsleeping_islands: usize,
    /// Largest level index over all colored islands.
    pub max_level: usize,
    /// Largest color index over all colored islands.
    pub max_color: usize,
}

impl GraphCounters {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        GraphCounters::default()
    }
}

impl Display for GraphCounters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Number of nodes: {}", self.nnodes)?;
        writeln!(f, "Number of edges: {}", self.nedges)?;
        writeln!(
            f,
            "Number of islands: {} ({} asleep)",
            self.nislands, self.nsleeping_islands
        )?;
        writeln!(f, "Max level: {}", self.max_level)?;
        writeln!(f, "Max color: {}", self.max_color)
    }
}
