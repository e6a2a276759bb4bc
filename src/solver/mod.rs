//! Parameters and output of the graph pipeline consumed by constraint solvers.

pub use self::graph_parameters::{GraphParameters, LevelingMode, ParameterError};
pub use self::schedule::ColorSchedule;

mod graph_parameters;
mod schedule;
