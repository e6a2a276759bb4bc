use na::{self, RealField};
use thiserror::Error;

/// How constraints are split into levels before being colored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum LevelingMode {
    /// Every constraint is at level 0.
    Disabled,
    /// Constraints are leveled by their distance to the closest static or kinematic body.
    AnchorDistance,
    /// Constraints are leveled by the topological order of the graph of oriented constraints.
    DirectedGraph,
}

/// Errors returned by `GraphParameters::validate`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The sleep threshold multiplier is negative.
    #[error("the sleep threshold multiplier must be non-negative")]
    NegativeSleepThresholdMultiplier,
    /// Sleeping islands are colored while sleeping is disabled.
    #[error("sleeping islands cannot be colored when sleeping is disabled")]
    ColoringSleepingIslandsWithoutSleeping,
}

/// Parameters of the graph pipeline.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GraphParameters<N: RealField> {
    /// How constraints are leveled.
    pub leveling: LevelingMode,
    /// Whether islands at rest are allowed to fall asleep.
    pub sleeping_enabled: bool,
    /// Factor applied to the linear and angular sleep thresholds of every body.
    pub sleep_threshold_multiplier: N,
    /// Whether sleeping islands are colored too.
    pub color_sleeping_islands: bool,
}

impl<N: RealField> GraphParameters<N> {
    /// Creates a new set of parameters.
    pub fn new(
        leveling: LevelingMode,
        sleeping_enabled: bool,
        sleep_threshold_multiplier: N,
        color_sleeping_islands: bool,
    ) -> Self {
        GraphParameters {
            leveling,
            sleeping_enabled,
            sleep_threshold_multiplier,
            color_sleeping_islands,
        }
    }

    /// Sets the leveling mode.
    pub fn with_leveling(mut self, leveling: LevelingMode) -> Self {
        self.leveling = leveling;
        self
    }

    /// Enables or disables sleeping.
    pub fn with_sleeping(mut self, enabled: bool) -> Self {
        self.sleeping_enabled = enabled;
        self
    }

    /// Sets the sleep threshold multiplier.
    pub fn with_sleep_threshold_multiplier(mut self, multiplier: N) -> Self {
        self.sleep_threshold_multiplier = multiplier;
        self
    }

    /// Checks these parameters are consistent.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.sleep_threshold_multiplier < na::zero() {
            return Err(ParameterError::NegativeSleepThresholdMultiplier);
        }

        if self.color_sleeping_islands && !self.sleeping_enabled {
            return Err(ParameterError::ColoringSleepingIslandsWithoutSleeping);
        }

        Ok(())
    }
}

impl<N: RealField> Default for GraphParameters<N> {
    fn default() -> Self {
        Self::new(LevelingMode::AnchorDistance, true, na::one(), false)
    }
}
