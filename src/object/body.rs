use std::fmt::Debug;
use std::hash::Hash;

use na::{self, RealField};

use crate::math::Velocity;

/// Trait implemented by the identifiers of bodies referenced by the constraint graph.
///
/// The ordering is used to visit bodies in a stable order so that islands and colors
/// are reproducible from one run to another.
pub trait BodyHandle: Copy + Hash + PartialEq + Eq + Ord + Debug + Send + Sync + 'static {}

impl<T: Copy + Hash + PartialEq + Eq + Ord + Debug + Send + Sync + 'static> BodyHandle for T {}

/// The status of a body.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BodyStatus {
    /// The body is disabled and ignored by the graph.
    Disabled,
    /// The body is static and thus cannot move.
    Static,
    /// The body is dynamic and thus can move and is subject to constraints.
    Dynamic,
    /// The body is kinematic: its velocity is controlled by the user and constraints do not affect it.
    Kinematic,
}

/// The material-derived thresholds controlling when a body is allowed to fall asleep.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SleepMaterial<N: RealField> {
    /// Smoothed linear speed bellow which the body is considered at rest.
    pub linear_threshold: N,
    /// Smoothed angular speed bellow which the body is considered at rest.
    pub angular_threshold: N,
    /// Number of consecutive quiet steps after which the body may fall asleep.
    pub sleep_counter_threshold: u32,
}

impl<N: RealField> SleepMaterial<N> {
    /// Creates a sleep material.
    pub fn new(linear_threshold: N, angular_threshold: N, sleep_counter_threshold: u32) -> Self {
        SleepMaterial {
            linear_threshold,
            angular_threshold,
            sleep_counter_threshold,
        }
    }

    /// Checks that both thresholds are non-negative.
    ///
    /// Bodies with an invalid material never fall asleep.
    pub fn is_valid(&self) -> bool {
        self.linear_threshold >= na::zero() && self.angular_threshold >= na::zero()
    }
}

impl<N: RealField> Default for SleepMaterial<N> {
    fn default() -> Self {
        SleepMaterial::new(na::convert(0.05f64), na::convert(0.05f64), 20)
    }
}

/// Trait implemented by all the bodies the constraint graph can reference.
pub trait Body<N: RealField>: Send + Sync {
    /// The status of this body.
    fn status(&self) -> BodyStatus;

    /// The smoothed velocity of this body, used to decide whether it can sleep.
    fn velocity(&self) -> &Velocity<N>;

    /// The sleep thresholds of this body.
    ///
    /// A value of `None` prevents this body, and any island containing it, from sleeping.
    fn sleep_material(&self) -> Option<&SleepMaterial<N>>;

    /// Returns `true` if this body is asleep.
    fn is_sleeping(&self) -> bool;

    /// Puts this body to sleep, or wakes it up.
    fn set_sleeping(&mut self, sleeping: bool);

    /// Whether or not the status of this body is dynamic.
    #[inline]
    fn is_dynamic(&self) -> bool {
        self.status() == BodyStatus::Dynamic
    }

    /// Whether or not the status of this body is kinematic.
    #[inline]
    fn is_kinematic(&self) -> bool {
        self.status() == BodyStatus::Kinematic
    }

    /// Whether or not the status of this body is static.
    #[inline]
    fn is_static(&self) -> bool {
        self.status() == BodyStatus::Static
    }

    /// Whether or not this body is static or kinematic, i.e., unaffected by constraints.
    #[inline]
    fn is_anchor(&self) -> bool {
        match self.status() {
            BodyStatus::Static | BodyStatus::Kinematic => true,
            _ => false,
        }
    }

    /// Whether or not this body takes part in the simulation.
    #[inline]
    fn is_enabled(&self) -> bool {
        self.status() != BodyStatus::Disabled
    }
}
