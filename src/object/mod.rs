//! Objects the constraint graph is built upon: bodies and constraint containers.

pub use self::body::{Body, BodyHandle, BodyStatus, SleepMaterial};
pub use self::body_set::{BodySet, DefaultBodyHandle, DefaultBodySet};
pub use self::constraint_set::{
    ConstraintContainer, ConstraintEntry, ConstraintHandle, ContainerId, DefaultConstraintSet,
};
pub use self::particle::Particle;

mod body;
mod body_set;
mod constraint_set;
mod particle;
