/*!
ngraph3d
========

**ngraph3d** builds the constraint graph of a rigid-body simulation and derives from it
everything a parallel constraint solver needs to know at each step:

* the islands, i.e., the connected groups of dynamic bodies linked by constraints,
* which islands are at rest and can be put to sleep,
* a level and a color for each constraint, such that constraints with the same level and
  color share no dynamic body and can be solved concurrently.

## Usage

```rust
extern crate ngraph3d;

use ngraph3d::object::{ContainerId, DefaultBodyHandle, DefaultBodySet, DefaultConstraintSet, Particle};
use ngraph3d::world::GraphWorld;

let mut bodies = DefaultBodySet::<f32>::new();
let ground = bodies.insert(Particle::new_static());
let a = bodies.insert(Particle::new_dynamic());
let b = bodies.insert(Particle::new_dynamic());

let mut contacts = DefaultConstraintSet::new(ContainerId(0));
let _ = contacts.insert(ground, Some(a));
let _ = contacts.insert(a, Some(b));

let mut world = GraphWorld::<f32, DefaultBodyHandle, usize>::new();
world.step(&mut bodies, &[&contacts]);

let schedule = world.schedule(ContainerId(0)).unwrap();
assert_eq!(schedule.len(), 2);
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![warn(unused_results)]
#![warn(missing_docs)]
#![allow(type_alias_bounds)]

#[macro_use]
extern crate bitflags;
extern crate generational_arena;
extern crate nalgebra as na;
#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
extern crate slab;

macro_rules! try_ret {
    ($val: expr) => {
        try_ret!($val, ())
    };
    ($val: expr, $ret: expr) => {
        if let Some(val) = $val {
            val
        } else {
            return $ret;
        }
    };
}

pub mod algebra;
pub mod counters;
pub mod graph;
pub mod object;
pub mod solver;
pub mod utils;
pub mod world;

/// Compilation flags dependent aliases for mathematical types.
#[cfg(feature = "dim3")]
pub mod math {
    use crate::algebra::Velocity3;
    use na::Vector3;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The vector type.
    pub type Vector<N> = Vector3<N>;

    /// The angular vector type.
    pub type AngularVector<N> = Vector3<N>;

    /// The velocity type combining the linear velocity and the angular velocity.
    pub type Velocity<N> = Velocity3<N>;
}

/// Compilation flags dependent aliases for mathematical types.
#[cfg(all(feature = "dim2", not(feature = "dim3")))]
pub mod math {
    use crate::algebra::Velocity2;
    use na::{Vector1, Vector2};

    /// The dimension of the space.
    pub const DIM: usize = 2;

    /// The vector type.
    pub type Vector<N> = Vector2<N>;

    /// The angular vector type.
    pub type AngularVector<N> = Vector1<N>;

    /// The velocity type combining the linear velocity and the angular velocity.
    pub type Velocity<N> = Velocity2<N>;
}
