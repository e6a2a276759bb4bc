use std::fmt::Debug;
use std::hash::Hash;

use slab::Slab;

use crate::graph::ConstraintGraph;
use crate::object::BodyHandle;

/// Trait implemented by the opaque identifiers of constraints referenced by the graph.
pub trait ConstraintHandle: Copy + Hash + PartialEq + Eq + Debug + Send + Sync + 'static {}

impl<T: Copy + Hash + PartialEq + Eq + Debug + Send + Sync + 'static> ConstraintHandle for T {}

/// Identifies the constraint container an edge of the graph comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContainerId(pub u32);

/// A source of constraints that registers them into the constraint graph at each step.
pub trait ConstraintContainer<Handle: BodyHandle, C: ConstraintHandle> {
    /// The identifier of this container. Must be unique among the containers of a world.
    fn container_id(&self) -> ContainerId;

    /// Adds all the active constraints of this container to the graph.
    fn add_to_graph(&self, graph: &mut ConstraintGraph<Handle, C>);
}

/// A constraint stored on a `DefaultConstraintSet`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConstraintEntry<Handle> {
    /// The first body attached to this constraint.
    pub body1: Handle,
    /// The second body attached to this constraint, if any.
    pub body2: Option<Handle>,
    /// Which of the two bodies is upstream, for directed leveling.
    pub upstream: Option<Handle>,
}

/// A container of constraints between pairs of bodies, identified by their slab key.
pub struct DefaultConstraintSet<Handle: BodyHandle> {
    id: ContainerId,
    constraints: Slab<ConstraintEntry<Handle>>,
}

impl<Handle: BodyHandle> DefaultConstraintSet<Handle> {
    /// Creates an empty set with the given container identifier.
    pub fn new(id: ContainerId) -> Self {
        DefaultConstraintSet {
            id,
            constraints: Slab::new(),
        }
    }

    /// Adds a constraint between `body1` and `body2`, or between `body1` and a fixed anchor.
    pub fn insert(&mut self, body1: Handle, body2: Option<Handle>) -> usize {
        self.constraints.insert(ConstraintEntry {
            body1,
            body2,
            upstream: None,
        })
    }

    /// Adds a constraint oriented from `upstream` to `downstream`.
    pub fn insert_oriented(&mut self, upstream: Handle, downstream: Handle) -> usize {
        self.constraints.insert(ConstraintEntry {
            body1: upstream,
            body2: Some(downstream),
            upstream: Some(upstream),
        })
    }

    /// Removes a constraint from this set.
    pub fn remove(&mut self, handle: usize) -> Option<ConstraintEntry<Handle>> {
        if self.constraints.contains(handle) {
            Some(self.constraints.remove(handle))
        } else {
            None
        }
    }

    /// Gets the constraint identified by `handle`.
    pub fn get(&self, handle: usize) -> Option<&ConstraintEntry<Handle>> {
        self.constraints.get(handle)
    }

    /// The number of constraints on this set.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if this set contains no constraint.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iter through all the constraints and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ConstraintEntry<Handle>)> {
        self.constraints.iter()
    }
}

impl<Handle: BodyHandle> ConstraintContainer<Handle, usize> for DefaultConstraintSet<Handle> {
    fn container_id(&self) -> ContainerId {
        self.id
    }

    fn add_to_graph(&self, graph: &mut ConstraintGraph<Handle, usize>) {
        for (handle, entry) in self.constraints.iter() {
            // Never fails: `body1` is always set.
            if graph
                .add_constraint(self.id, handle, (Some(entry.body1), entry.body2))
                .is_ok()
            {
                if let Some(upstream) = entry.upstream {
                    let _ = graph.orient_constraint(self.id, handle, upstream);
                }
            }
        }
    }
}
