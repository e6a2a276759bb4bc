use generational_arena::Arena;
use na::RealField;

use crate::object::{Body, BodyHandle, Particle};

/// Trait implemented by sets of bodies.
///
/// A set of bodies maps a body handle to a body instance. In addition, it must keep track of the
/// bodies that have been inserted or removed (see `pop_insertion_event` and
/// `pop_removal_event`) so that the graph can follow them.
pub trait BodySet<N: RealField> {
    /// Type of a body stored in this set.
    type Body: ?Sized + Body<N>;
    /// Type of a body handle identifying a body in this set.
    type Handle: BodyHandle;

    /// Gets a reference to the body identified by `handle`.
    fn get(&self, handle: Self::Handle) -> Option<&Self::Body>;
    /// Gets a mutable reference to the body identified by `handle`.
    fn get_mut(&mut self, handle: Self::Handle) -> Option<&mut Self::Body>;

    /// Check if this set contains a body identified by `handle`.
    fn contains(&self, handle: Self::Handle) -> bool;

    /// Iterate through all the bodies on this set, applying the closure `f` on them.
    fn foreach(&self, f: impl FnMut(Self::Handle, &Self::Body));
    /// Mutable iterates through all the bodies on this set, applying the closure `f` on them.
    fn foreach_mut(&mut self, f: impl FnMut(Self::Handle, &mut Self::Body));

    /// Gets the handle of one body that has been inserted.
    ///
    /// This method should return an inserted body handle only once.
    fn pop_insertion_event(&mut self) -> Option<Self::Handle>;

    /// Gets the handle of one body that has been removed.
    ///
    /// This method should return a removed body handle only once.
    fn pop_removal_event(&mut self) -> Option<Self::Handle>;
}

/// The handle of a body on a `DefaultBodySet`.
pub type DefaultBodyHandle = generational_arena::Index;

/// A set containing particles.
///
/// It is based on an arena using generational indices to avoid the ABA problem.
pub struct DefaultBodySet<N: RealField> {
    bodies: Arena<Particle<N>>,
    inserted: Vec<DefaultBodyHandle>,
    removed: Vec<DefaultBodyHandle>,
}

impl<N: RealField> DefaultBodySet<N> {
    /// Creates an empty set.
    pub fn new() -> Self {
        DefaultBodySet {
            bodies: Arena::new(),
            inserted: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Adds a particle to this set.
    pub fn insert(&mut self, particle: Particle<N>) -> DefaultBodyHandle {
        let handle = self.bodies.insert(particle);
        self.inserted.push(handle);
        handle
    }

    /// Removes a particle from this set.
    pub fn remove(&mut self, to_remove: DefaultBodyHandle) -> Option<Particle<N>> {
        let res = self.bodies.remove(to_remove)?;
        self.removed.push(to_remove);
        Some(res)
    }

    /// The number of particles in this set.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if this set contains no particle.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Check if this set contains a particle identified by `handle`.
    pub fn contains(&self, handle: DefaultBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Gets a reference to the particle identified by `handle`.
    pub fn get(&self, handle: DefaultBodyHandle) -> Option<&Particle<N>> {
        self.bodies.get(handle)
    }

    /// Gets a mutable reference to the particle identified by `handle`.
    pub fn get_mut(&mut self, handle: DefaultBodyHandle) -> Option<&mut Particle<N>> {
        self.bodies.get_mut(handle)
    }

    /// Iter through all the particles and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (DefaultBodyHandle, &Particle<N>)> {
        self.bodies.iter()
    }

    /// Mutably iter through all the particles and their handles.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DefaultBodyHandle, &mut Particle<N>)> {
        self.bodies.iter_mut()
    }
}

impl<N: RealField> Default for DefaultBodySet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: RealField> BodySet<N> for DefaultBodySet<N> {
    type Body = Particle<N>;
    type Handle = DefaultBodyHandle;

    fn get(&self, handle: Self::Handle) -> Option<&Self::Body> {
        self.get(handle)
    }

    fn get_mut(&mut self, handle: Self::Handle) -> Option<&mut Self::Body> {
        self.get_mut(handle)
    }

    fn contains(&self, handle: Self::Handle) -> bool {
        self.contains(handle)
    }

    fn foreach(&self, mut f: impl FnMut(Self::Handle, &Self::Body)) {
        for (h, b) in self.iter() {
            f(h, b)
        }
    }

    fn foreach_mut(&mut self, mut f: impl FnMut(Self::Handle, &mut Self::Body)) {
        for (h, b) in self.iter_mut() {
            f(h, b)
        }
    }

    fn pop_insertion_event(&mut self) -> Option<Self::Handle> {
        self.inserted.pop()
    }

    fn pop_removal_event(&mut self) -> Option<Self::Handle> {
        self.removed.pop()
    }
}
