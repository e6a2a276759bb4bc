use na::{self, RealField, Vector2};
use std::ops::{Add, Mul};

/// A 2D velocity with a linear and an angular part.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Velocity2<N: RealField> {
    /// The linear velocity.
    pub linear: Vector2<N>,
    /// The angular velocity.
    pub angular: N,
}

impl<N: RealField> Velocity2<N> {
    /// Create a velocity from its linear and angular parts.
    #[inline]
    pub fn new(linear: Vector2<N>, angular: N) -> Self {
        Velocity2 { linear, angular }
    }

    /// Create a purely angular velocity.
    #[inline]
    pub fn angular(w: N) -> Self {
        Velocity2::new(na::zero(), w)
    }

    /// Create a purely linear velocity.
    #[inline]
    pub fn linear(vx: N, vy: N) -> Self {
        Velocity2::new(Vector2::new(vx, vy), na::zero())
    }

    /// The zero velocity.
    #[inline]
    pub fn zero() -> Self {
        Self::new(na::zero(), na::zero())
    }

    /// The squared norm of the linear part.
    #[inline]
    pub fn linear_norm_squared(&self) -> N {
        self.linear.norm_squared()
    }

    /// The squared norm of the angular part.
    #[inline]
    pub fn angular_norm_squared(&self) -> N {
        self.angular * self.angular
    }

    /// Returns `true` if both parts of this velocity are exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear.iter().all(|e| *e == na::zero()) && self.angular == na::zero()
    }

    /// Running weighted average: `(1 - factor) * self + factor * other`.
    #[inline]
    pub fn mix(&self, other: &Self, factor: N) -> Self {
        let _1: N = na::one();
        *self * (_1 - factor) + *other * factor
    }
}

impl<N: RealField> Add<Velocity2<N>> for Velocity2<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Velocity2::new(self.linear + rhs.linear, self.angular + rhs.angular)
    }
}

impl<N: RealField> Mul<N> for Velocity2<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: N) -> Self {
        Velocity2::new(self.linear * rhs, self.angular * rhs)
    }
}
