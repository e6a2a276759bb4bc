use na::{self, RealField, Vector3};
use std::ops::{Add, Mul};

/// A 3D velocity with a linear and an angular part.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Velocity3<N: RealField> {
    /// The linear velocity.
    pub linear: Vector3<N>,
    /// The angular velocity.
    pub angular: Vector3<N>,
}

impl<N: RealField> Velocity3<N> {
    /// Create a velocity from its linear and angular parts.
    #[inline]
    pub fn new(linear: Vector3<N>, angular: Vector3<N>) -> Self {
        Velocity3 { linear, angular }
    }

    /// Create a purely angular velocity.
    #[inline]
    pub fn angular(wx: N, wy: N, wz: N) -> Self {
        Velocity3::new(na::zero(), Vector3::new(wx, wy, wz))
    }

    /// Create a purely linear velocity.
    #[inline]
    pub fn linear(vx: N, vy: N, vz: N) -> Self {
        Velocity3::new(Vector3::new(vx, vy, vz), na::zero())
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
        self.angular.norm_squared()
    }

    /// Returns `true` if both parts of this velocity are exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear.iter().all(|e| *e == na::zero())
            && self.angular.iter().all(|e| *e == na::zero())
    }

    /// Running weighted average: `(1 - factor) * self + factor * other`.
    #[inline]
    pub fn mix(&self, other: &Self, factor: N) -> Self {
        let _1: N = na::one();
        *self * (_1 - factor) + *other * factor
    }
}

impl<N: RealField> Add<Velocity3<N>> for Velocity3<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Velocity3::new(self.linear + rhs.linear, self.angular + rhs.angular)
    }
}

impl<N: RealField> Mul<N> for Velocity3<N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: N) -> Self {
        Velocity3::new(self.linear * rhs, self.angular * rhs)
    }
}
