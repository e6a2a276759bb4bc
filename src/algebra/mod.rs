//! Dynamics-specific algebraic entities.

#[cfg(feature = "dim2")]
pub use self::velocity2::Velocity2;
#[cfg(feature = "dim3")]
pub use self::velocity3::Velocity3;

#[cfg(feature = "dim2")]
mod velocity2;
#[cfg(feature = "dim3")]
mod velocity3;
