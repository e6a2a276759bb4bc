//! Miscellaneous utilities.

pub use self::deterministic_state::DeterministicState;
pub use self::index_mut2::IndexMut2;

mod deterministic_state;
mod index_mut2;
pub mod union_find;
