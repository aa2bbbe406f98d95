//! Shared foundational types used across the place-and-route core.
//!
//! This crate provides integer geometry, interned names, a deterministic
//! seeded RNG, and the internal bug/result split used by every pass.

#![warn(missing_docs)]

pub mod geom;
pub mod ident;
pub mod result;
pub mod rng;

pub use geom::{Coord, Rect};
pub use ident::{Ident, Interner};
pub use result::{ApResult, InternalError};
pub use rng::DeterministicRng;
