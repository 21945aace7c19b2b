//! Component definitions for campaign units and parts.
//!
//! Components are pure data structs. Units are entities in a `hecs::World`;
//! the behavior that keeps parts in step with them lives in systems.

mod common;
mod unit;

pub use common::*;
pub use unit::*;
