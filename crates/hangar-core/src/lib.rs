//! Hangar Core - Campaign Part Lifecycle
//!
//! Tracks the replaceable parts of a mercenary campaign's units: installing
//! them, keeping their damage in step with the unit they sit in, repairing,
//! salvaging and replacing them.
//!
//! # Architecture
//!
//! Units live in an ECS world via `hecs`:
//! - **Entities**: Units (JumpShips, WarShips, DropShips, Meks)
//! - **Components**: `Unit` for every unit, `KfDrive` for jump-capable ones
//! - **Systems**: Part lifecycle and repair-task logic
//!
//! Parts are trait objects owned by the [`Campaign`](campaign::Campaign)
//! inventory and referenced everywhere else by [`PartId`](components::PartId).
//!
//! # Example
//!
//! ```rust,no_run
//! use hangar_core::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut campaign = Campaign::default();
//! let ship = campaign.spawn_vessel(
//!     Unit::new("Invader", 152_000),
//!     KfDrive::new(CoreType::Standard, 6),
//! );
//! let coil = campaign.add_part(Box::new(KfDriveCoil::new(152_000, CoreType::Standard)), 0);
//! install_part(&mut campaign, coil, ship);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! campaign.sync_conditions(&mut rng);
//! ```

pub mod campaign;
pub mod components;
pub mod error;
pub mod options;
pub mod parts;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::campaign::Campaign;
    pub use crate::components::*;
    pub use crate::error::{PartError, ReplaceError, SaveError};
    pub use crate::options::CampaignOptions;
    pub use crate::parts::{KfDriveCoil, MissingKfDriveCoil, MissingPart, Part, PartState};
    pub use crate::systems::*;
}
