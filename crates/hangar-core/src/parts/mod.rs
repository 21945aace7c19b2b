//! Parts - persisted, repairable components owned by the campaign.
//!
//! Every part variant implements [`Part`]. The shared base fields live in
//! [`PartRecord`]; variants add their own fields and supply the rules for
//! repair time, difficulty, price and how they mirror host damage.

mod kf_drive_coil;
mod missing_kf_drive_coil;

pub use kf_drive_coil::KfDriveCoil;
pub use missing_kf_drive_coil::MissingKfDriveCoil;

/// Slot shared by a drive coil and the placeholder it leaves behind
pub const KF_DRIVE_COIL_SLOT: &str = "kf_drive_coil";

use hecs::{Entity, World};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;

use crate::components::{KfDrive, Money, PartId, TaskMode, TechRating, TechSkill};
use crate::error::PartError;

/// Base fields every part shares
#[derive(Debug, Clone, PartialEq)]
pub struct PartRecord {
    /// Inventory id, assigned when the part joins a campaign
    pub id: Option<PartId>,
    pub name: String,
    /// Tonnage of the unit this part is built for
    pub unit_tonnage: u32,
    /// Damage level, 0 = undamaged
    pub hits: u32,
    /// Unit the part is installed on
    pub unit: Option<Entity>,
    /// Days until an ordered part arrives, 0 = on hand
    pub days_to_arrival: u32,
    pub removed: bool,
}

impl PartRecord {
    pub fn new(name: impl Into<String>, unit_tonnage: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            unit_tonnage,
            hits: 0,
            unit: None,
            days_to_arrival: 0,
            removed: false,
        }
    }

    /// Copy of the base fields with no inventory id and no host
    pub fn detached_copy(&self) -> Self {
        Self {
            id: None,
            unit: None,
            removed: false,
            ..self.clone()
        }
    }

    pub fn is_present(&self) -> bool {
        self.days_to_arrival == 0
    }
}

/// Where a part is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    Unattached,
    AttachedHealthy,
    AttachedDamaged,
    Removed,
}

/// Contract every part variant satisfies
pub trait Part: fmt::Debug {
    fn record(&self) -> &PartRecord;
    fn record_mut(&mut self) -> &mut PartRecord;

    /// Type tag written to saved documents
    fn type_tag(&self) -> &'static str;

    /// Nominal labor minutes for the task, independent of skill and damage
    fn base_time(&self, mode: TaskMode) -> u32;
    /// Modifier applied to the technician's target number
    fn difficulty(&self, mode: TaskMode) -> i32;

    fn sticker_price(&self) -> Money;
    /// Physical weight of the part itself
    fn tonnage(&self) -> f64;
    fn tech_rating(&self) -> TechRating;
    fn is_right_tech_type(&self, skill: TechSkill) -> bool;

    fn location_name(&self) -> Option<&str> {
        None
    }

    fn is_same_part_type(&self, other: &dyn Part) -> bool;

    /// Slot this part fills on its unit. A unit holds at most one part or
    /// placeholder per slot; `None` means the part takes no exclusive slot.
    fn slot(&self) -> Option<&'static str> {
        None
    }

    /// Reason the part cannot be worked on right now, if any
    fn check_fixable(&self) -> Option<String>;

    fn needs_fixing(&self) -> bool {
        self.record().hits > 0
    }

    /// Whether a removed part may be kept as a spare
    fn allows_salvage(&self) -> bool {
        true
    }

    /// Hits implied by the host's damage flag; `None` when the host lacks
    /// the capability this part mirrors.
    fn host_hits(&self, world: &World) -> Option<u32>;

    /// Write this part's condition into the host
    fn push_condition(&self, world: &World);

    /// Flag the host slot as hit when the part leaves it
    fn flag_host_missing(&self, world: &World);

    /// Host-side effects of a completed repair
    fn on_fixed(&self, world: &World);

    /// Placeholder marking the slot this part leaves behind
    fn missing_part(&self) -> Option<Box<dyn Part>>;

    fn as_missing(&self) -> Option<&dyn MissingPart> {
        None
    }

    fn write_fields(&self, doc: &mut Map<String, Value>);
    fn load_fields(&mut self, doc: &Map<String, Value>) -> Result<(), PartError>;

    /// Independent copy: base fields then variant fields, no id, no host
    fn clone_part(&self) -> Box<dyn Part>;

    fn as_any(&self) -> &dyn Any;

    fn name(&self) -> &str {
        &self.record().name
    }

    fn state(&self) -> PartState {
        let record = self.record();
        if record.removed {
            PartState::Removed
        } else if record.unit.is_none() {
            PartState::Unattached
        } else if self.needs_fixing() {
            PartState::AttachedDamaged
        } else {
            PartState::AttachedHealthy
        }
    }
}

/// A placeholder for a slot whose component is gone
pub trait MissingPart: Part {
    fn is_acceptable_replacement(&self, part: &dyn Part) -> bool;

    /// Fresh part to order for this slot
    fn new_part(&self) -> Box<dyn Part>;
}

/// Drive capability of a host unit, `None` when it carries no K-F drive
pub(crate) fn drive_of(world: &World, unit: Entity) -> Option<hecs::RefMut<'_, KfDrive>> {
    world.get::<&mut KfDrive>(unit).ok()
}

/// Build an empty part of the given type, ready for its fields to be loaded
pub fn part_for_tag(tag: &str) -> Option<Box<dyn Part>> {
    if tag.eq_ignore_ascii_case(KfDriveCoil::TYPE_TAG) {
        Some(Box::new(KfDriveCoil::default()))
    } else if tag.eq_ignore_ascii_case(MissingKfDriveCoil::TYPE_TAG) {
        Some(Box::new(MissingKfDriveCoil::default()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CoreType;

    #[test]
    fn test_part_for_tag_ignores_case() {
        let part = part_for_tag("kfdrivecoil").expect("coil tag");
        assert_eq!(part.type_tag(), KfDriveCoil::TYPE_TAG);
        assert!(part_for_tag("MISSINGKFDRIVECOIL").is_some());
        assert!(part_for_tag("Armor").is_none());
    }

    #[test]
    fn test_state_follows_record() {
        let mut world = World::new();
        let ship = world.spawn(());
        let mut coil = KfDriveCoil::new(50_000, CoreType::Standard);
        assert_eq!(coil.state(), PartState::Unattached);

        coil.record_mut().unit = Some(ship);
        assert_eq!(coil.state(), PartState::AttachedHealthy);

        coil.record_mut().hits = 1;
        assert_eq!(coil.state(), PartState::AttachedDamaged);

        coil.record_mut().removed = true;
        assert_eq!(coil.state(), PartState::Removed);
    }

    #[test]
    fn test_detached_copy_drops_links() {
        let mut world = World::new();
        let ship = world.spawn(());
        let mut record = PartRecord::new("K-F Drive Coil", 50_000);
        record.id = Some(PartId(4));
        record.unit = Some(ship);
        record.hits = 1;

        let copy = record.detached_copy();
        assert_eq!(copy.id, None);
        assert_eq!(copy.unit, None);
        assert_eq!(copy.hits, 1);
        assert_eq!(copy.unit_tonnage, 50_000);
    }
}
