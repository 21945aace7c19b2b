//! Host unit components: Unit, KfDrive, and the drive capability.
//!
//! Units live as entities in a `hecs::World`. Only capital vessels carry a
//! [`KfDrive`] component; parts that mirror drive damage look it up and treat
//! its absence as "nothing to synchronize".

use super::common::PartId;
use serde::{Deserialize, Serialize};

/// Unit component - a campaign unit backed by a simulated entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    /// Unit tonnage, the mass basis for parts built for it
    pub tonnage: u32,
    /// Parts currently installed (owned by the campaign inventory)
    pub parts: Vec<PartId>,
}

impl Unit {
    pub fn new(name: impl Into<String>, tonnage: u32) -> Self {
        Self {
            name: name.into(),
            tonnage,
            parts: Vec::new(),
        }
    }

    pub fn has_part(&self, id: PartId) -> bool {
        self.parts.contains(&id)
    }

    pub fn add_part(&mut self, id: PartId) {
        if !self.has_part(id) {
            self.parts.push(id);
        }
    }

    pub fn remove_part(&mut self, id: PartId) {
        self.parts.retain(|p| *p != id);
    }
}

/// Kearny-Fuchida drive core construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreType {
    #[default]
    Standard,
    Compact,
    Subcompact,
    None,
    Primitive,
}

impl CoreType {
    /// Integer code used by the simulation engine and in saved documents
    pub fn code(self) -> i64 {
        match self {
            CoreType::Standard => 0,
            CoreType::Compact => 1,
            CoreType::Subcompact => 2,
            CoreType::None => 3,
            CoreType::Primitive => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CoreType::Standard),
            1 => Some(CoreType::Compact),
            2 => Some(CoreType::Subcompact),
            3 => Some(CoreType::None),
            4 => Some(CoreType::Primitive),
            _ => None,
        }
    }
}

/// Damage and integrity state of a vessel with several drive components
/// feeding one shared integrity pool.
pub trait CompositeDriveState {
    fn coil_hit(&self) -> bool;
    fn set_coil_hit(&mut self, hit: bool);

    /// True while any drive component is still damaged
    fn is_drive_damaged(&self) -> bool;

    fn integrity(&self) -> u32;
    fn max_integrity(&self) -> u32;

    /// Credit one repaired component to the integrity pool: one point back
    /// while other components remain damaged, full restore otherwise.
    fn credit_component_repair(&mut self);
}

/// K-F drive component - present only on jump-capable capital vessels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KfDrive {
    pub core_type: CoreType,
    integrity: u32,
    max_integrity: u32,
    pub coil_hit: bool,
    pub initiator_hit: bool,
    pub controller_hit: bool,
    pub tank_hit: bool,
    pub charger_hit: bool,
    pub lf_battery_hit: bool,
    pub has_lf_battery: bool,
}

impl KfDrive {
    pub fn new(core_type: CoreType, max_integrity: u32) -> Self {
        Self {
            core_type,
            integrity: max_integrity,
            max_integrity,
            coil_hit: false,
            initiator_hit: false,
            controller_hit: false,
            tank_hit: false,
            charger_hit: false,
            lf_battery_hit: false,
            has_lf_battery: false,
        }
    }

    pub fn with_lf_battery(mut self) -> Self {
        self.has_lf_battery = true;
        self
    }

    /// Apply combat damage to the integrity pool
    pub fn damage_integrity(&mut self, points: u32) {
        self.integrity = self.integrity.saturating_sub(points);
    }
}

impl CompositeDriveState for KfDrive {
    fn coil_hit(&self) -> bool {
        self.coil_hit
    }

    fn set_coil_hit(&mut self, hit: bool) {
        self.coil_hit = hit;
    }

    fn is_drive_damaged(&self) -> bool {
        self.coil_hit
            || self.initiator_hit
            || self.controller_hit
            || self.tank_hit
            || self.charger_hit
            || (self.has_lf_battery && self.lf_battery_hit)
    }

    fn integrity(&self) -> u32 {
        self.integrity
    }

    fn max_integrity(&self) -> u32 {
        self.max_integrity
    }

    fn credit_component_repair(&mut self) {
        if self.is_drive_damaged() {
            self.integrity = (self.integrity + 1).min(self.max_integrity);
        } else {
            self.integrity = self.max_integrity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_type_codes() {
        for core in [
            CoreType::Standard,
            CoreType::Compact,
            CoreType::Subcompact,
            CoreType::None,
            CoreType::Primitive,
        ] {
            assert_eq!(CoreType::from_code(core.code()), Some(core));
        }
        assert_eq!(CoreType::from_code(9), None);
    }

    #[test]
    fn test_integrity_credit_partial_while_siblings_damaged() {
        let mut drive = KfDrive::new(CoreType::Standard, 6);
        drive.damage_integrity(4);
        drive.initiator_hit = true;

        drive.credit_component_repair();
        assert_eq!(drive.integrity(), 3);
    }

    #[test]
    fn test_integrity_credit_full_when_last_component() {
        let mut drive = KfDrive::new(CoreType::Standard, 6);
        drive.damage_integrity(4);

        drive.credit_component_repair();
        assert_eq!(drive.integrity(), 6);
    }

    #[test]
    fn test_lf_battery_only_counts_when_fitted() {
        let mut drive = KfDrive::new(CoreType::Compact, 4);
        drive.lf_battery_hit = true;
        assert!(!drive.is_drive_damaged());

        let mut drive = drive.with_lf_battery();
        drive.lf_battery_hit = true;
        assert!(drive.is_drive_damaged());
    }

    #[test]
    fn test_unit_part_list_has_no_duplicates() {
        let mut unit = Unit::new("Invader", 152_000);
        unit.add_part(PartId(1));
        unit.add_part(PartId(1));
        assert_eq!(unit.parts.len(), 1);
        unit.remove_part(PartId(1));
        assert!(!unit.has_part(PartId(1)));
    }
}
