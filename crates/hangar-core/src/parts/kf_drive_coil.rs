//! K-F drive coil - the jump coil of a capital vessel's Kearny-Fuchida drive.
//!
//! The coil mirrors the host's coil-hit flag and feeds the drive's shared
//! integrity pool when repaired. A vessel cannot carry a second K-F drive, so
//! a coil is never salvaged into storage: removing one always scraps it.

use hecs::World;
use serde_json::{Map, Value};
use std::any::Any;

use super::{drive_of, KF_DRIVE_COIL_SLOT, MissingKfDriveCoil, Part, PartRecord};
use crate::components::{CompositeDriveState, CoreType, Money, TaskMode, TechRating, TechSkill};
use crate::error::PartError;
use crate::persistence::read_int;

// Strategic operations drive repair times, in minutes
const REPAIR_TIME: u32 = 4800;
const SALVAGE_TIME: u32 = 28800;

const REPAIR_DIFFICULTY: i32 = 5;
const SALVAGE_DIFFICULTY: i32 = 2;

/// Price per ton of the unit the coil is sized for
const PRICE_PER_UNIT_TON: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct KfDriveCoil {
    record: PartRecord,
    core_type: CoreType,
}

impl KfDriveCoil {
    pub const NAME: &'static str = "K-F Drive Coil";
    pub const TYPE_TAG: &'static str = "KfDriveCoil";

    pub fn new(unit_tonnage: u32, core_type: CoreType) -> Self {
        Self {
            record: PartRecord::new(Self::NAME, unit_tonnage),
            core_type,
        }
    }

    pub fn core_type(&self) -> CoreType {
        self.core_type
    }
}

impl Default for KfDriveCoil {
    fn default() -> Self {
        Self::new(0, CoreType::Standard)
    }
}

impl Part for KfDriveCoil {
    fn record(&self) -> &PartRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut PartRecord {
        &mut self.record
    }

    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn base_time(&self, mode: TaskMode) -> u32 {
        if mode.is_salvaging() {
            SALVAGE_TIME
        } else {
            REPAIR_TIME
        }
    }

    fn difficulty(&self, mode: TaskMode) -> i32 {
        if mode.is_salvaging() {
            SALVAGE_DIFFICULTY
        } else {
            REPAIR_DIFFICULTY
        }
    }

    fn sticker_price(&self) -> Money {
        Money::of(PRICE_PER_UNIT_TON * self.record.unit_tonnage as f64)
    }

    fn tonnage(&self) -> f64 {
        0.0
    }

    fn tech_rating(&self) -> TechRating {
        TechRating::B
    }

    fn is_right_tech_type(&self, skill: TechSkill) -> bool {
        skill == TechSkill::Vessel
    }

    fn is_same_part_type(&self, other: &dyn Part) -> bool {
        other
            .as_any()
            .downcast_ref::<KfDriveCoil>()
            .is_some_and(|coil| coil.core_type == self.core_type)
    }

    fn slot(&self) -> Option<&'static str> {
        Some(KF_DRIVE_COIL_SLOT)
    }

    fn check_fixable(&self) -> Option<String> {
        None
    }

    fn allows_salvage(&self) -> bool {
        false
    }

    fn host_hits(&self, world: &World) -> Option<u32> {
        let drive = drive_of(world, self.record.unit?)?;
        Some(u32::from(drive.coil_hit()))
    }

    fn push_condition(&self, world: &World) {
        if let Some(mut drive) = self.record.unit.and_then(|unit| drive_of(world, unit)) {
            drive.set_coil_hit(self.needs_fixing());
        }
    }

    fn flag_host_missing(&self, world: &World) {
        if let Some(mut drive) = self.record.unit.and_then(|unit| drive_of(world, unit)) {
            drive.set_coil_hit(true);
        }
    }

    fn on_fixed(&self, world: &World) {
        if let Some(mut drive) = self.record.unit.and_then(|unit| drive_of(world, unit)) {
            drive.set_coil_hit(false);
            drive.credit_component_repair();
        }
    }

    fn missing_part(&self) -> Option<Box<dyn Part>> {
        Some(Box::new(MissingKfDriveCoil::new(
            self.record.unit_tonnage,
            self.core_type,
        )))
    }

    fn write_fields(&self, doc: &mut Map<String, Value>) {
        doc.insert("coreType".into(), Value::from(self.core_type.code()));
    }

    fn load_fields(&mut self, doc: &Map<String, Value>) -> Result<(), PartError> {
        for (key, value) in doc {
            if key.eq_ignore_ascii_case("coreType") {
                let code = read_int(value, "coreType")?;
                self.core_type = CoreType::from_code(code).ok_or(PartError::UnknownCoreType(code))?;
            }
        }
        Ok(())
    }

    fn clone_part(&self) -> Box<dyn Part> {
        let mut clone = KfDriveCoil::new(0, self.core_type);
        clone.record = self.record.detached_copy();
        Box::new(clone)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
