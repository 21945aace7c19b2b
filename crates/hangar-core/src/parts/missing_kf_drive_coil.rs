//! Placeholder for a vessel whose K-F drive coil has been removed.

use hecs::World;
use serde_json::{Map, Value};
use std::any::Any;

use super::{drive_of, KF_DRIVE_COIL_SLOT, KfDriveCoil, MissingPart, Part, PartRecord};
use crate::components::{CompositeDriveState, CoreType, Money, TaskMode, TechRating, TechSkill};
use crate::error::PartError;
use crate::persistence::read_int;

/// Installing a replacement coil takes as long as pulling one
const REPLACE_TIME: u32 = 28800;
const REPLACE_DIFFICULTY: i32 = 2;

#[derive(Debug, Clone)]
pub struct MissingKfDriveCoil {
    record: PartRecord,
    core_type: CoreType,
}

impl MissingKfDriveCoil {
    pub const TYPE_TAG: &'static str = "MissingKfDriveCoil";

    pub fn new(unit_tonnage: u32, core_type: CoreType) -> Self {
        Self {
            record: PartRecord::new(KfDriveCoil::NAME, unit_tonnage),
            core_type,
        }
    }

    pub fn core_type(&self) -> CoreType {
        self.core_type
    }
}

impl Default for MissingKfDriveCoil {
    fn default() -> Self {
        Self::new(0, CoreType::Standard)
    }
}

impl Part for MissingKfDriveCoil {
    fn record(&self) -> &PartRecord {
        &self.record
    }

    fn record_mut(&mut self) -> &mut PartRecord {
        &mut self.record
    }

    fn type_tag(&self) -> &'static str {
        Self::TYPE_TAG
    }

    fn base_time(&self, _mode: TaskMode) -> u32 {
        REPLACE_TIME
    }

    fn difficulty(&self, _mode: TaskMode) -> i32 {
        REPLACE_DIFFICULTY
    }

    fn sticker_price(&self) -> Money {
        self.new_part().sticker_price()
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
            .downcast_ref::<MissingKfDriveCoil>()
            .is_some_and(|missing| missing.core_type == self.core_type)
    }

    fn slot(&self) -> Option<&'static str> {
        Some(KF_DRIVE_COIL_SLOT)
    }

    fn check_fixable(&self) -> Option<String> {
        None
    }

    /// An empty slot always needs a replacement
    fn needs_fixing(&self) -> bool {
        true
    }

    fn allows_salvage(&self) -> bool {
        false
    }

    fn host_hits(&self, _world: &World) -> Option<u32> {
        None
    }

    fn push_condition(&self, world: &World) {
        self.flag_host_missing(world);
    }

    fn flag_host_missing(&self, world: &World) {
        if let Some(mut drive) = self.record.unit.and_then(|unit| drive_of(world, unit)) {
            drive.set_coil_hit(true);
        }
    }

    fn on_fixed(&self, _world: &World) {}

    fn missing_part(&self) -> Option<Box<dyn Part>> {
        None
    }

    fn as_missing(&self) -> Option<&dyn MissingPart> {
        Some(self)
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
        let mut clone = MissingKfDriveCoil::new(0, self.core_type);
        clone.record = self.record.detached_copy();
        Box::new(clone)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MissingPart for MissingKfDriveCoil {
    /// Any coil of the same core type sized for the same vessel
    fn is_acceptable_replacement(&self, part: &dyn Part) -> bool {
        part.as_any()
            .downcast_ref::<KfDriveCoil>()
            .is_some_and(|coil| {
                coil.core_type() == self.core_type
                    && coil.record().unit_tonnage == self.record.unit_tonnage
            })
    }

    fn new_part(&self) -> Box<dyn Part> {
        Box::new(KfDriveCoil::new(self.record.unit_tonnage, self.core_type))
    }
}
