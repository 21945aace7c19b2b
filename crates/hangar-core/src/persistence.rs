//! Save/Load functionality for parts and campaigns
//!
//! A part is written as an ordered JSON object: its type tag, the base fields
//! every part shares, then the variant's own fields. Loading matches keys
//! without regard to case, skips keys it does not recognize, and leaves
//! absent fields at their constructor defaults.

use hecs::Entity;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{Read, Write};

use crate::campaign::Campaign;
use crate::components::*;
use crate::error::{PartError, SaveError};
use crate::options::CampaignOptions;
use crate::parts::{part_for_tag, Part, PartRecord};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a campaign
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub day: u32,
    pub options: CampaignOptions,
    pub units: Vec<SavedUnit>,
    /// One document per part, see [`write_part`]
    pub parts: Vec<Value>,
}

/// A unit entity with its components
#[derive(Serialize, Deserialize)]
pub struct SavedUnit {
    /// Entity handle bits, so part host links survive the round trip
    pub handle: u64,
    pub unit: Unit,
    pub drive: Option<KfDrive>,
}

/// Write one part to its document
pub fn write_part(part: &dyn Part) -> Value {
    let record = part.record();
    let mut doc = Map::new();

    doc.insert("type".into(), Value::from(part.type_tag()));
    if let Some(id) = record.id {
        doc.insert("id".into(), Value::from(id.0));
    }
    doc.insert("name".into(), Value::from(record.name.as_str()));
    doc.insert("unitTonnage".into(), Value::from(record.unit_tonnage));
    doc.insert("hits".into(), Value::from(record.hits));
    if let Some(unit) = record.unit {
        doc.insert("unitId".into(), Value::from(unit.to_bits().get()));
    }
    doc.insert("daysToArrival".into(), Value::from(record.days_to_arrival));

    part.write_fields(&mut doc);
    Value::Object(doc)
}

/// Rebuild a part from its document
pub fn read_part(doc: &Value) -> Result<Box<dyn Part>, PartError> {
    let map = doc.as_object().ok_or(PartError::NotAnObject)?;
    let tag = map
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("type"))
        .map(|(_, value)| value)
        .ok_or(PartError::MissingType)?;
    let tag = tag.as_str().ok_or_else(|| PartError::Malformed {
        field: "type",
        value: tag.to_string(),
    })?;

    let mut part = part_for_tag(tag).ok_or_else(|| PartError::UnknownPartType(tag.to_string()))?;
    load_base_fields(part.record_mut(), map)?;
    part.load_fields(map)?;
    Ok(part)
}

fn load_base_fields(record: &mut PartRecord, map: &Map<String, Value>) -> Result<(), PartError> {
    for (key, value) in map {
        if key.eq_ignore_ascii_case("id") {
            record.id = Some(PartId(read_u32(value, "id")?));
        } else if key.eq_ignore_ascii_case("name") {
            record.name = read_string(value, "name")?;
        } else if key.eq_ignore_ascii_case("unitTonnage") {
            record.unit_tonnage = read_u32(value, "unitTonnage")?;
        } else if key.eq_ignore_ascii_case("hits") {
            record.hits = read_u32(value, "hits")?;
        } else if key.eq_ignore_ascii_case("unitId") {
            let bits = read_u64(value, "unitId")?;
            record.unit = Some(Entity::from_bits(bits).ok_or_else(|| malformed(value, "unitId"))?);
        } else if key.eq_ignore_ascii_case("daysToArrival") {
            record.days_to_arrival = read_u32(value, "daysToArrival")?;
        }
    }
    Ok(())
}

fn malformed(value: &Value, field: &'static str) -> PartError {
    PartError::Malformed {
        field,
        value: value.to_string(),
    }
}

/// Integer from a JSON number or numeric string
pub(crate) fn read_int(value: &Value, field: &'static str) -> Result<i64, PartError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(value, field))
}

fn read_u32(value: &Value, field: &'static str) -> Result<u32, PartError> {
    u32::try_from(read_int(value, field)?).map_err(|_| malformed(value, field))
}

fn read_u64(value: &Value, field: &'static str) -> Result<u64, PartError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed(value, field))
}

fn read_string(value: &Value, field: &'static str) -> Result<String, PartError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| malformed(value, field))
}

/// Save the complete campaign to a writer
pub fn save_campaign<W: Write>(writer: W, campaign: &Campaign) -> Result<(), SaveError> {
    let units = campaign
        .world
        .query::<(&Unit, Option<&KfDrive>)>()
        .iter()
        .map(|(entity, (unit, drive))| SavedUnit {
            handle: entity.to_bits().get(),
            unit: unit.clone(),
            drive: drive.cloned(),
        })
        .collect();

    let save_data = SaveData {
        version: SAVE_VERSION,
        day: campaign.day,
        options: campaign.options.clone(),
        units,
        parts: campaign.parts().map(|(_, part)| write_part(part)).collect(),
    };

    serde_json::to_writer_pretty(writer, &save_data)?;
    Ok(())
}

/// Load a campaign from a reader
pub fn load_campaign<R: Read>(reader: R) -> Result<Campaign, SaveError> {
    let save_data: SaveData = serde_json::from_reader(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut campaign = Campaign::new(save_data.options);
    campaign.day = save_data.day;

    for saved in save_data.units {
        let handle =
            Entity::from_bits(saved.handle).ok_or(SaveError::BadUnitHandle(saved.handle))?;
        match saved.drive {
            Some(drive) => campaign.world.spawn_at(handle, (saved.unit, drive)),
            None => campaign.world.spawn_at(handle, (saved.unit,)),
        }
    }

    // Saved ids first, so freshly assigned ones cannot collide with them
    let mut unnumbered = Vec::new();
    for doc in &save_data.parts {
        let mut part = read_part(doc)?;
        if let Some(unit) = part.record().unit {
            if campaign.world.get::<&Unit>(unit).is_err() {
                warn!("{} refers to missing unit {:?}, loading it detached", part.name(), unit);
                part.record_mut().unit = None;
            }
        }
        match part.record().id {
            Some(id) => campaign.restore_part(id, part)?,
            None => unnumbered.push(part),
        }
    }
    for part in unnumbered {
        let transit_days = part.record().days_to_arrival;
        campaign.add_part(part, transit_days);
    }

    Ok(campaign)
}
