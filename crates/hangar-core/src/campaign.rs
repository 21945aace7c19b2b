//! Campaign - owner of the part inventory and the world of units

use hecs::{Entity, World};
use log::debug;
use rand::Rng;
use std::collections::BTreeMap;

use crate::components::*;
use crate::error::SaveError;
use crate::options::CampaignOptions;
use crate::parts::Part;
use crate::systems::{sync_all, SyncOutcome};

/// Main campaign state
pub struct Campaign {
    /// ECS world containing units and their simulated state
    pub world: World,
    /// Ruleset options
    pub options: CampaignOptions,
    /// Days elapsed since the campaign started
    pub day: u32,
    /// Part inventory, the sole long-lived owner of every part
    pub(crate) parts: BTreeMap<PartId, Box<dyn Part>>,
    next_part_id: u32,
}

impl Campaign {
    /// Create an empty campaign
    pub fn new(options: CampaignOptions) -> Self {
        Self {
            world: World::new(),
            options,
            day: 0,
            parts: BTreeMap::new(),
            next_part_id: 1,
        }
    }

    /// Add a unit with no K-F drive (DropShips, fighters, Meks)
    pub fn spawn_unit(&mut self, unit: Unit) -> Entity {
        self.world.spawn((unit,))
    }

    /// Add a jump-capable vessel
    pub fn spawn_vessel(&mut self, unit: Unit, drive: KfDrive) -> Entity {
        self.world.spawn((unit, drive))
    }

    /// Add a part to the inventory; it is on hand after `transit_days`
    pub fn add_part(&mut self, mut part: Box<dyn Part>, transit_days: u32) -> PartId {
        let id = self.allocate_id();

        let record = part.record_mut();
        record.id = Some(id);
        record.days_to_arrival = transit_days;
        self.parts.insert(id, part);
        id
    }

    /// Next free id below `u32::MAX`. Once the counter runs out, the lowest
    /// gap left by parts that have since left the inventory is reused.
    fn allocate_id(&mut self) -> PartId {
        if self.next_part_id < u32::MAX {
            let id = PartId(self.next_part_id);
            self.next_part_id += 1;
            return id;
        }
        let mut candidate = 1;
        for id in self.parts.keys().filter(|id| id.0 >= 1) {
            if id.0 != candidate {
                break;
            }
            candidate += 1;
        }
        PartId(candidate)
    }

    /// Re-insert a part that already carries an id (used when loading).
    ///
    /// `u32::MAX` is never handed out, so a saved part cannot claim it.
    pub(crate) fn restore_part(&mut self, id: PartId, part: Box<dyn Part>) -> Result<(), SaveError> {
        let next = id.0.checked_add(1).ok_or(SaveError::BadPartId(id.0))?;
        if self.parts.contains_key(&id) {
            return Err(SaveError::DuplicatePartId(id.0));
        }
        self.next_part_id = self.next_part_id.max(next);
        self.parts.insert(id, part);
        Ok(())
    }

    /// Remove a part from the inventory, handing ownership to the caller
    pub fn take_part(&mut self, id: PartId) -> Option<Box<dyn Part>> {
        self.parts.remove(&id)
    }

    pub fn part(&self, id: PartId) -> Option<&dyn Part> {
        self.parts.get(&id).map(|part| &**part)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut (dyn Part + 'static)> {
        self.parts.get_mut(&id).map(|part| &mut **part)
    }

    pub fn parts(&self) -> impl Iterator<Item = (PartId, &(dyn Part + 'static))> + '_ {
        self.parts.iter().map(|(id, part)| (*id, &**part))
    }

    /// Count parts in the inventory
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Parts installed on a unit, empty if the entity is not a unit
    pub fn unit_parts(&self, unit: Entity) -> Vec<PartId> {
        self.world
            .get::<&Unit>(unit)
            .map(|u| u.parts.clone())
            .unwrap_or_default()
    }

    /// Count units
    pub fn unit_count(&self) -> usize {
        self.world.query::<&Unit>().iter().count()
    }

    /// All unit entities
    pub fn units(&self) -> Vec<Entity> {
        self.world
            .query::<&Unit>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Advance one day; parts in transit come closer to arriving
    pub fn advance_day(&mut self) {
        self.day += 1;
        for (id, part) in self.parts.iter_mut() {
            let record = part.record_mut();
            if record.days_to_arrival > 0 {
                record.days_to_arrival -= 1;
                if record.days_to_arrival == 0 {
                    debug!("Part {:?} ({}) arrived", id, record.name);
                }
            }
        }
    }

    /// Pull damage from every unit into its installed parts
    pub fn sync_conditions(&mut self, rng: &mut impl Rng) -> Vec<(PartId, SyncOutcome)> {
        sync_all(self, rng)
    }

    /// Save campaign state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        crate::persistence::save_campaign(writer, self)
    }

    /// Load campaign state from a reader
    pub fn load<R: std::io::Read>(reader: R) -> Result<Self, SaveError> {
        crate::persistence::load_campaign(reader)
    }
}

impl Default for Campaign {
    fn default() -> Self {
        Self::new(CampaignOptions::default())
    }
}
