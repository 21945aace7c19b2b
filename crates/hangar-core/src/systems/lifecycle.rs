//! Part lifecycle - install, damage sync with the host, fix, remove, replace
//!
//! ```text
//! Unattached --install--> Attached-Healthy <--pull/fix--> Attached-Damaged
//!                                  \                          /
//!                                   `-------- remove --------'--> Removed
//! ```
//!
//! A removed part leaves a missing-part placeholder in its slot. The
//! placeholder is later swapped for a spare with [`replace_missing_part`].

use hecs::{Entity, World};
use log::{debug, info, warn};
use rand::Rng;

use crate::campaign::Campaign;
use crate::components::{roll_2d6, PartId, TaskMode, Unit};
use crate::error::ReplaceError;
use crate::parts::Part;
use crate::systems::repair::{plan_task, TaskBlocked, TaskRoll, Technician};

/// What a pull sync did to a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Unknown part, not installed, or the host lacks the capability
    Skipped,
    Unchanged,
    /// Hits rose to match the host
    Damaged,
    /// Hits rose and the destruction roll removed the part
    Destroyed,
}

/// Result of a removal
#[derive(Debug)]
pub struct Removal {
    /// Placeholder now occupying the slot
    pub placeholder: Option<PartId>,
    /// The scrapped part, `None` when it was kept as a spare
    pub scrapped: Option<Box<dyn Part>>,
}

/// Result of a technician's work on a part
#[derive(Debug)]
pub enum TaskOutcome {
    Blocked(TaskBlocked),
    Failed(TaskRoll),
    Repaired(TaskRoll),
    Salvaged(TaskRoll, Removal),
    Replaced(TaskRoll, PartId),
}

/// Raise a part's hits to match its host; never lowers them
fn pull_condition(part: &mut dyn Part, world: &World) -> SyncOutcome {
    if part.record().unit.is_none() {
        return SyncOutcome::Skipped;
    }
    let Some(host_hits) = part.host_hits(world) else {
        debug!("{}: host has no matching capability, sync skipped", part.name());
        return SyncOutcome::Skipped;
    };

    let record = part.record_mut();
    if host_hits > record.hits {
        record.hits = host_hits;
        SyncOutcome::Damaged
    } else {
        SyncOutcome::Unchanged
    }
}

/// Whether `unit` already holds a part or placeholder for `slot`
fn slot_taken(campaign: &Campaign, unit: Entity, slot: &str) -> bool {
    campaign
        .unit_parts(unit)
        .iter()
        .filter_map(|other| campaign.parts.get(other))
        .any(|other| other.slot() == Some(slot))
}

/// Install an unattached, on-hand part on a unit.
///
/// Refused when the unit already fills the part's slot; an empty slot is
/// filled through [`replace_missing_part`] instead.
pub fn install_part(campaign: &mut Campaign, id: PartId, unit: Entity) -> bool {
    let Some(part) = campaign.parts.get(&id) else {
        return false;
    };
    let record = part.record();
    if record.unit.is_some() || record.removed || !record.is_present() {
        return false;
    }
    if let Some(slot) = part.slot() {
        if slot_taken(campaign, unit, slot) {
            debug!("{} ({:?}) not installed: {:?} already has one", part.name(), id, unit);
            return false;
        }
    }
    match campaign.world.get::<&mut Unit>(unit) {
        Ok(mut host) => host.add_part(id),
        Err(_) => return false,
    }

    let Some(part) = campaign.parts.get_mut(&id) else {
        return false;
    };
    part.record_mut().unit = Some(unit);
    pull_condition(&mut **part, &campaign.world);
    part.push_condition(&campaign.world);
    debug!("Installed {} ({:?}) on {:?}", part.name(), id, unit);
    true
}

/// Pull the host's damage into the part.
///
/// When hits rise and `check_for_destruction` is set, a 2d6 roll below the
/// campaign's destroy target removes the part outright.
pub fn update_condition_from_entity(
    campaign: &mut Campaign,
    id: PartId,
    check_for_destruction: bool,
    rng: &mut impl Rng,
) -> SyncOutcome {
    let destroy_target = campaign.options.destroy_part_target;
    let Some(part) = campaign.parts.get_mut(&id) else {
        return SyncOutcome::Skipped;
    };

    let outcome = pull_condition(&mut **part, &campaign.world);
    if outcome == SyncOutcome::Damaged && check_for_destruction {
        let roll = roll_2d6(rng);
        if roll < destroy_target {
            info!(
                "{} ({:?}) destroyed: rolled {} against {}",
                part.name(),
                id,
                roll,
                destroy_target
            );
            remove_part(campaign, id, false);
            return SyncOutcome::Destroyed;
        }
    }
    outcome
}

/// Push the part's condition into its host
pub fn update_condition_from_part(campaign: &mut Campaign, id: PartId) {
    if let Some(part) = campaign.parts.get(&id) {
        part.push_condition(&campaign.world);
    }
}

/// Clear the part's damage and credit the host's repair.
///
/// `check_fixable` is advisory and not consulted here.
pub fn fix_part(campaign: &mut Campaign, id: PartId) -> bool {
    let Some(part) = campaign.parts.get_mut(&id) else {
        return false;
    };
    if part.as_missing().is_some() || !part.needs_fixing() {
        return false;
    }

    part.record_mut().hits = 0;
    part.push_condition(&campaign.world);
    part.on_fixed(&campaign.world);
    info!("Fixed {} ({:?})", part.name(), id);
    true
}

/// Take a part off its unit, leaving a placeholder in the slot.
///
/// Variants that forbid salvage are scrapped whatever `salvage` says.
/// Returns `None` when the part is unknown, not installed, or a placeholder.
pub fn remove_part(campaign: &mut Campaign, id: PartId, salvage: bool) -> Option<Removal> {
    let part = campaign.parts.get(&id)?;
    if part.as_missing().is_some() {
        return None;
    }
    let Some(unit) = part.record().unit else {
        debug!("{} ({:?}) is not installed, nothing to remove", part.name(), id);
        return None;
    };
    let salvage = salvage && part.allows_salvage();

    part.flag_host_missing(&campaign.world);
    let missing = part.missing_part();

    // Detach from unit and campaign
    if let Ok(mut host) = campaign.world.get::<&mut Unit>(unit) {
        host.remove_part(id);
    }
    let mut scrapped = if salvage {
        None
    } else {
        campaign.take_part(id)
    };

    // Placeholder into both collections
    let placeholder = missing.map(|mut missing| {
        missing.record_mut().unit = Some(unit);
        let placeholder_id = campaign.add_part(missing, 0);
        if let Ok(mut host) = campaign.world.get::<&mut Unit>(unit) {
            host.add_part(placeholder_id);
        }
        placeholder_id
    });

    match scrapped.as_mut() {
        Some(part) => {
            let record = part.record_mut();
            record.unit = None;
            record.removed = true;
            pull_condition(&mut **part, &campaign.world);
            info!("Scrapped {} ({:?})", part.name(), id);
        }
        None => {
            if let Some(part) = campaign.parts.get_mut(&id) {
                part.record_mut().unit = None;
                pull_condition(&mut **part, &campaign.world);
                info!("Salvaged {} ({:?}) into inventory", part.name(), id);
            }
        }
    }

    Some(Removal {
        placeholder,
        scrapped,
    })
}

/// First on-hand, unattached spare the placeholder accepts
pub fn find_replacement(campaign: &Campaign, missing: PartId) -> Option<PartId> {
    let slot = campaign.parts.get(&missing)?.as_missing()?;
    campaign
        .parts
        .iter()
        .find(|(id, part)| {
            let record = part.record();
            **id != missing
                && record.unit.is_none()
                && record.is_present()
                && slot.is_acceptable_replacement(&***part)
        })
        .map(|(id, _)| *id)
}

/// Order a new part for the placeholder's slot
pub fn order_replacement(campaign: &mut Campaign, missing: PartId) -> Option<PartId> {
    let part = campaign.parts.get(&missing)?.as_missing()?.new_part();
    let transit_days = campaign.options.replacement_transit_days;
    let id = campaign.add_part(part, transit_days);
    info!(
        "Ordered replacement {:?} for {:?}, arriving in {} days",
        id, missing, transit_days
    );
    Some(id)
}

fn check_replacement(
    campaign: &Campaign,
    missing: PartId,
    spare: PartId,
) -> Result<Entity, ReplaceError> {
    let slot = campaign
        .parts
        .get(&missing)
        .ok_or(ReplaceError::UnknownPart(missing))?;
    let placeholder = slot.as_missing().ok_or(ReplaceError::NotMissing(missing))?;
    let unit = slot
        .record()
        .unit
        .ok_or(ReplaceError::NotInstalled(missing))?;

    let candidate = campaign
        .parts
        .get(&spare)
        .ok_or(ReplaceError::UnknownPart(spare))?;
    if candidate.record().unit.is_some() {
        return Err(ReplaceError::SpareInUse(spare));
    }
    if !candidate.record().is_present() {
        return Err(ReplaceError::NotArrived(spare));
    }
    if !placeholder.is_acceptable_replacement(&**candidate) {
        return Err(ReplaceError::NotAcceptable(spare));
    }
    Ok(unit)
}

/// Swap a placeholder for a spare from the inventory
pub fn replace_missing_part(
    campaign: &mut Campaign,
    missing: PartId,
    spare: PartId,
) -> Result<(), ReplaceError> {
    let unit = check_replacement(campaign, missing, spare).inspect_err(|e| {
        warn!("Cannot replace {:?} with {:?}: {}", missing, spare, e);
    })?;

    campaign.take_part(missing);
    if let Ok(mut host) = campaign.world.get::<&mut Unit>(unit) {
        host.remove_part(missing);
        host.add_part(spare);
    }
    if let Some(part) = campaign.parts.get_mut(&spare) {
        part.record_mut().unit = Some(unit);
        part.push_condition(&campaign.world);
        info!("Replaced {:?} with {} ({:?})", missing, part.name(), spare);
    }
    Ok(())
}

/// Have a technician work on a part: repair, salvage, or fill an empty slot
pub fn perform_task(
    campaign: &mut Campaign,
    id: PartId,
    mode: TaskMode,
    tech: &Technician,
    rng: &mut impl Rng,
) -> Option<TaskOutcome> {
    let part = campaign.parts.get(&id)?;
    let task = match plan_task(&**part, mode, tech) {
        Ok(task) => task,
        Err(blocked) => return Some(TaskOutcome::Blocked(blocked)),
    };

    let is_missing = part.as_missing().is_some();
    let spare = if is_missing {
        match find_replacement(campaign, id) {
            Some(spare) => Some(spare),
            None => return Some(TaskOutcome::Blocked(TaskBlocked::NoReplacement)),
        }
    } else {
        None
    };

    let roll = task.attempt(rng);
    if !roll.success {
        debug!(
            "{} failed on {:?}: rolled {} against {}",
            tech.name, id, roll.roll, roll.target
        );
        return Some(TaskOutcome::Failed(roll));
    }

    let outcome = match (mode, spare) {
        (_, Some(spare)) => {
            replace_missing_part(campaign, id, spare).ok()?;
            TaskOutcome::Replaced(roll, spare)
        }
        (TaskMode::Repair, None) => {
            fix_part(campaign, id);
            TaskOutcome::Repaired(roll)
        }
        (TaskMode::Salvage, None) => TaskOutcome::Salvaged(roll, remove_part(campaign, id, true)?),
    };
    Some(outcome)
}

/// Pull damage into every part installed on `unit`
pub fn sync_unit(
    campaign: &mut Campaign,
    unit: Entity,
    rng: &mut impl Rng,
) -> Vec<(PartId, SyncOutcome)> {
    campaign
        .unit_parts(unit)
        .into_iter()
        .map(|id| (id, update_condition_from_entity(campaign, id, true, rng)))
        .collect()
}

/// Pull damage into every installed part of every unit
pub fn sync_all(campaign: &mut Campaign, rng: &mut impl Rng) -> Vec<(PartId, SyncOutcome)> {
    let mut outcomes = Vec::new();
    for unit in campaign.units() {
        outcomes.extend(sync_unit(campaign, unit, rng));
    }
    outcomes
}
