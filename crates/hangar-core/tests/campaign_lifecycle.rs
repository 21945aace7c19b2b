//! Integration tests for the full part lifecycle across a campaign.
//!
//! Exercises: install → host damage → sync/destruction → order replacement
//! → transit → replace → repair, with save/load in between.
//!
//! Dice outcomes are pinned by choosing destroy and technician targets that
//! 2d6 can never (or always) beat.

use hangar_core::prelude::*;
use hecs::Entity;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

const NEVER_DESTROY: u32 = 2;
const ALWAYS_DESTROY: u32 = 13;

fn fleet(destroy_part_target: u32, replacement_transit_days: u32) -> (Campaign, Entity, Entity) {
    let mut campaign = Campaign::new(CampaignOptions {
        destroy_part_target,
        replacement_transit_days,
    });
    let jumpship = campaign.spawn_vessel(
        Unit::new("Merchant", 80_000),
        KfDrive::new(CoreType::Standard, 6).with_lf_battery(),
    );
    let dropship = campaign.spawn_unit(Unit::new("Union", 3_500));
    (campaign, jumpship, dropship)
}

fn install_new_coil(campaign: &mut Campaign, ship: Entity) -> PartId {
    let coil = campaign.add_part(Box::new(KfDriveCoil::new(80_000, CoreType::Standard)), 0);
    assert!(install_part(campaign, coil, ship));
    coil
}

fn drive(campaign: &Campaign, ship: Entity) -> KfDrive {
    (*campaign.world.get::<&KfDrive>(ship).unwrap()).clone()
}

fn hit_coil(campaign: &Campaign, ship: Entity) {
    campaign
        .world
        .get::<&mut KfDrive>(ship)
        .unwrap()
        .set_coil_hit(true);
}

fn save_and_reload(campaign: &Campaign) -> Campaign {
    let mut buffer = Vec::new();
    campaign.save(&mut buffer).expect("save failed");
    Campaign::load(&buffer[..]).expect("load failed")
}

fn steady_hands() -> Technician {
    Technician::new("Rosa Kell", TechSkill::Vessel, -10)
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn destroyed_coil_is_replaced_after_transit() {
    let (mut campaign, jumpship, _) = fleet(ALWAYS_DESTROY, 3);
    let mut rng = StdRng::seed_from_u64(2024);
    let coil = install_new_coil(&mut campaign, jumpship);

    hit_coil(&campaign, jumpship);
    let outcomes = campaign.sync_conditions(&mut rng);
    assert_eq!(outcomes, vec![(coil, SyncOutcome::Destroyed)]);
    assert!(campaign.part(coil).is_none());
    assert!(drive(&campaign, jumpship).coil_hit());

    let slots = campaign.unit_parts(jumpship);
    assert_eq!(slots.len(), 1);
    let slot = slots[0];
    assert!(campaign.part(slot).unwrap().as_missing().is_some());
    assert_eq!(campaign.part(slot).unwrap().record().unit_tonnage, 80_000);

    // no spare on hand yet
    let outcome = perform_task(&mut campaign, slot, TaskMode::Repair, &steady_hands(), &mut rng);
    assert!(matches!(
        outcome,
        Some(TaskOutcome::Blocked(TaskBlocked::NoReplacement))
    ));

    let ordered = order_replacement(&mut campaign, slot).unwrap();
    assert_eq!(find_replacement(&campaign, slot), None);
    for _ in 0..3 {
        campaign.advance_day();
    }
    assert_eq!(find_replacement(&campaign, slot), Some(ordered));

    let outcome = perform_task(&mut campaign, slot, TaskMode::Repair, &steady_hands(), &mut rng);
    assert!(matches!(outcome, Some(TaskOutcome::Replaced(_, spare)) if spare == ordered));
    assert_eq!(campaign.unit_parts(jumpship), vec![ordered]);
    assert!(campaign.part(slot).is_none());
    assert!(!drive(&campaign, jumpship).coil_hit());
}

#[test]
fn damaged_coil_survives_save_and_is_repaired() {
    let (mut campaign, jumpship, _) = fleet(NEVER_DESTROY, 0);
    let mut rng = StdRng::seed_from_u64(7);
    let coil = install_new_coil(&mut campaign, jumpship);
    campaign
        .world
        .get::<&mut KfDrive>(jumpship)
        .unwrap()
        .damage_integrity(4);

    hit_coil(&campaign, jumpship);
    campaign.sync_conditions(&mut rng);
    assert_eq!(
        campaign.part(coil).unwrap().state(),
        PartState::AttachedDamaged
    );

    let mut campaign = save_and_reload(&campaign);
    let part = campaign.part(coil).unwrap();
    assert_eq!(part.record().hits, 1);
    assert_eq!(part.record().unit, Some(jumpship));
    assert!(drive(&campaign, jumpship).coil_hit());

    // a second sync after reload changes nothing
    assert_eq!(
        campaign.sync_conditions(&mut rng),
        vec![(coil, SyncOutcome::Unchanged)]
    );

    let outcome = perform_task(&mut campaign, coil, TaskMode::Repair, &steady_hands(), &mut rng);
    assert!(matches!(outcome, Some(TaskOutcome::Repaired(_))));
    let repaired = drive(&campaign, jumpship);
    assert!(!repaired.coil_hit());
    assert!(!repaired.is_drive_damaged());
    assert_eq!(repaired.integrity(), repaired.max_integrity());
}

#[test]
fn salvage_on_coil_scraps_and_leaves_placeholder() {
    let (mut campaign, jumpship, _) = fleet(NEVER_DESTROY, 0);
    let mut rng = StdRng::seed_from_u64(99);
    let coil = install_new_coil(&mut campaign, jumpship);
    let parts_before = campaign.part_count();

    let outcome = perform_task(&mut campaign, coil, TaskMode::Salvage, &steady_hands(), &mut rng);
    let Some(TaskOutcome::Salvaged(_, removal)) = outcome else {
        panic!("expected salvage, got {:?}", outcome);
    };

    let scrapped = removal.scrapped.expect("coils cannot be kept as spares");
    assert_eq!(scrapped.state(), PartState::Removed);
    assert!(campaign.part(coil).is_none());
    assert_eq!(campaign.part_count(), parts_before);
    assert_eq!(campaign.unit_parts(jumpship), vec![removal.placeholder.unwrap()]);
    assert!(drive(&campaign, jumpship).coil_hit());
}

#[test]
fn coil_on_dropship_is_inert() {
    let (mut campaign, _, dropship) = fleet(ALWAYS_DESTROY, 0);
    let mut rng = StdRng::seed_from_u64(5);
    let coil = campaign.add_part(Box::new(KfDriveCoil::new(3_500, CoreType::Standard)), 0);
    assert!(install_part(&mut campaign, coil, dropship));

    assert_eq!(
        campaign.sync_conditions(&mut rng),
        vec![(coil, SyncOutcome::Skipped)]
    );
    assert_eq!(
        campaign.part(coil).unwrap().state(),
        PartState::AttachedHealthy
    );
}

#[test]
fn task_costs_do_not_scale_with_damage() {
    let mut light = KfDriveCoil::new(80_000, CoreType::Compact);
    light.record_mut().hits = 1;
    let mut heavy = KfDriveCoil::new(80_000, CoreType::Compact);
    heavy.record_mut().hits = 4;

    for mode in [TaskMode::Repair, TaskMode::Salvage] {
        assert_eq!(estimate(&light, mode), estimate(&heavy, mode));
    }
    assert_eq!(light.sticker_price(), Money::of(800_000.0));
}

#[test]
fn mismatched_spare_is_refused() {
    let (mut campaign, jumpship, _) = fleet(NEVER_DESTROY, 0);
    let coil = install_new_coil(&mut campaign, jumpship);
    let slot = remove_part(&mut campaign, coil, false)
        .unwrap()
        .placeholder
        .unwrap();

    let compact = campaign.add_part(Box::new(KfDriveCoil::new(80_000, CoreType::Compact)), 0);
    assert_eq!(find_replacement(&campaign, slot), None);
    assert_eq!(
        replace_missing_part(&mut campaign, slot, compact),
        Err(ReplaceError::NotAcceptable(compact))
    );
    assert_eq!(campaign.unit_parts(jumpship), vec![slot]);
}
