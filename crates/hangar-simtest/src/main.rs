//! Hangar Headless Scenario Harness
//!
//! Drives the part lifecycle against simulated JumpShips and checks the
//! invariants that must hold after every step. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p hangar-simtest
//!   cargo run -p hangar-simtest -- --verbose
//!   cargo run -p hangar-simtest -- --options campaign_options.json

use hangar_core::persistence::{read_part, write_part};
use hangar_core::prelude::*;
use hecs::Entity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const SEED: u64 = 3025;
const SOAK_DAYS: u32 = 120;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    println!("=== Hangar Scenario Harness ===\n");

    let options = match options_from_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Failed to load campaign options: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Part contract
    results.extend(validate_part_contract(verbose));

    // 2. Host synchronization
    results.extend(validate_host_sync(&options, verbose));

    // 3. Removal and replacement
    results.extend(validate_removal(&options, verbose));

    // 4. Repair-task estimator
    results.extend(validate_estimator(verbose));

    // 5. Persistence codec
    results.extend(validate_persistence(&options, verbose));

    // 6. Multi-ship campaign soak
    results.extend(validate_campaign_soak(&options, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn options_from_args(args: &[String]) -> Result<CampaignOptions, SaveError> {
    match args.iter().position(|a| a == "--options") {
        Some(i) => match args.get(i + 1) {
            Some(path) => CampaignOptions::from_json_file(path),
            None => Ok(CampaignOptions::default()),
        },
        None => Ok(CampaignOptions::default()),
    }
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn jumpship(campaign: &mut Campaign, name: &str, tonnage: u32) -> (Entity, PartId) {
    let ship = campaign.spawn_vessel(
        Unit::new(name, tonnage),
        KfDrive::new(CoreType::Standard, 6),
    );
    let coil = campaign.add_part(Box::new(KfDriveCoil::new(tonnage, CoreType::Standard)), 0);
    install_part(campaign, coil, ship);
    (ship, coil)
}

fn coil_flag(campaign: &Campaign, ship: Entity) -> Option<bool> {
    campaign
        .world
        .get::<&KfDrive>(ship)
        .ok()
        .map(|drive| drive.coil_hit())
}

fn with_target(options: &CampaignOptions, destroy_part_target: u32) -> CampaignOptions {
    CampaignOptions {
        destroy_part_target,
        ..options.clone()
    }
}

// ── 1. Part Contract ────────────────────────────────────────────────────

fn validate_part_contract(_verbose: bool) -> Vec<TestResult> {
    println!("--- Part Contract ---");
    let mut results = Vec::new();

    let coil = KfDriveCoil::new(50_000, CoreType::Standard);
    results.push(check(
        "coil_sticker_price",
        coil.sticker_price() == Money::of(500_000.0),
        format!("50000-ton coil costs {}", coil.sticker_price()),
    ));

    results.push(check(
        "coil_vessel_tech_only",
        coil.is_right_tech_type(TechSkill::Vessel) && !coil.is_right_tech_type(TechSkill::Aero),
        "only vessel techs work on coils",
    ));

    results.push(check(
        "coil_forbids_salvage",
        !coil.allows_salvage(),
        "coils cannot be salvaged as spares",
    ));

    let mut copy = coil.clone_part();
    copy.record_mut().hits = 2;
    results.push(check(
        "clone_is_independent",
        coil.record().hits == 0 && copy.is_same_part_type(&coil),
        "copy shares type but not state",
    ));

    let compact = KfDriveCoil::new(50_000, CoreType::Compact);
    results.push(check(
        "core_type_distinguishes",
        !coil.is_same_part_type(&compact),
        "standard and compact coils are different part types",
    ));

    let missing = coil.missing_part();
    let accepts = missing
        .as_ref()
        .and_then(|m| m.as_missing())
        .map(|m| m.is_acceptable_replacement(&coil) && !m.is_acceptable_replacement(&compact))
        .unwrap_or(false);
    results.push(check(
        "placeholder_accepts_matching_coil",
        accepts,
        "placeholder takes same core type and tonnage only",
    ));

    results
}

// ── 2. Host Synchronization ─────────────────────────────────────────────

fn validate_host_sync(options: &CampaignOptions, verbose: bool) -> Vec<TestResult> {
    println!("--- Host Synchronization ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED);

    let mut campaign = Campaign::new(with_target(options, 2));
    let (ship, coil) = jumpship(&mut campaign, "Tramp", 50_000);

    if let Ok(mut drive) = campaign.world.get::<&mut KfDrive>(ship) {
        drive.set_coil_hit(true);
    }
    let first = update_condition_from_entity(&mut campaign, coil, true, &mut rng);
    let second = update_condition_from_entity(&mut campaign, coil, true, &mut rng);
    results.push(check(
        "pull_idempotent",
        first == SyncOutcome::Damaged && second == SyncOutcome::Unchanged,
        format!("first {:?}, second {:?}", first, second),
    ));

    let fixed = fix_part(&mut campaign, coil);
    results.push(check(
        "fix_clears_host",
        fixed && coil_flag(&campaign, ship) == Some(false),
        format!("host coil flag after fix: {:?}", coil_flag(&campaign, ship)),
    ));

    let dropship = campaign.spawn_unit(Unit::new("Leopard", 1_900));
    let stray = campaign.add_part(Box::new(KfDriveCoil::new(1_900, CoreType::Standard)), 0);
    install_part(&mut campaign, stray, dropship);
    let outcome = update_condition_from_entity(&mut campaign, stray, true, &mut rng);
    results.push(check(
        "incompatible_host_noop",
        outcome == SyncOutcome::Skipped,
        "coil on a DropShip ignores sync",
    ));

    // destruction rate against the configured target
    let trials = 200;
    let mut destroyed = 0;
    for i in 0..trials {
        let mut campaign = Campaign::new(options.clone());
        let (ship, coil) = jumpship(&mut campaign, &format!("Trial {}", i), 50_000);
        if let Ok(mut drive) = campaign.world.get::<&mut KfDrive>(ship) {
            drive.set_coil_hit(true);
        }
        if update_condition_from_entity(&mut campaign, coil, true, &mut rng)
            == SyncOutcome::Destroyed
        {
            destroyed += 1;
        }
    }
    let rate = destroyed as f64 / trials as f64;
    if verbose {
        println!(
            "    destroy target {}: {}/{} destroyed ({:.0}%)",
            options.destroy_part_target,
            destroyed,
            trials,
            rate * 100.0
        );
    }
    let expected = destroy_probability(options.destroy_part_target);
    results.push(check(
        "destruction_rate",
        (rate - expected).abs() < 0.12,
        format!("{:.2} observed vs {:.2} expected", rate, expected),
    ));

    results
}

/// Chance that 2d6 rolls below `target`
fn destroy_probability(target: u32) -> f64 {
    let mut below = 0;
    for a in 1..=6 {
        for b in 1..=6 {
            if a + b < target {
                below += 1;
            }
        }
    }
    below as f64 / 36.0
}

// ── 3. Removal and Replacement ──────────────────────────────────────────

fn validate_removal(options: &CampaignOptions, _verbose: bool) -> Vec<TestResult> {
    println!("--- Removal and Replacement ---");
    let mut results = Vec::new();

    // salvage and scrap produce the same end state for coils
    let mut end_states = Vec::new();
    for salvage in [true, false] {
        let mut campaign = Campaign::new(options.clone());
        let (ship, coil) = jumpship(&mut campaign, "Scout", 40_000);
        let removal = remove_part(&mut campaign, coil, salvage);
        let placeholder = removal.as_ref().and_then(|r| r.placeholder);
        end_states.push((
            campaign.part(coil).is_none(),
            placeholder.map(|p| campaign.unit_parts(ship) == vec![p]),
            coil_flag(&campaign, ship),
            removal.map(|r| r.scrapped.is_some()),
        ));
    }
    results.push(check(
        "remove_salvage_equals_scrap",
        end_states[0] == end_states[1]
            && end_states[0] == (true, Some(true), Some(true), Some(true)),
        format!("{:?}", end_states[0]),
    ));

    let mut campaign = Campaign::new(options.clone());
    let (ship, coil) = jumpship(&mut campaign, "Merchant", 80_000);
    let slot = remove_part(&mut campaign, coil, false).and_then(|r| r.placeholder);
    let Some(slot) = slot else {
        results.push(check("placeholder_created", false, "no placeholder"));
        return results;
    };

    let ordered = order_replacement(&mut campaign, slot);
    let mut days = 0;
    while find_replacement(&campaign, slot).is_none() && days < 365 {
        campaign.advance_day();
        days += 1;
    }
    results.push(check(
        "order_arrives",
        days == options.replacement_transit_days && find_replacement(&campaign, slot) == ordered,
        format!("replacement on hand after {} days", days),
    ));

    let replaced = ordered.map(|spare| replace_missing_part(&mut campaign, slot, spare));
    results.push(check(
        "replacement_fills_slot",
        replaced == Some(Ok(())) && ordered.map(|s| campaign.unit_parts(ship) == vec![s]) == Some(true),
        format!("unit parts now {:?}", campaign.unit_parts(ship)),
    ));
    results.push(check(
        "replacement_clears_host",
        coil_flag(&campaign, ship) == Some(false),
        "fresh coil leaves the drive healthy",
    ));

    results
}

// ── 4. Repair-Task Estimator ────────────────────────────────────────────

fn validate_estimator(_verbose: bool) -> Vec<TestResult> {
    println!("--- Repair-Task Estimator ---");
    let mut results = Vec::new();

    let estimates: Vec<_> = (1..=5)
        .map(|hits| {
            let mut coil = KfDriveCoil::new(60_000, CoreType::Standard);
            coil.record_mut().hits = hits;
            (
                estimate(&coil, TaskMode::Repair),
                estimate(&coil, TaskMode::Salvage),
            )
        })
        .collect();
    results.push(check(
        "estimate_fixed_per_mode",
        estimates.windows(2).all(|w| w[0] == w[1]),
        format!(
            "repair {} min, salvage {} min",
            estimates[0].0.base_time, estimates[0].1.base_time
        ),
    ));

    let healthy = KfDriveCoil::new(60_000, CoreType::Standard);
    let tech = Technician::new("Ensign Marek", TechSkill::Vessel, 7);
    results.push(check(
        "plan_blocks_healthy_repair",
        plan_task(&healthy, TaskMode::Repair, &tech) == Err(TaskBlocked::NothingToRepair),
        "healthy coil has nothing to repair",
    ));

    results
}

// ── 5. Persistence Codec ────────────────────────────────────────────────

fn validate_persistence(options: &CampaignOptions, _verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence Codec ---");
    let mut results = Vec::new();

    let mut coil = KfDriveCoil::new(70_000, CoreType::Subcompact);
    coil.record_mut().hits = 1;
    let doc = write_part(&coil);
    let loaded = read_part(&doc);
    results.push(check(
        "part_roundtrip",
        loaded
            .as_ref()
            .map(|p| p.record() == coil.record() && p.is_same_part_type(&coil))
            .unwrap_or(false),
        doc.to_string(),
    ));

    let mut noisy = doc.clone();
    if let Some(map) = noisy.as_object_mut() {
        map.insert("refitClass".into(), json!("B"));
    }
    results.push(check(
        "unknown_key_ignored",
        read_part(&noisy).map(|p| write_part(p.as_ref()) == doc).unwrap_or(false),
        "extra key does not change the loaded part",
    ));

    let malformed = json!({ "type": "KfDriveCoil", "coreType": "fusion" });
    results.push(check(
        "malformed_rejected",
        read_part(&malformed).is_err(),
        "non-numeric core type fails the load",
    ));

    let mut campaign = Campaign::new(options.clone());
    let (ship, _) = jumpship(&mut campaign, "Star Lord", 100_000);
    let mut buffer = Vec::new();
    let reloaded = campaign
        .save(&mut buffer)
        .and_then(|_| Campaign::load(&buffer[..]));
    match reloaded {
        Ok(reloaded) => results.push(check(
            "campaign_roundtrip",
            reloaded.unit_parts(ship) == campaign.unit_parts(ship)
                && reloaded.part_count() == campaign.part_count(),
            format!("{} bytes", buffer.len()),
        )),
        Err(e) => results.push(check("campaign_roundtrip", false, e.to_string())),
    }

    results
}

// ── 6. Campaign Soak ────────────────────────────────────────────────────

fn validate_campaign_soak(options: &CampaignOptions, verbose: bool) -> Vec<TestResult> {
    println!("--- Campaign Soak ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut campaign = Campaign::new(options.clone());

    let ships: Vec<Entity> = ["Invader", "Merchant", "Scout", "Tramp"]
        .iter()
        .map(|name| jumpship(&mut campaign, name, 50_000 + rng.gen_range(0..10) * 10_000).0)
        .collect();
    let tech = Technician::new("Chief Adeyemi", TechSkill::Vessel, 6);

    let mut destroyed = 0;
    let mut replaced = 0;
    let mut repaired = 0;
    let mut violations = Vec::new();

    for day in 0..SOAK_DAYS {
        // jump misfires
        for &ship in &ships {
            if rng.gen_bool(0.1) {
                if let Ok(mut drive) = campaign.world.get::<&mut KfDrive>(ship) {
                    drive.set_coil_hit(true);
                }
            }
        }

        for (_, outcome) in campaign.sync_conditions(&mut rng) {
            if outcome == SyncOutcome::Destroyed {
                destroyed += 1;
            }
        }

        for &ship in &ships {
            for id in campaign.unit_parts(ship) {
                let is_missing = campaign
                    .part(id)
                    .map(|p| p.as_missing().is_some())
                    .unwrap_or(false);
                if is_missing
                    && find_replacement(&campaign, id).is_none()
                    && !replacement_on_order(&campaign, id)
                {
                    order_replacement(&mut campaign, id);
                }
                match perform_task(&mut campaign, id, TaskMode::Repair, &tech, &mut rng) {
                    Some(TaskOutcome::Replaced(..)) => replaced += 1,
                    Some(TaskOutcome::Repaired(_)) => repaired += 1,
                    _ => {}
                }
            }
        }

        violations.extend(check_invariants(&campaign, &ships, day));
        campaign.advance_day();
    }

    if verbose {
        println!(
            "    {} days: {} destroyed, {} replaced, {} repaired",
            SOAK_DAYS, destroyed, replaced, repaired
        );
    }

    results.push(check(
        "soak_invariants",
        violations.is_empty(),
        if violations.is_empty() {
            format!("{} days without violations", SOAK_DAYS)
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    ));
    results.push(check(
        "soak_one_coil_slot_per_ship",
        ships.iter().all(|&s| campaign.unit_parts(s).len() == 1),
        "every ship has exactly one coil or placeholder",
    ));

    results
}

/// An ordered spare for this slot is still in transit
fn replacement_on_order(campaign: &Campaign, slot: PartId) -> bool {
    let Some(placeholder) = campaign.part(slot).and_then(|p| p.as_missing()) else {
        return false;
    };
    campaign.parts().any(|(_, part)| {
        part.record().unit.is_none()
            && !part.record().is_present()
            && placeholder.is_acceptable_replacement(part)
    })
}

fn check_invariants(campaign: &Campaign, ships: &[Entity], day: u32) -> Vec<String> {
    let mut violations = Vec::new();
    for &ship in ships {
        for id in campaign.unit_parts(ship) {
            let Some(part) = campaign.part(id) else {
                violations.push(format!("day {}: {:?} listed but not in inventory", day, id));
                continue;
            };
            if part.record().unit != Some(ship) {
                violations.push(format!("day {}: {:?} does not point back to its unit", day, id));
            }
            if part.as_missing().is_some() && coil_flag(campaign, ship) != Some(true) {
                violations.push(format!("day {}: empty slot but coil flag clear", day));
            }
        }
    }
    for (id, part) in campaign.parts() {
        if let Some(unit) = part.record().unit {
            if !campaign.unit_parts(unit).contains(&id) {
                violations.push(format!("day {}: {:?} points at a unit that lacks it", day, id));
            }
        }
    }
    violations
}
