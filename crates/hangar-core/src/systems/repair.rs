//! Repair-task estimator - time, difficulty and the technician's skill check
//!
//! Task cost depends on the part variant and the mode only, never on how
//! damaged the part is. Nothing here mutates a part.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{roll_2d6, TaskMode, TechSkill};
use crate::parts::Part;

/// Nominal cost of a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairEstimate {
    /// Labor minutes before skill adjustments
    pub base_time: u32,
    /// Modifier added to the technician's target number
    pub difficulty: i32,
}

/// The technician assigned to a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub name: String,
    pub skill: TechSkill,
    /// Base 2d6 target number for the technician's experience level
    pub target: i32,
}

impl Technician {
    pub fn new(name: impl Into<String>, skill: TechSkill, target: i32) -> Self {
        Self {
            name: name.into(),
            skill,
            target,
        }
    }
}

/// Why a task cannot be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskBlocked {
    #[error("{0}")]
    Unfixable(String),

    #[error("part does not need repair")]
    NothingToRepair,

    #[error("part is not installed on a unit")]
    NothingToSalvage,

    #[error("technician has the wrong specialty")]
    WrongTechType,

    #[error("no replacement part on hand")]
    NoReplacement,
}

/// A task ready to be rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairTask {
    pub mode: TaskMode,
    pub estimate: RepairEstimate,
    /// 2d6 roll needed to succeed
    pub target: i32,
}

/// Result of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRoll {
    pub roll: u32,
    pub target: i32,
    pub success: bool,
}

impl RepairTask {
    /// Roll 2d6 against the target number
    pub fn attempt(&self, rng: &mut impl Rng) -> TaskRoll {
        let roll = roll_2d6(rng);
        TaskRoll {
            roll,
            target: self.target,
            success: roll as i32 >= self.target,
        }
    }
}

/// Time and difficulty of a task on this part
pub fn estimate(part: &dyn Part, mode: TaskMode) -> RepairEstimate {
    RepairEstimate {
        base_time: part.base_time(mode),
        difficulty: part.difficulty(mode),
    }
}

/// Check whether `tech` can start the task and work out the target number
pub fn plan_task(
    part: &dyn Part,
    mode: TaskMode,
    tech: &Technician,
) -> Result<RepairTask, TaskBlocked> {
    if let Some(reason) = part.check_fixable() {
        return Err(TaskBlocked::Unfixable(reason));
    }
    if !part.is_right_tech_type(tech.skill) {
        return Err(TaskBlocked::WrongTechType);
    }
    match mode {
        TaskMode::Repair if !part.needs_fixing() => return Err(TaskBlocked::NothingToRepair),
        TaskMode::Salvage if part.record().unit.is_none() || part.as_missing().is_some() => {
            return Err(TaskBlocked::NothingToSalvage)
        }
        _ => {}
    }

    let estimate = estimate(part, mode);
    Ok(RepairTask {
        mode,
        estimate,
        target: tech.target + estimate.difficulty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CoreType;
    use crate::parts::{KfDriveCoil, MissingKfDriveCoil};
    use hecs::World;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vessel_tech() -> Technician {
        Technician::new("Chief Okafor", TechSkill::Vessel, 7)
    }

    #[test]
    fn test_estimate_ignores_damage_magnitude() {
        let mut lightly = KfDriveCoil::new(50_000, CoreType::Standard);
        lightly.record_mut().hits = 1;
        let mut heavily = KfDriveCoil::new(50_000, CoreType::Standard);
        heavily.record_mut().hits = 3;

        for mode in [TaskMode::Repair, TaskMode::Salvage] {
            assert_eq!(estimate(&lightly, mode), estimate(&heavily, mode));
        }
        assert_eq!(
            estimate(&lightly, TaskMode::Repair),
            RepairEstimate {
                base_time: 4800,
                difficulty: 5
            }
        );
    }

    #[test]
    fn test_plan_repair_adds_difficulty() {
        let mut coil = KfDriveCoil::new(50_000, CoreType::Standard);
        coil.record_mut().hits = 1;

        let task = plan_task(&coil, TaskMode::Repair, &vessel_tech()).unwrap();
        assert_eq!(task.target, 12);
        assert_eq!(task.estimate.base_time, 4800);
    }

    #[test]
    fn test_plan_blocks_undamaged_repair() {
        let coil = KfDriveCoil::new(50_000, CoreType::Standard);
        assert_eq!(
            plan_task(&coil, TaskMode::Repair, &vessel_tech()),
            Err(TaskBlocked::NothingToRepair)
        );
    }

    #[test]
    fn test_plan_blocks_wrong_specialty() {
        let mut coil = KfDriveCoil::new(50_000, CoreType::Standard);
        coil.record_mut().hits = 1;
        let aero = Technician::new("Lt. Vance", TechSkill::Aero, 5);
        assert_eq!(
            plan_task(&coil, TaskMode::Repair, &aero),
            Err(TaskBlocked::WrongTechType)
        );
    }

    #[test]
    fn test_plan_salvage_needs_installed_part() {
        let mut world = World::new();
        let ship = world.spawn(());
        let mut coil = KfDriveCoil::new(50_000, CoreType::Standard);
        assert_eq!(
            plan_task(&coil, TaskMode::Salvage, &vessel_tech()),
            Err(TaskBlocked::NothingToSalvage)
        );

        coil.record_mut().unit = Some(ship);
        let task = plan_task(&coil, TaskMode::Salvage, &vessel_tech()).unwrap();
        assert_eq!(task.target, 9);
        assert_eq!(task.estimate.base_time, 28800);

        let mut missing = MissingKfDriveCoil::new(50_000, CoreType::Standard);
        missing.record_mut().unit = Some(ship);
        assert_eq!(
            plan_task(&missing, TaskMode::Salvage, &vessel_tech()),
            Err(TaskBlocked::NothingToSalvage)
        );
    }

    #[test]
    fn test_attempt_against_extreme_targets() {
        let mut rng = StdRng::seed_from_u64(42);
        let easy = RepairTask {
            mode: TaskMode::Repair,
            estimate: RepairEstimate {
                base_time: 4800,
                difficulty: 5,
            },
            target: 2,
        };
        let impossible = RepairTask { target: 13, ..easy };

        for _ in 0..50 {
            assert!(easy.attempt(&mut rng).success);
            assert!(!impossible.attempt(&mut rng).success);
        }
    }
}
