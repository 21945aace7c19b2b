//! Common components used across parts and units.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Campaign-assigned identity of a part in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId(pub u32);

/// A single price figure in C-bills
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Money(pub f64);

impl Money {
    pub fn of(amount: f64) -> Self {
        Self(amount)
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl std::ops::Add for Money {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} C-bills", self.0)
    }
}

/// Which kind of work a technician is doing on a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskMode {
    Repair,
    Salvage,
}

impl TaskMode {
    pub fn is_salvaging(self) -> bool {
        self == TaskMode::Salvage
    }
}

/// Technology rating, A (primitive) through F (cutting edge), X unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechRating {
    A,
    B,
    C,
    D,
    E,
    F,
    X,
}

/// Technician specialties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechSkill {
    Mek,
    Mechanic,
    Aero,
    BattleArmor,
    Vessel,
}

/// Roll two six-sided dice
pub fn roll_2d6(rng: &mut impl Rng) -> u32 {
    rng.gen_range(1..=6) + rng.gen_range(1..=6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_2d6_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let roll = roll_2d6(&mut rng);
            assert!((2..=12).contains(&roll));
        }
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::of(500000.0).to_string(), "500000.00 C-bills");
        assert_eq!((Money::of(1.5) + Money::of(2.0)).amount(), 3.5);
    }
}
