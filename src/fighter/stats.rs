//! Per-fighter fight statistics, kept for the whole match

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FightStats {
    pub punches_thrown: u32,
    pub punches_landed: u32,
    pub hits_taken: u32,
    pub blocks_successful: u32,
    pub dodges_successful: u32,
    pub counters_landed: u32,
    pub crits_landed: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub max_combo: u32,
    pub knockdowns: u32,
}

impl FightStats {
    pub fn record_throw(&mut self) {
        self.punches_thrown += 1;
    }

    /// Attacker side of a connected strike (blocked hits count as landed)
    pub fn record_landed(&mut self, damage: u32, combo: u32, countered: bool, critical: bool) {
        self.punches_landed += 1;
        self.damage_dealt += damage;
        self.max_combo = self.max_combo.max(combo);
        if countered {
            self.counters_landed += 1;
        }
        if critical {
            self.crits_landed += 1;
        }
    }

    /// Defender side of a connected strike
    pub fn record_taken(&mut self, damage: u32, blocked: bool) {
        self.hits_taken += 1;
        self.damage_taken += damage;
        if blocked {
            self.blocks_successful += 1;
        }
    }

    pub fn record_dodge(&mut self) {
        self.dodges_successful += 1;
    }

    /// Landed / thrown, 0.0 before the first punch
    pub fn accuracy(&self) -> f32 {
        if self.punches_thrown == 0 {
            0.0
        } else {
            self.punches_landed as f32 / self.punches_thrown as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let mut stats = FightStats::default();
        assert_eq!(stats.accuracy(), 0.0);

        stats.record_throw();
        stats.record_throw();
        stats.record_landed(10, 1, false, false);
        assert!((stats.accuracy() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_max_combo_is_high_water_mark() {
        let mut stats = FightStats::default();
        stats.record_landed(10, 3, false, false);
        stats.record_landed(10, 1, true, true);
        assert_eq!(stats.max_combo, 3);
        assert_eq!(stats.counters_landed, 1);
        assert_eq!(stats.crits_landed, 1);
        assert_eq!(stats.damage_dealt, 20);
    }
}
