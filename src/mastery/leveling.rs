//! Contains the business logic for mastery progression and leveling.
//! The same curve drives a quest's own mastery track and the account-wide track.

/// The first level of every mastery track.
pub const BASE_LEVEL: i32 = 1;

/// Calculates the XP required to advance past `level`.
///
/// Defined as `ceil(level * 10 * 1.2)`, evaluated in tenths so the result is exact.
pub fn threshold_for(level: i32) -> i32 {
    let tenths = level.max(BASE_LEVEL).saturating_mul(10).saturating_mul(12);
    tenths.saturating_add(9) / 10
}

/// A resolved `(level, xp)` pair. `xp` is always below `threshold_for(level)` once
/// it has passed through [`apply_xp_gain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mastery {
    pub level: i32,
    pub xp: i32,
}

impl Default for Mastery {
    fn default() -> Self {
        Self {
            level: BASE_LEVEL,
            xp: 0,
        }
    }
}

impl Mastery {
    pub fn new(level: i32, xp: i32) -> Self {
        Self { level, xp }
    }

    /// XP needed to leave the current level.
    pub fn threshold(&self) -> i32 {
        threshold_for(self.level)
    }

    /// Fraction of the current level already earned, in `[0, 1)`.
    pub fn progress(&self) -> f64 {
        let threshold = self.threshold();
        if threshold <= 0 {
            return 0.0;
        }
        (self.xp.max(0) as f64 / threshold as f64).clamp(0.0, 1.0)
    }
}

/// A struct to hold the results of a mastery track gaining XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpResult {
    pub mastery: Mastery,
    pub levels_gained: i32,
    pub did_level_up: bool,
}

/// Deposits `gain` XP into a track and resolves every level-up it pays for.
pub fn apply_xp_gain(current: Mastery, gain: i32) -> LevelUpResult {
    let start_level = current.level.max(BASE_LEVEL);
    let mut new_level = start_level;
    let mut new_xp = current.xp.max(0).saturating_add(gain.max(0));

    let mut xp_needed = threshold_for(new_level);
    while new_xp >= xp_needed {
        new_xp -= xp_needed;
        new_level += 1;
        xp_needed = threshold_for(new_level);
    }

    LevelUpResult {
        mastery: Mastery::new(new_level, new_xp),
        levels_gained: new_level - start_level,
        did_level_up: new_level > start_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_the_curve() {
        assert_eq!(threshold_for(1), 12);
        assert_eq!(threshold_for(2), 24);
        assert_eq!(threshold_for(3), 36);
        assert_eq!(threshold_for(10), 120);
    }

    #[test]
    fn levels_below_one_use_the_base_threshold() {
        assert_eq!(threshold_for(0), threshold_for(1));
        assert_eq!(threshold_for(-4), threshold_for(1));
    }

    #[test]
    fn fifty_xp_from_level_one_overflows_twice() {
        let res = apply_xp_gain(Mastery::new(1, 10), 50);
        assert_eq!(res.mastery, Mastery::new(3, 24));
        assert_eq!(res.levels_gained, 2);
        assert!(res.did_level_up);
    }

    #[test]
    fn small_gain_stays_on_level() {
        let res = apply_xp_gain(Mastery::new(4, 5), 10);
        assert_eq!(res.mastery, Mastery::new(4, 15));
        assert!(!res.did_level_up);
    }

    #[test]
    fn zero_gain_is_identity_for_resolved_tracks() {
        let m = Mastery::new(2, 23);
        assert_eq!(apply_xp_gain(m, 0).mastery, m);
    }

    #[test]
    fn exact_threshold_levels_up_with_no_residue() {
        let res = apply_xp_gain(Mastery::new(1, 0), 12);
        assert_eq!(res.mastery, Mastery::new(2, 0));
    }

    #[test]
    fn progress_ratio() {
        assert_eq!(Mastery::new(1, 6).progress(), 0.5);
        assert_eq!(Mastery::default().progress(), 0.0);
    }
}
