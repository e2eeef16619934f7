//! Per-wave enemy selection
//!
//! Waves 1-7 use hand-authored distributions; later waves generate their
//! profile from the wave number. Selection is driven by a caller-supplied
//! RNG so runs stay reproducible under a fixed seed.

use rand::Rng;

use crate::blueprint::{
    EnemyArchetype, ScaledEnemyStats, ScalingOverrides, SpecialAbility, apply_scaling,
    archetype_by_id, bomber_damage_for_wave,
};

/// Base-tier names used by the legacy wave tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseTier {
    Weak,
    Medium,
    Strong,
}

impl BaseTier {
    /// Map legacy tier names to archetype ids
    pub fn archetype_id(self) -> &'static str {
        match self {
            BaseTier::Weak => "common",
            BaseTier::Medium => "intermediate",
            BaseTier::Strong => "elite",
        }
    }
}

/// Per-wave spawn distribution
#[derive(Debug, Clone, PartialEq)]
pub struct WaveProfile {
    pub weak: f32,
    pub medium: f32,
    pub strong: f32,
    /// Probability that a spawn is drawn from the special pool instead
    pub special_chance: f32,
    /// Weighted special pool (archetype id, weight); may be empty early on
    pub special_pool: Vec<(&'static str, f32)>,
    /// Probability that a non-weak base spawn is promoted to elite
    pub elite_chance: f32,
}

impl WaveProfile {
    /// Base tier weights normalized to sum 1. Degenerate all-zero weights
    /// fall back to 100% weak.
    pub fn normalized_base_weights(&self) -> [(BaseTier, f32); 3] {
        let total = self.weak + self.medium + self.strong;
        if total <= 0.0 {
            return [
                (BaseTier::Weak, 1.0),
                (BaseTier::Medium, 0.0),
                (BaseTier::Strong, 0.0),
            ];
        }
        [
            (BaseTier::Weak, self.weak / total),
            (BaseTier::Medium, self.medium / total),
            (BaseTier::Strong, self.strong / total),
        ]
    }
}

/// Special-pool step function over wave bands
fn special_chance_for_wave(wave: u32) -> f32 {
    if wave < 3 {
        0.05
    } else if wave < 7 {
        0.15
    } else if wave < 12 {
        0.25
    } else if wave < 18 {
        0.35
    } else {
        0.45
    }
}

const FULL_SPECIAL_POOL: [(&str, f32); 5] = [
    ("bomber", 0.3),
    ("caster", 0.25),
    ("tank", 0.2),
    ("runner", 0.15),
    ("splitter", 0.1),
];

/// Distribution for a wave. Hand-authored through wave 7, generated beyond.
pub fn profile_for_wave(wave: u32) -> WaveProfile {
    let special_chance = special_chance_for_wave(wave);
    match wave {
        0 | 1 => WaveProfile {
            weak: 1.0,
            medium: 0.0,
            strong: 0.0,
            special_chance,
            special_pool: Vec::new(),
            elite_chance: 0.0,
        },
        2 => WaveProfile {
            weak: 0.85,
            medium: 0.15,
            strong: 0.0,
            special_chance,
            special_pool: Vec::new(),
            elite_chance: 0.0,
        },
        3 => WaveProfile {
            weak: 0.7,
            medium: 0.3,
            strong: 0.0,
            special_chance,
            special_pool: vec![("runner", 1.0)],
            elite_chance: 0.0,
        },
        4 => WaveProfile {
            weak: 0.6,
            medium: 0.35,
            strong: 0.05,
            special_chance,
            special_pool: vec![("runner", 0.6), ("bomber", 0.4)],
            elite_chance: 0.0,
        },
        5 => WaveProfile {
            weak: 0.5,
            medium: 0.4,
            strong: 0.1,
            special_chance,
            special_pool: vec![("runner", 0.4), ("bomber", 0.4), ("caster", 0.2)],
            elite_chance: 0.02,
        },
        6 => WaveProfile {
            weak: 0.45,
            medium: 0.43,
            strong: 0.12,
            special_chance,
            special_pool: vec![
                ("bomber", 0.35),
                ("caster", 0.3),
                ("runner", 0.2),
                ("splitter", 0.15),
            ],
            elite_chance: 0.03,
        },
        7 => WaveProfile {
            weak: 0.4,
            medium: 0.45,
            strong: 0.15,
            special_chance,
            special_pool: vec![
                ("bomber", 0.3),
                ("caster", 0.25),
                ("tank", 0.15),
                ("runner", 0.15),
                ("splitter", 0.15),
            ],
            elite_chance: 0.04,
        },
        w => {
            let strong = (0.15 + (w - 8) as f32 * 0.02).min(0.3);
            let medium = 0.45;
            let weak = (1.0 - strong - medium).clamp(0.0, 1.0);
            WaveProfile {
                weak,
                medium,
                strong,
                special_chance,
                special_pool: FULL_SPECIAL_POOL.to_vec(),
                elite_chance: (0.05 + (w - 8) as f32 * 0.01).clamp(0.0, 1.0),
            }
        }
    }
}

/// Weighted selection by cumulative linear scan over `[0, total)`.
///
/// When floating-point rounding pushes the roll past every cumulative
/// weight, the last entry wins - that fallback guarantees termination and
/// must be preserved. Selecting from an empty set is a caller contract
/// violation and panics.
pub fn weighted_pick<'a, T>(entries: &'a [(T, f32)], rng: &mut impl Rng) -> &'a T {
    assert!(!entries.is_empty(), "weighted_pick over an empty set");
    let total: f32 = entries.iter().map(|(_, w)| w).sum();
    let roll = rng.random::<f32>() * total;
    let mut cumulative = 0.0;
    for (value, weight) in entries {
        cumulative += weight;
        if roll < cumulative {
            return value;
        }
    }
    &entries[entries.len() - 1].0
}

/// Result of archetype selection for one spawn event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub archetype: &'static EnemyArchetype,
    pub is_elite: bool,
}

/// Pick an archetype for one spawn on the given wave.
///
/// Specials roll first and are never elite. Base spawns roll elite
/// independently, except the weakest tier which never promotes.
pub fn select_enemy_for_wave(wave: u32, rng: &mut impl Rng) -> Selection {
    let profile = profile_for_wave(wave);

    if !profile.special_pool.is_empty() && rng.random::<f32>() < profile.special_chance {
        let id = weighted_pick(&profile.special_pool, rng);
        let archetype = archetype_by_id(id).expect("special pool references unknown archetype");
        return Selection {
            archetype,
            is_elite: false,
        };
    }

    let weights = profile.normalized_base_weights();
    let tier = *weighted_pick(&weights, rng);
    let archetype =
        archetype_by_id(tier.archetype_id()).expect("base tier references unknown archetype");

    let is_elite =
        tier != BaseTier::Weak && profile.elite_chance > 0.0 && rng.random::<f32>() < profile.elite_chance;

    Selection { archetype, is_elite }
}

/// Fully composed spawn descriptor; owned by the spawned enemy afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyInstance {
    pub archetype: &'static EnemyArchetype,
    pub stats: ScaledEnemyStats,
    pub is_elite: bool,
}

/// Compose selection, wave scaling, and the explosive damage override.
/// This is the sole entry point external spawn code should call.
pub fn create_enemy_instance(wave: u32, rng: &mut impl Rng) -> EnemyInstance {
    let selection = select_enemy_for_wave(wave, rng);
    let overrides = ScalingOverrides {
        elite: selection.is_elite,
        ..Default::default()
    };
    let mut stats = apply_scaling(selection.archetype, wave, &overrides);

    if selection.archetype.special == Some(SpecialAbility::Explosive) {
        stats.damage = bomber_damage_for_wave(wave);
    }

    EnemyInstance {
        archetype: selection.archetype,
        stats,
        is_elite: selection.is_elite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_base_weights_normalize_static_and_generated() {
        for wave in 1..200u32 {
            let profile = profile_for_wave(wave);
            let sum: f32 = profile
                .normalized_base_weights()
                .iter()
                .map(|(_, w)| w)
                .sum();
            assert!((sum - 1.0).abs() < 1e-6, "wave {wave} sums to {sum}");
        }
    }

    #[test]
    fn test_zero_weights_fall_back_to_weak() {
        let profile = WaveProfile {
            weak: 0.0,
            medium: 0.0,
            strong: 0.0,
            special_chance: 0.0,
            special_pool: Vec::new(),
            elite_chance: 0.0,
        };
        let weights = profile.normalized_base_weights();
        assert_eq!(weights[0], (BaseTier::Weak, 1.0));
        assert_eq!(weights[1].1, 0.0);
        assert_eq!(weights[2].1, 0.0);
    }

    #[test]
    fn test_generated_strong_chance_caps() {
        assert!((profile_for_wave(8).strong - 0.15).abs() < 1e-6);
        assert!((profile_for_wave(30).strong - 0.3).abs() < 1e-6);
        assert!((profile_for_wave(30).elite_chance - 0.27).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "empty set")]
    fn test_weighted_pick_empty_panics() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty: [(u32, f32); 0] = [];
        weighted_pick(&empty, &mut rng);
    }

    #[test]
    fn test_weighted_pick_degenerate_weights_terminate() {
        let mut rng = Pcg32::seed_from_u64(7);
        // All-zero weights: total is 0, every roll overshoots, last wins
        let entries = [("a", 0.0), ("b", 0.0)];
        for _ in 0..32 {
            assert_eq!(*weighted_pick(&entries, &mut rng), "b");
        }
    }

    #[test]
    fn test_specials_and_weak_never_elite() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..2000 {
            let selection = select_enemy_for_wave(25, &mut rng);
            if selection.archetype.special.is_some() {
                assert!(!selection.is_elite, "special rolled elite");
            }
            if selection.archetype.id == "common" {
                assert!(!selection.is_elite, "weak tier rolled elite");
            }
        }
    }

    #[test]
    fn test_bomber_instance_uses_override_curve() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..5000 {
            let instance = create_enemy_instance(12, &mut rng);
            if instance.archetype.id == "bomber" {
                assert_eq!(instance.stats.damage, bomber_damage_for_wave(12));
                return;
            }
        }
        panic!("no bomber drawn in 5000 spawns at wave 12");
    }

    #[test]
    fn test_selection_deterministic_under_seed() {
        let mut a = Pcg32::seed_from_u64(999);
        let mut b = Pcg32::seed_from_u64(999);
        for wave in 1..40u32 {
            let x = create_enemy_instance(wave, &mut a);
            let y = create_enemy_instance(wave, &mut b);
            assert_eq!(x, y);
        }
    }

    proptest! {
        #[test]
        fn prop_chances_stay_probabilities(w in 1u32..500) {
            let p = profile_for_wave(w);
            prop_assert!((0.0..=1.0).contains(&p.special_chance));
            prop_assert!((0.0..=1.0).contains(&p.elite_chance));
            prop_assert!(p.weak >= 0.0 && p.medium >= 0.0 && p.strong >= 0.0);
        }
    }
}
