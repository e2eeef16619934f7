//! Enemy archetypes and per-wave stat scaling
//!
//! Pure computation, no I/O, no internal state. Spawn code composes these
//! through `wave::create_enemy_instance`. The scaling break-points are part
//! of the balance contract and must stay exact; replays depend on them.

use serde::{Deserialize, Serialize};

use crate::Rgba;
use crate::consts::{ELITE_HP_MULT, ELITE_RADIUS_BONUS};

/// Base tier the archetype occupied in the legacy data tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyTier {
    Weak,
    Medium,
    Strong,
    Special,
}

/// Special-ability tag carried by non-base-tier archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAbility {
    /// Detonates on contact; damage follows its own hand-tuned curve
    Explosive,
    /// Ranged caster
    Cast,
    /// High-hp bruiser
    Bulwark,
    /// Fast chaser
    Dash,
    /// Splits into smaller enemies on death
    Split,
}

/// Base stats shared by every spawn of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: f32,
    pub damage: f32,
    pub radius: f32,
    pub speed: f32,
}

/// Immutable enemy template. Defined once at load, never mutated.
/// Serializable for debug dumps only; the table is static, never loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyArchetype {
    pub id: &'static str,
    pub legacy_tier: LegacyTier,
    pub name: &'static str,
    pub color: Rgba,
    pub base: BaseStats,
    pub special: Option<SpecialAbility>,
    pub tags: &'static [&'static str],
}

/// Per-wave stat multipliers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveScaling {
    pub hp_multiplier: f32,
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
}

/// Extra multipliers applied on top of wave scaling (boss modifiers,
/// event-driven buffs) plus the elite flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingOverrides {
    pub extra_hp_mult: f32,
    pub extra_damage_mult: f32,
    pub extra_speed_mult: f32,
    pub elite: bool,
}

impl Default for ScalingOverrides {
    fn default() -> Self {
        Self {
            extra_hp_mult: 1.0,
            extra_damage_mult: 1.0,
            extra_speed_mult: 1.0,
            elite: false,
        }
    }
}

/// Concrete stats for one spawn, owned by the enemy entity afterwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledEnemyStats {
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub color: Rgba,
}

const COMMON_COLOR: Rgba = [164, 196, 96, 255];
const INTERMEDIATE_COLOR: Rgba = [96, 160, 224, 255];
const STRONG_COLOR: Rgba = [200, 88, 88, 255];
const BOMBER_COLOR: Rgba = [240, 140, 40, 255];
const CASTER_COLOR: Rgba = [168, 104, 224, 255];
const TANK_COLOR: Rgba = [120, 120, 136, 255];
const RUNNER_COLOR: Rgba = [240, 224, 96, 255];
const SPLITTER_COLOR: Rgba = [96, 208, 176, 255];

static ARCHETYPES: [EnemyArchetype; 8] = [
    EnemyArchetype {
        id: "common",
        legacy_tier: LegacyTier::Weak,
        name: "Drone",
        color: COMMON_COLOR,
        base: BaseStats { hp: 20.0, damage: 8.0, radius: 12.0, speed: 60.0 },
        special: None,
        tags: &["base", "swarm"],
    },
    EnemyArchetype {
        id: "intermediate",
        legacy_tier: LegacyTier::Medium,
        name: "Stalker",
        color: INTERMEDIATE_COLOR,
        base: BaseStats { hp: 45.0, damage: 14.0, radius: 15.0, speed: 52.0 },
        special: None,
        tags: &["base"],
    },
    EnemyArchetype {
        id: "elite",
        legacy_tier: LegacyTier::Strong,
        name: "Ravager",
        color: STRONG_COLOR,
        base: BaseStats { hp: 90.0, damage: 22.0, radius: 19.0, speed: 46.0 },
        special: None,
        tags: &["base", "heavy"],
    },
    EnemyArchetype {
        id: "bomber",
        legacy_tier: LegacyTier::Special,
        name: "Bomber",
        color: BOMBER_COLOR,
        base: BaseStats { hp: 30.0, damage: 20.0, radius: 14.0, speed: 68.0 },
        special: Some(SpecialAbility::Explosive),
        tags: &["special", "explosive"],
    },
    EnemyArchetype {
        id: "caster",
        legacy_tier: LegacyTier::Special,
        name: "Caster",
        color: CASTER_COLOR,
        base: BaseStats { hp: 35.0, damage: 16.0, radius: 13.0, speed: 40.0 },
        special: Some(SpecialAbility::Cast),
        tags: &["special", "ranged"],
    },
    EnemyArchetype {
        id: "tank",
        legacy_tier: LegacyTier::Special,
        name: "Tank",
        color: TANK_COLOR,
        base: BaseStats { hp: 160.0, damage: 18.0, radius: 24.0, speed: 30.0 },
        special: Some(SpecialAbility::Bulwark),
        tags: &["special", "heavy"],
    },
    EnemyArchetype {
        id: "runner",
        legacy_tier: LegacyTier::Special,
        name: "Runner",
        color: RUNNER_COLOR,
        base: BaseStats { hp: 16.0, damage: 10.0, radius: 10.0, speed: 110.0 },
        special: Some(SpecialAbility::Dash),
        tags: &["special", "fast"],
    },
    EnemyArchetype {
        id: "splitter",
        legacy_tier: LegacyTier::Special,
        name: "Splitter",
        color: SPLITTER_COLOR,
        base: BaseStats { hp: 50.0, damage: 12.0, radius: 17.0, speed: 48.0 },
        special: Some(SpecialAbility::Split),
        tags: &["special"],
    },
];

/// All archetypes, base tiers first
pub fn archetypes() -> &'static [EnemyArchetype] {
    &ARCHETYPES
}

/// Look up an archetype by id
pub fn archetype_by_id(id: &str) -> Option<&'static EnemyArchetype> {
    ARCHETYPES.iter().find(|a| a.id == id)
}

/// Elite recolor per legacy tier, where defined
pub fn elite_color_for(tier: LegacyTier) -> Option<Rgba> {
    match tier {
        LegacyTier::Medium => Some([72, 128, 255, 255]),
        LegacyTier::Strong => Some([255, 48, 48, 255]),
        // Weak-tier enemies never roll elite, specials keep their color
        LegacyTier::Weak | LegacyTier::Special => None,
    }
}

/// Stat multipliers for a wave. Callers must guarantee `wave >= 1`;
/// out-of-range waves are not validated.
pub fn scaling_for_wave(wave: u32) -> WaveScaling {
    let w = wave as f32;

    let hp_multiplier = if wave <= 5 {
        1.0 + (w - 1.0) * 0.20
    } else if wave <= 15 {
        1.0 + (w - 1.0) * 0.35
    } else {
        1.0 + (w - 1.0) * 0.50
    };

    let speed_multiplier = if wave <= 10 {
        1.0 + (w - 1.0) * 0.03
    } else if wave <= 20 {
        1.0 + (w - 1.0) * 0.05
    } else {
        (1.0 + (w - 1.0) * 0.07).min(3.0)
    };

    let damage_multiplier = if wave < 5 {
        1.0
    } else if wave < 10 {
        1.3
    } else if wave < 13 {
        1.6
    } else if wave < 17 {
        2.0
    } else if wave < 21 {
        2.5
    } else {
        3.0
    };

    WaveScaling {
        hp_multiplier,
        damage_multiplier,
        speed_multiplier,
    }
}

/// Combine archetype base stats with wave scaling and overrides.
///
/// Hp and damage are floored; speed stays fractional. Explosive archetypes
/// keep their base damage here - `bomber_damage_for_wave` replaces it later.
pub fn apply_scaling(
    archetype: &EnemyArchetype,
    wave: u32,
    overrides: &ScalingOverrides,
) -> ScaledEnemyStats {
    let scaling = scaling_for_wave(wave);

    let mut hp = (archetype.base.hp * scaling.hp_multiplier * overrides.extra_hp_mult).floor();

    let damage = if archetype.special == Some(SpecialAbility::Explosive) {
        archetype.base.damage
    } else {
        (archetype.base.damage * scaling.damage_multiplier * overrides.extra_damage_mult).floor()
    };

    let speed = archetype.base.speed * scaling.speed_multiplier * overrides.extra_speed_mult;

    let mut radius = archetype.base.radius;
    let mut color = archetype.color;
    if overrides.elite {
        // Elite bonus applies after the floor of the scaled hp
        hp *= ELITE_HP_MULT;
        radius += ELITE_RADIUS_BONUS;
        if let Some(elite_color) = elite_color_for(archetype.legacy_tier) {
            color = elite_color;
        }
    }

    ScaledEnemyStats {
        hp,
        damage,
        speed,
        radius,
        color,
    }
}

/// Hand-tuned bomber (explosive) damage curve, independent of the generic
/// damage scaling - intentionally diverging for balance.
pub fn bomber_damage_for_wave(wave: u32) -> f32 {
    let w = wave as f32;
    if wave <= 5 {
        20.0 + 3.0 * w
    } else if wave <= 10 {
        35.0 + 5.0 * (w - 5.0)
    } else if wave <= 15 {
        65.0 + 7.0 * (w - 10.0)
    } else if wave <= 20 {
        100.0 + 16.0 * (w - 15.0)
    } else {
        180.0 + 20.0 * (w - 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scaling_break_points() {
        let w1 = scaling_for_wave(1);
        assert_eq!(w1.hp_multiplier, 1.0);
        assert_eq!(w1.damage_multiplier, 1.0);
        assert_eq!(w1.speed_multiplier, 1.0);

        let w5 = scaling_for_wave(5);
        assert!((w5.hp_multiplier - 1.8).abs() < 1e-6);
        assert_eq!(w5.damage_multiplier, 1.3);

        let w6 = scaling_for_wave(6);
        assert!((w6.hp_multiplier - 2.75).abs() < 1e-6);

        let w16 = scaling_for_wave(16);
        assert!((w16.hp_multiplier - 8.5).abs() < 1e-6);
        assert_eq!(w16.damage_multiplier, 2.0);

        assert_eq!(scaling_for_wave(21).damage_multiplier, 3.0);
    }

    #[test]
    fn test_speed_clamped_at_3x() {
        assert_eq!(scaling_for_wave(60).speed_multiplier, 3.0);
        assert_eq!(scaling_for_wave(200).speed_multiplier, 3.0);
    }

    #[test]
    fn test_apply_scaling_floors_hp_and_damage() {
        let stalker = archetype_by_id("intermediate").unwrap();
        let stats = apply_scaling(stalker, 7, &ScalingOverrides::default());
        // 45 * (1 + 6*0.35) = 139.5 -> 139
        assert_eq!(stats.hp, 139.0);
        // 14 * 1.3 = 18.2 -> 18
        assert_eq!(stats.damage, 18.0);
        // Speed keeps its fraction: 52 * 1.18
        assert!((stats.speed - 52.0 * 1.18).abs() < 1e-4);
    }

    #[test]
    fn test_elite_adjustments() {
        let ravager = archetype_by_id("elite").unwrap();
        let base = apply_scaling(ravager, 4, &ScalingOverrides::default());
        let elite = apply_scaling(
            ravager,
            4,
            &ScalingOverrides {
                elite: true,
                ..Default::default()
            },
        );
        assert_eq!(elite.hp, base.hp * ELITE_HP_MULT);
        assert_eq!(elite.radius, base.radius + ELITE_RADIUS_BONUS);
        assert_eq!(elite.color, elite_color_for(LegacyTier::Strong).unwrap());
    }

    #[test]
    fn test_explosive_keeps_base_damage() {
        let bomber = archetype_by_id("bomber").unwrap();
        let stats = apply_scaling(bomber, 18, &ScalingOverrides::default());
        assert_eq!(stats.damage, bomber.base.damage);
    }

    #[test]
    fn test_bomber_curve_joins() {
        assert_eq!(bomber_damage_for_wave(5), 35.0);
        assert_eq!(bomber_damage_for_wave(15), 100.0);
        assert_eq!(bomber_damage_for_wave(20), 180.0);
        assert_eq!(bomber_damage_for_wave(25), 280.0);
    }

    proptest! {
        #[test]
        fn prop_hp_and_damage_monotone(w in 1u32..200) {
            let a = scaling_for_wave(w);
            let b = scaling_for_wave(w + 1);
            prop_assert!(b.hp_multiplier >= a.hp_multiplier);
            prop_assert!(b.damage_multiplier >= a.damage_multiplier);
        }

        #[test]
        fn prop_speed_never_exceeds_cap(w in 1u32..500) {
            prop_assert!(scaling_for_wave(w).speed_multiplier <= 3.0 + 1e-6);
        }
    }
}
