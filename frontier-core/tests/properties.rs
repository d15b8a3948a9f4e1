//! Property tests for the pure combat rules.

use frontier_core::character::{current_strength, Attributes, BodyLocation, Combatant, Wound};
use frontier_core::dice::parse_damage;
use frontier_core::modifiers::{aim, range_modifier, MAX_AIM_BONUS};
use frontier_core::testing::ScriptedDice;
use proptest::prelude::*;

fn location() -> impl Strategy<Value = BodyLocation> {
    (1u32..=100).prop_map(BodyLocation::from_roll)
}

proptest! {
    #[test]
    fn range_modifier_never_improves_with_distance(
        effective in 1u32..300,
        near in 0u32..1000,
        extra in 0u32..1000,
    ) {
        prop_assert!(range_modifier(near, effective) >= range_modifier(near + extra, effective));
    }

    #[test]
    fn aim_never_exceeds_cap(steps in 0usize..10) {
        let mut bonus = 0;
        for _ in 0..steps {
            bonus = aim(bonus).bonus();
            prop_assert!(bonus <= MAX_AIM_BONUS);
        }
    }

    #[test]
    fn aim_accepts_any_stored_bonus(current in any::<i32>()) {
        let bonus = aim(current).bonus();
        prop_assert!((0..=MAX_AIM_BONUS).contains(&bonus));
    }

    #[test]
    fn strength_falls_by_effective_reduction(
        base in 1i32..40,
        wounds in prop::collection::vec((1i32..7, location()), 0..8),
    ) {
        let mut combatant = Combatant::new("Target", Attributes::new(base));
        let mut previous = current_strength(&combatant, true);
        let mut lost = 0i64;

        for (round, (damage, location)) in wounds.into_iter().enumerate() {
            let wound = Wound::from_damage(damage, location, round as u32 + 1);
            lost += wound.effective_reduction() as i64;
            combatant = combatant.with_wound(wound);

            let now = current_strength(&combatant, true);
            prop_assert!(now <= previous);
            prop_assert_eq!(now as i64, (base as i64 - lost).max(0));
            prop_assert!(current_strength(&combatant, false) >= 1);
            previous = now;
        }
    }

    #[test]
    fn malformed_damage_is_zero(notation in "[a-ce-z +]{0,12}") {
        let mut dice = ScriptedDice::new([4]);
        prop_assert_eq!(parse_damage(&notation, &mut dice), 0);
    }

    #[test]
    fn damage_is_never_negative(
        count in 1u32..4,
        sides in 1u32..12,
        modifier in -20i32..20,
        roll in 1u32..12,
    ) {
        let notation = format!("{count}d{sides}{modifier:+}");
        let mut dice = ScriptedDice::new([roll]);
        prop_assert!(parse_damage(&notation, &mut dice) >= 0);
    }
}
