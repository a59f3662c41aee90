//! Daily nutrition targets derived from a validated profile.

use serde::{Deserialize, Serialize};

use crate::profile::{Gender, Goal, Profile};

/// Computed daily targets. All values are per day; masses are grams.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub daily_calories: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

/// Computes targets with the Mifflin-St Jeor equation.
///
/// Total over valid profiles: every profile yields numbers, and identical
/// input yields identical output. Goal shifts the calorie target by a flat
/// 500 kcal in either direction.
pub fn compute(profile: &Profile) -> NutritionTargets {
    let gender_term = match profile.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    let bmr =
        10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64 + gender_term;
    let tdee = bmr * profile.activity.multiplier();
    let daily_calories = match profile.goal {
        Goal::Lose => tdee - 500.0,
        Goal::Gain => tdee + 500.0,
        Goal::Maintain => tdee,
    };

    let protein_g = 2.0 * profile.weight_kg;
    let fat_g = 0.25 * daily_calories / 9.0;
    // Carbs take whatever calories remain after protein and fat. The value
    // can go negative for heavy low-target profiles and is not clamped.
    let carbs_g = (daily_calories - (protein_g * 4.0 + fat_g * 9.0)) / 4.0;

    NutritionTargets {
        bmr,
        tdee,
        daily_calories,
        protein_g,
        fat_g,
        carbs_g,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ActivityLevel;

    fn profile(gender: Gender, activity: ActivityLevel, goal: Goal) -> Profile {
        Profile::new(gender, 30, 70.0, 175.0, activity, goal).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_male_profile_matches_hand_computed_targets() {
        // 10*70 + 6.25*175 - 5*30 + 5 = 1648.75
        let t = compute(&profile(Gender::Male, ActivityLevel::Medium, Goal::Maintain));
        assert_eq!(t.bmr, 1648.75);
        assert!(close(t.tdee, 2555.5625));
        assert!(close(t.daily_calories, t.tdee));
        assert_eq!(t.protein_g, 140.0);
        assert!(close(t.fat_g, 2555.5625 * 0.25 / 9.0));
        assert!(close(t.carbs_g, 339.16796875));
    }

    #[test]
    fn female_term_subtracts_161() {
        let male = compute(&profile(Gender::Male, ActivityLevel::Low, Goal::Maintain));
        let female = compute(&profile(Gender::Female, ActivityLevel::Low, Goal::Maintain));
        assert!(close(male.bmr - female.bmr, 166.0));
    }

    #[test]
    fn goal_shifts_calories_by_flat_500() {
        let maintain = compute(&profile(Gender::Male, ActivityLevel::Medium, Goal::Maintain));
        let lose = compute(&profile(Gender::Male, ActivityLevel::Medium, Goal::Lose));
        let gain = compute(&profile(Gender::Male, ActivityLevel::Medium, Goal::Gain));
        assert!(close(lose.daily_calories, maintain.daily_calories - 500.0));
        assert!(close(gain.daily_calories, maintain.daily_calories + 500.0));
        assert_eq!(lose.tdee, maintain.tdee);
    }

    #[test]
    fn activity_multipliers_scale_tdee() {
        let low = compute(&profile(Gender::Male, ActivityLevel::Low, Goal::Maintain));
        let medium = compute(&profile(Gender::Male, ActivityLevel::Medium, Goal::Maintain));
        let high = compute(&profile(Gender::Male, ActivityLevel::High, Goal::Maintain));
        assert!(close(low.tdee, low.bmr * 1.2));
        assert!(close(medium.tdee, medium.bmr * 1.55));
        assert!(close(high.tdee, high.bmr * 1.725));
    }

    #[test]
    fn unknown_stored_activity_computes_with_low_multiplier() {
        let coerced = ActivityLevel::from_stored("extreme");
        let t = compute(&profile(Gender::Male, coerced, Goal::Maintain));
        assert!(close(t.tdee, t.bmr * 1.2));
    }

    #[test]
    fn carbs_can_go_negative_and_are_not_clamped() {
        // Heavy profile on a cut: protein alone exceeds the calorie target's
        // remainder, so the carb share drops below zero.
        let p = Profile::new(
            Gender::Female,
            120,
            300.0,
            50.0,
            ActivityLevel::Low,
            Goal::Lose,
        )
        .unwrap();
        let t = compute(&p);
        assert!(t.carbs_g < 0.0);
    }

    #[test]
    fn identical_profiles_yield_identical_targets() {
        let p = profile(Gender::Female, ActivityLevel::High, Goal::Gain);
        assert_eq!(compute(&p), compute(&p));
    }
}
