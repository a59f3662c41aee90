use crate::calculator::NutritionTargets;
use crate::profile::Profile;

/// User-facing menu request sent to the model. The numbered contract keeps
/// the reply parseable: the shopping list must arrive as
/// `<ul class="shopping-list">` with one product per `<li>`.
pub fn menu_request_prompt(profile: &Profile, targets: &NutritionTargets) -> String {
    format!(
        "Compose a one-day meal plan for an adult: {} sex, {} years old, {} kg, {} cm, {} activity, goal: {}.\n\nDaily targets: {:.0} kcal, protein {:.0} g, fat {:.0} g, carbohydrates {:.0} g.\n\nReturn the answer as HTML.\n\nRequirements:\n1. Four meals (breakfast, lunch, dinner, snacks), each as an HTML table listing dishes, portion sizes and calories.\n2. After each meal, a one-line calorie and macro summary.\n3. A combined shopping list as <ul class=\"shopping-list\"> with exactly one product per <li>; write quantities without hyphens, for example \"Oats 150g\" or \"Eggs 6pcs\".\n4. A short recommendations paragraph at the end.\n\nKeep portion sizes realistic and make the daily totals match the targets within 5 percent.",
        profile.gender,
        profile.age,
        profile.weight_kg,
        profile.height_cm,
        profile.activity,
        profile.goal,
        targets.daily_calories,
        targets.protein_g,
        targets.fat_g,
        targets.carbs_g
    )
}
