use serde::Serialize;
use time::{macros::format_description, Date};

use crate::profile::dto::{Height, UserProfile};

use super::targets::{MetricTarget, MetricTargets};
use super::value::round_half_up;

const KG_PER_LB: f64 = 0.453592;
const CM_PER_INCH: f64 = 2.54;
const MIN_CALORIES: f64 = 1200.0;

/// Suggested plan derived from a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub suggested_preset: &'static str,
    pub preset_reason: &'static str,
    pub explanation: String,
    pub bmr: i64,
    pub tdee: i64,
    pub metrics: MetricTargets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Sex::Male,
            "female" => Sex::Female,
            _ => Sex::Other,
        }
    }
}

/// Health conditions lowercased once for substring checks.
struct Conditions(Vec<String>);

impl Conditions {
    fn any(&self, needles: &[&str]) -> bool {
        self.0
            .iter()
            .any(|c| needles.iter().any(|n| c.contains(n)))
    }
}

/// Mifflin-St Jeor based targets. Returns `None` when age, gender, height,
/// weight or activity level cannot be determined.
pub fn recommend(profile: &UserProfile, today: Date) -> Option<Recommendation> {
    let age = profile
        .birthday
        .as_deref()
        .and_then(parse_birthday)
        .map(|b| age_on(b, today))
        .or_else(|| profile.age.as_ref().and_then(|a| a.leading()))
        .filter(|a| *a > 0.0)?;
    let sex = Sex::parse(profile.gender.as_deref().filter(|g| !g.trim().is_empty())?);
    let height_in = profile.height.as_ref().and_then(Height::total_inches)?;
    let weight_lbs = profile
        .weight
        .as_ref()
        .and_then(|w| w.leading())
        .filter(|w| *w > 0.0)?;
    let activity = profile
        .activity_level
        .as_deref()
        .filter(|a| !a.trim().is_empty())?;
    let goal = profile.primary_goal.as_deref().unwrap_or_default();
    let conditions = Conditions(
        profile
            .health_conditions
            .iter()
            .flatten()
            .map(|c| c.to_lowercase())
            .collect(),
    );

    let weight_kg = weight_lbs * KG_PER_LB;
    let bmr = round_half_up(bmr(sex, weight_kg, height_in * CM_PER_INCH, age));
    let tdee = round_half_up(bmr * activity_multiplier(activity));
    let calories = (tdee + goal_adjustment(goal)).max(MIN_CALORIES);

    let protein = round_half_up(weight_kg * protein_per_kg(goal));
    let has_diabetes = conditions.any(&["diabetes", "blood sugar"]);
    let carbs = round_half_up(calories * carb_share(goal, has_diabetes) / 4.0);
    let fat = round_half_up(calories * 0.30 / 9.0);
    let pressure = conditions.any(&["blood pressure", "hypertension"]);
    let heart = conditions.any(&["heart", "cardiovascular"]);
    let sodium = if pressure || heart || conditions.any(&["kidney"]) {
        1500.0
    } else {
        2300.0
    };
    let cholesterol = if heart || conditions.any(&["cholesterol"]) {
        200.0
    } else {
        300.0
    };
    let fiber = fiber_target(sex, age);

    let mut metrics = MetricTargets::new();
    metrics.insert("calories".into(), MetricTarget::enabled(calories, "kcal"));
    metrics.insert("protein".into(), MetricTarget::enabled(protein, "g"));
    metrics.insert("totalCarbs".into(), MetricTarget::enabled(carbs, "g"));
    metrics.insert("totalFat".into(), MetricTarget::enabled(fat, "g"));
    metrics.insert("fiber".into(), MetricTarget::enabled(fiber, "g"));
    metrics.insert("sodium".into(), MetricTarget::enabled(sodium, "mg"));
    metrics.insert(
        "cholesterol".into(),
        MetricTarget::enabled(cholesterol, "mg"),
    );
    if has_diabetes {
        metrics.insert(
            "sugars".into(),
            MetricTarget::enabled(round_half_up(carbs * 0.1), "g"),
        );
    }
    let heart_or_cholesterol = conditions.any(&["heart", "cholesterol"]);
    if heart_or_cholesterol {
        metrics.insert("saturatedFat".into(), MetricTarget::enabled(13.0, "g"));
        metrics.insert("transFat".into(), MetricTarget::enabled(0.0, "g"));
    }

    let (suggested_preset, preset_reason) = if conditions.any(&["blood pressure"]) {
        (
            "low-sodium",
            "Selected because you indicated high blood pressure or hypertension concerns.",
        )
    } else if heart_or_cholesterol {
        (
            "heart-healthy",
            "Selected because you indicated heart or cholesterol concerns.",
        )
    } else if goal == "muscle-gain" {
        (
            "high-protein",
            "Selected because your primary goal is building muscle.",
        )
    } else {
        (
            "balanced",
            "A balanced approach covering all major nutrients.",
        )
    };

    let audience = match sex {
        Sex::Male => "men",
        Sex::Female => "women",
        Sex::Other => "adults",
    };
    let sodium_line = if pressure || heart {
        format!("Your {sodium} mg sodium limit is based on recommendations for supporting healthy blood pressure and reducing strain on the cardiovascular system.")
    } else {
        format!("Your {sodium} mg sodium target comes from dietary guidelines that help maintain healthy blood pressure and reduce cardiovascular strain.")
    };
    let explanation = [
        "Calories".to_string(),
        format!("Your {calories} kcal target is your estimated daily energy need adjusted for your goal."),
        "Protein".to_string(),
        format!("Your {protein} g protein target supports muscle repair and helps prevent muscle loss."),
        "Carbohydrates".to_string(),
        "Your carbohydrate target provides enough glucose to fuel the brain and daily activity.".to_string(),
        "Fiber".to_string(),
        format!("Your {fiber} g fiber target comes from national dietary guidelines for {audience} to support digestion and heart health."),
        "Total Fat".to_string(),
        "Your total fat target supports hormones and vitamin absorption without raising disease risk.".to_string(),
        "Saturated Fat".to_string(),
        "Your saturated fat limit comes from heart-health guidelines designed to keep LDL cholesterol at safe levels.".to_string(),
        "Trans Fat".to_string(),
        "Your trans fat limit is extremely low because even small amounts increase cardiovascular risk.".to_string(),
        "Cholesterol".to_string(),
        format!("Your {cholesterol} mg cholesterol target helps maintain healthy blood cholesterol levels."),
        "Sodium".to_string(),
        sodium_line,
    ]
    .join("\n");

    Some(Recommendation {
        suggested_preset,
        preset_reason,
        explanation,
        bmr: bmr as i64,
        tdee: tdee as i64,
        metrics,
    })
}

fn bmr(sex: Sex, weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
        Sex::Other => base + (5.0 - 161.0) / 2.0,
    }
}

fn activity_multiplier(level: &str) -> f64 {
    match level {
        "sedentary" => 1.2,
        "lightly-active" => 1.375,
        "moderately-active" => 1.55,
        "very-active" => 1.725,
        "extremely-active" => 1.9,
        _ => 1.2,
    }
}

fn goal_adjustment(goal: &str) -> f64 {
    match goal {
        "weight-loss" => -500.0,
        "weight-gain" | "muscle-gain" => 300.0,
        "energy-levels" => -200.0,
        _ => 0.0,
    }
}

fn protein_per_kg(goal: &str) -> f64 {
    match goal {
        "muscle-gain" => 2.2,
        "weight-loss" => 2.0,
        "weight-gain" => 1.8,
        _ => 1.6,
    }
}

fn carb_share(goal: &str, has_diabetes: bool) -> f64 {
    if has_diabetes {
        return 0.35;
    }
    match goal {
        "weight-loss" => 0.40,
        "muscle-gain" => 0.45,
        _ => 0.50,
    }
}

fn fiber_target(sex: Sex, age: f64) -> f64 {
    let senior = age >= 50.0;
    match (sex, senior) {
        (Sex::Male, false) => 38.0,
        (Sex::Male, true) => 30.0,
        (Sex::Female, false) => 25.0,
        (Sex::Female, true) => 21.0,
        (Sex::Other, false) => 31.0,
        (Sex::Other, true) => 25.0,
    }
}

fn parse_birthday(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.get(..10)?, &format).ok()
}

fn age_on(birthday: Date, today: Date) -> f64 {
    let mut years = today.year() - birthday.year();
    if (today.month() as u8, today.day()) < (birthday.month() as u8, birthday.day()) {
        years -= 1;
    }
    f64::from(years)
}
