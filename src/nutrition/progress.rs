use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::targets::{display_name, MetricTargets};
use super::totals::NutrientTotals;
use super::value::{round1, round_half_up};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Met,
    Close,
    Below,
}

impl ProgressStatus {
    pub fn from_percentage(percentage: i64) -> Self {
        if percentage >= 100 {
            ProgressStatus::Met
        } else if percentage >= 80 {
            ProgressStatus::Close
        } else {
            ProgressStatus::Below
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricProgress {
    pub current: f64,
    pub target: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub percentage: i64,
    pub remaining: f64,
    pub status: ProgressStatus,
}

impl MetricProgress {
    pub fn new(current: f64, target: f64, unit: Option<String>) -> Self {
        let percentage = if target > 0.0 {
            round_half_up(current / target * 100.0) as i64
        } else {
            0
        };
        Self {
            current: round1(current),
            target,
            unit,
            percentage,
            remaining: round1((target - current).max(0.0)),
            status: ProgressStatus::from_percentage(percentage),
        }
    }
}

pub type ProgressMap = IndexMap<String, MetricProgress>;

/// Progress for every enabled metric of a plan against consumed totals.
pub fn build_progress(consumed: &NutrientTotals, metrics: &MetricTargets) -> ProgressMap {
    metrics
        .iter()
        .filter(|(_, m)| m.enabled)
        .map(|(key, m)| {
            (
                key.clone(),
                MetricProgress::new(consumed.metric(key), m.target, m.unit.clone()),
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub message: String,
    pub macros: Vec<String>,
}

/// Nudge naming the metrics still below target for a day, or `None` when
/// every tracked metric is at least close.
pub fn call_to_action(meal_count: u32, progress: &ProgressMap) -> Option<CallToAction> {
    let macros: Vec<String> = progress
        .iter()
        .filter(|(_, p)| p.status == ProgressStatus::Below)
        .map(|(key, _)| display_name(key).to_string())
        .collect();

    if macros.is_empty() {
        return None;
    }

    let list = macros.join(", ");
    let message = if meal_count >= 3 {
        format!("Tomorrow make sure you hit {list} to close the gap.")
    } else {
        format!("For your next meal focus on {list} to stay on track.")
    };
    Some(CallToAction { message, macros })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::targets::MetricTarget;

    fn calories_plan(target: f64) -> MetricTargets {
        let mut m = MetricTargets::new();
        m.insert("calories".into(), MetricTarget::enabled(target, "kcal"));
        m
    }

    fn consumed(calories: f64) -> NutrientTotals {
        NutrientTotals {
            calories,
            ..Default::default()
        }
    }

    #[test]
    fn status_thresholds() {
        let plan = calories_plan(2000.0);

        let half = build_progress(&consumed(1000.0), &plan);
        assert_eq!(half["calories"].percentage, 50);
        assert_eq!(half["calories"].status, ProgressStatus::Below);
        assert_eq!(half["calories"].remaining, 1000.0);

        let close = build_progress(&consumed(1700.0), &plan);
        assert_eq!(close["calories"].status, ProgressStatus::Close);

        let met = build_progress(&consumed(2000.0), &plan);
        assert_eq!(met["calories"].status, ProgressStatus::Met);
        assert_eq!(met["calories"].remaining, 0.0);
    }

    #[test]
    fn zero_target_means_zero_percent() {
        let p = MetricProgress::new(300.0, 0.0, None);
        assert_eq!(p.percentage, 0);
        assert_eq!(p.status, ProgressStatus::Below);
        assert_eq!(p.remaining, 0.0);
    }

    #[test]
    fn disabled_metrics_are_skipped() {
        let mut plan = calories_plan(2000.0);
        plan.insert(
            "protein".into(),
            MetricTarget {
                enabled: false,
                unit: Some("g".into()),
                target: 100.0,
            },
        );
        let progress = build_progress(&consumed(500.0), &plan);
        assert!(progress.contains_key("calories"));
        assert!(!progress.contains_key("protein"));
    }

    #[test]
    fn call_to_action_depends_on_meal_count() {
        let progress = build_progress(&consumed(100.0), &calories_plan(2000.0));

        let early = call_to_action(1, &progress).unwrap();
        assert_eq!(
            early.message,
            "For your next meal focus on Calories to stay on track."
        );

        let late = call_to_action(3, &progress).unwrap();
        assert_eq!(
            late.message,
            "Tomorrow make sure you hit Calories to close the gap."
        );
        assert_eq!(late.macros, vec!["Calories".to_string()]);
    }

    #[test]
    fn call_to_action_follows_plan_order() {
        let mut plan = calories_plan(2000.0);
        plan.insert("protein".into(), MetricTarget::enabled(120.0, "g"));
        plan.insert("fiber".into(), MetricTarget::enabled(30.0, "g"));
        let progress = build_progress(&consumed(100.0), &plan);

        let keys: Vec<&str> = progress.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["calories", "protein", "fiber"]);
        let cta = call_to_action(1, &progress).unwrap();
        assert_eq!(cta.macros, vec!["Calories", "Protein", "Fiber"]);
        assert_eq!(
            cta.message,
            "For your next meal focus on Calories, Protein, Fiber to stay on track."
        );
    }

    #[test]
    fn no_call_to_action_when_on_track() {
        let progress = build_progress(&consumed(1900.0), &calories_plan(2000.0));
        assert!(call_to_action(2, &progress).is_none());
    }
}
