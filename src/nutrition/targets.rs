use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value::lenient_f64;

/// Daily target for one nutrient metric of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target: f64,
}

impl MetricTarget {
    pub fn enabled(target: f64, unit: &str) -> Self {
        Self {
            enabled: true,
            unit: Some(unit.to_string()),
            target,
        }
    }
}

/// Metric key (`calories`, `protein`, `totalCarbs`, ...) to target, in the
/// order the plan lists them.
pub type MetricTargets = IndexMap<String, MetricTarget>;

/// Upper bound accepted for a metric target, if the metric has one.
pub fn max_allowed(key: &str) -> Option<f64> {
    let max = match key {
        "calories" => 10_000.0,
        "caloriesFromFat" => 5_000.0,
        "protein" => 500.0,
        "totalCarbs" => 1_000.0,
        "totalFat" => 300.0,
        "saturatedFat" => 100.0,
        "transFat" => 20.0,
        "fiber" => 100.0,
        "sugars" => 500.0,
        "cholesterol" => 1_000.0,
        "sodium" => 10_000.0,
        _ => return None,
    };
    Some(max)
}

/// Clamps every target into `[0, max]` for its metric.
pub fn sanitize_metrics(mut metrics: MetricTargets) -> MetricTargets {
    for (key, metric) in metrics.iter_mut() {
        if metric.target < 0.0 {
            metric.target = 0.0;
        }
        if let Some(max) = max_allowed(key) {
            metric.target = metric.target.min(max);
        }
    }
    metrics
}

/// Human-readable name for a metric key.
pub fn display_name(key: &str) -> &str {
    match key {
        "calories" => "Calories",
        "protein" => "Protein",
        "totalFat" => "Total Fat",
        "saturatedFat" => "Saturated Fat",
        "transFat" => "Trans Fat",
        "cholesterol" => "Cholesterol",
        "totalCarbs" => "Total Carbohydrates",
        "fiber" => "Fiber",
        "sugars" => "Sugars",
        "sodium" => "Sodium",
        other => other,
    }
}
