use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::Date;

use super::targets::MetricTargets;
use super::totals::{LineItem, NutrientTotals};
use super::value::round_half_up;

/// Totals of every meal logged on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTotals {
    pub date: Date,
    pub meal_count: u32,
    pub totals: NutrientTotals,
}

/// Groups meals by date, summing their items. Output is sorted by date and
/// only contains dates that have at least one meal.
pub fn summarize_days<'a, I>(meals: I) -> Vec<DayTotals>
where
    I: IntoIterator<Item = (Date, &'a [LineItem])>,
{
    let mut by_date: BTreeMap<Date, DayTotals> = BTreeMap::new();
    for (date, items) in meals {
        let day = by_date.entry(date).or_insert_with(|| DayTotals {
            date,
            meal_count: 0,
            totals: NutrientTotals::default(),
        });
        day.meal_count += 1;
        day.totals += NutrientTotals::aggregate(items);
    }
    by_date.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    fn from_change(percent: f64) -> Self {
        if percent > 5.0 {
            TrendDirection::Up
        } else if percent < -5.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: Date,
    pub meal_count: u32,
    pub values: IndexMap<String, f64>,
    pub targets: IndexMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrend {
    pub average_per_day: f64,
    pub average_per_meal: f64,
    pub change_per_meal_percent: f64,
    pub direction: TrendDirection,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub metric: String,
    pub direction: TrendDirection,
    pub change_percent: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trend {
    pub series: Vec<SeriesPoint>,
    pub metrics: IndexMap<String, MetricTrend>,
    pub narratives: Vec<Narrative>,
}

/// Per-metric trend over a range of days.
///
/// The per-meal average of the first half of the days is compared with the
/// per-meal average of the second half. With an odd number of days the middle
/// day belongs to both halves.
pub fn compute_trend(days: &[DayTotals], metrics: &MetricTargets) -> Trend {
    let enabled: Vec<(&String, f64)> = metrics
        .iter()
        .filter(|(_, m)| m.enabled)
        .map(|(k, m)| (k, m.target))
        .collect();

    if enabled.is_empty() || days.is_empty() {
        return Trend::default();
    }

    let series = days
        .iter()
        .map(|day| SeriesPoint {
            date: day.date,
            meal_count: day.meal_count,
            values: enabled
                .iter()
                .map(|(k, _)| ((*k).clone(), day.totals.metric(k)))
                .collect(),
            targets: enabled.iter().map(|(k, t)| ((*k).clone(), *t)).collect(),
        })
        .collect();

    let n = days.len();
    let half = n.div_ceil(2).max(1);
    let first = &days[..half];
    let second = &days[n - half..];
    let total_meals: u32 = days.iter().map(|d| d.meal_count).sum();

    let mut trend_metrics = IndexMap::new();
    let mut narratives = Vec::with_capacity(enabled.len());

    for (key, target) in enabled {
        let total: f64 = days.iter().map(|d| d.totals.metric(key)).sum();
        let first_avg = per_meal(first, key);
        let second_avg = per_meal(second, key);
        let change = if first_avg > 0.0 {
            (second_avg - first_avg) / first_avg * 100.0
        } else {
            0.0
        };
        let direction = TrendDirection::from_change(change);

        trend_metrics.insert(
            key.clone(),
            MetricTrend {
                average_per_day: total / n as f64,
                average_per_meal: if total_meals > 0 {
                    total / f64::from(total_meals)
                } else {
                    0.0
                },
                change_per_meal_percent: change,
                direction,
                target,
            },
        );

        let rounded = round_half_up(change).abs();
        let message = match direction {
            TrendDirection::Up => format!(
                "Since the start of this range, your average {key} per meal increased by {rounded}%"
            ),
            TrendDirection::Down => format!(
                "Since the start of this range, your average {key} per meal decreased by {rounded}%"
            ),
            TrendDirection::Flat => {
                format!("Your average {key} per meal has stayed about the same over this range")
            }
        };
        narratives.push(Narrative {
            metric: key.clone(),
            direction,
            change_percent: change,
            message,
        });
    }

    Trend {
        series,
        metrics: trend_metrics,
        narratives,
    }
}

fn per_meal(days: &[DayTotals], key: &str) -> f64 {
    let meals: u32 = days.iter().map(|d| d.meal_count).sum();
    if meals == 0 {
        return 0.0;
    }
    days.iter().map(|d| d.totals.metric(key)).sum::<f64>() / f64::from(meals)
}

/// Consecutive days with at least one meal, counted backward from `end` and
/// never past `start`.
pub fn compute_streak(days: &[DayTotals], start: Date, end: Date) -> u32 {
    if days.is_empty() {
        return 0;
    }
    let counts: BTreeMap<Date, u32> = days.iter().map(|d| (d.date, d.meal_count)).collect();

    let mut streak = 0;
    let mut current = end;
    while current >= start {
        if counts.get(&current).copied().unwrap_or(0) == 0 {
            break;
        }
        streak += 1;
        match current.previous_day() {
            Some(prev) => current = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::targets::MetricTarget;
    use serde_json::json;
    use time::macros::date;

    fn day(date: Date, meal_count: u32, calories: f64) -> DayTotals {
        DayTotals {
            date,
            meal_count,
            totals: NutrientTotals {
                calories,
                ..Default::default()
            },
        }
    }

    fn calories_plan() -> MetricTargets {
        let mut m = MetricTargets::new();
        m.insert("calories".into(), MetricTarget::enabled(2000.0, "kcal"));
        m
    }

    #[test]
    fn streak_stops_at_first_empty_day() {
        let days = vec![
            day(date!(2025 - 03 - 01), 1, 500.0),
            day(date!(2025 - 03 - 02), 1, 500.0),
            day(date!(2025 - 03 - 03), 0, 0.0),
            day(date!(2025 - 03 - 04), 1, 500.0),
            day(date!(2025 - 03 - 05), 1, 500.0),
        ];
        let streak = compute_streak(&days, date!(2025 - 03 - 01), date!(2025 - 03 - 05));
        assert_eq!(streak, 2);
    }

    #[test]
    fn streak_treats_missing_days_as_empty() {
        let days = vec![
            day(date!(2025 - 03 - 01), 2, 500.0),
            day(date!(2025 - 03 - 03), 1, 500.0),
        ];
        assert_eq!(
            compute_streak(&days, date!(2025 - 03 - 01), date!(2025 - 03 - 03)),
            1
        );
        assert_eq!(
            compute_streak(&days, date!(2025 - 03 - 01), date!(2025 - 03 - 04)),
            0
        );
    }

    #[test]
    fn streak_never_walks_past_range_start() {
        let days = vec![
            day(date!(2025 - 03 - 01), 1, 500.0),
            day(date!(2025 - 03 - 02), 1, 500.0),
            day(date!(2025 - 03 - 03), 1, 500.0),
        ];
        assert_eq!(
            compute_streak(&days, date!(2025 - 03 - 02), date!(2025 - 03 - 03)),
            2
        );
        assert_eq!(compute_streak(&[], date!(2025 - 03 - 01), date!(2025 - 03 - 03)), 0);
    }

    #[test]
    fn trend_up_when_second_half_per_meal_grows() {
        let days = vec![
            day(date!(2025 - 03 - 01), 2, 1000.0),
            day(date!(2025 - 03 - 02), 2, 1000.0),
            day(date!(2025 - 03 - 03), 2, 1400.0),
            day(date!(2025 - 03 - 04), 2, 1400.0),
        ];
        let trend = compute_trend(&days, &calories_plan());
        let calories = &trend.metrics["calories"];
        assert_eq!(calories.direction, TrendDirection::Up);
        assert!((calories.change_per_meal_percent - 40.0).abs() < 1e-9);
        assert_eq!(calories.average_per_day, 1200.0);
        assert_eq!(calories.average_per_meal, 600.0);
        assert_eq!(
            trend.narratives[0].message,
            "Since the start of this range, your average calories per meal increased by 40%"
        );
        assert_eq!(trend.series.len(), 4);
        assert_eq!(trend.series[0].targets["calories"], 2000.0);
    }

    #[test]
    fn trend_down_and_flat() {
        let down = vec![
            day(date!(2025 - 03 - 01), 1, 1000.0),
            day(date!(2025 - 03 - 02), 1, 800.0),
        ];
        let trend = compute_trend(&down, &calories_plan());
        assert_eq!(trend.metrics["calories"].direction, TrendDirection::Down);
        assert!(trend.narratives[0].message.contains("decreased by 20%"));

        let flat = vec![
            day(date!(2025 - 03 - 01), 1, 1000.0),
            day(date!(2025 - 03 - 02), 1, 1040.0),
        ];
        let trend = compute_trend(&flat, &calories_plan());
        assert_eq!(trend.metrics["calories"].direction, TrendDirection::Flat);
    }

    #[test]
    fn odd_length_shares_middle_day() {
        let days = vec![
            day(date!(2025 - 03 - 01), 1, 100.0),
            day(date!(2025 - 03 - 02), 1, 100.0),
            day(date!(2025 - 03 - 03), 1, 400.0),
        ];
        // first = days 1-2 (100/meal), second = days 2-3 (250/meal)
        let trend = compute_trend(&days, &calories_plan());
        assert!((trend.metrics["calories"].change_per_meal_percent - 150.0).abs() < 1e-9);
    }

    #[test]
    fn trend_is_empty_without_enabled_metrics() {
        let days = vec![day(date!(2025 - 03 - 01), 1, 100.0)];
        let trend = compute_trend(&days, &MetricTargets::new());
        assert!(trend.series.is_empty());
        assert!(trend.metrics.is_empty());
        assert!(trend.narratives.is_empty());
    }

    #[test]
    fn summarize_groups_meals_by_date() {
        let breakfast: Vec<LineItem> =
            serde_json::from_value(json!([{ "calories": 300 }])).unwrap();
        let lunch: Vec<LineItem> =
            serde_json::from_value(json!([{ "calories": 500, "quantity": 2 }])).unwrap();
        let days = summarize_days(vec![
            (date!(2025 - 03 - 02), lunch.as_slice()),
            (date!(2025 - 03 - 01), breakfast.as_slice()),
            (date!(2025 - 03 - 02), breakfast.as_slice()),
        ]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date!(2025 - 03 - 01));
        assert_eq!(days[0].meal_count, 1);
        assert_eq!(days[1].meal_count, 2);
        assert_eq!(days[1].totals.calories, 1300.0);
    }
}
