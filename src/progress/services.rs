use std::collections::BTreeMap;

use time::Date;

use super::dto::{DateRange, DayProgress, RangeProgress, TodayProgress};
use crate::{
    meals::{dto::MealLog, repo_types::MealRow},
    nutrition::{
        progress::{build_progress, call_to_action},
        totals::NutrientTotals,
        trend::{compute_streak, compute_trend, summarize_days},
        value::round1,
    },
    plans::dto::NutritionPlan,
};

/// Metric keys reported in `totalsNumeric`.
const CONSUMED_KEYS: [&str; 8] = [
    "calories",
    "protein",
    "totalFat",
    "saturatedFat",
    "totalCarbs",
    "fiber",
    "sugars",
    "sodium",
];

fn consumed(totals: &NutrientTotals) -> BTreeMap<String, f64> {
    CONSUMED_KEYS
        .iter()
        .map(|k| (k.to_string(), round1(totals.metric(k))))
        .collect()
}

/// Progress of one day's meals against the plan.
pub fn today_report(plan: &NutritionPlan, date: Date, rows: &[MealRow]) -> TodayProgress {
    let totals = NutrientTotals::aggregate(rows.iter().flat_map(|r| r.items.0.iter()));
    TodayProgress {
        has_active_plan: true,
        plan_name: plan.display_name().to_string(),
        date,
        meal_count: rows.len(),
        progress: build_progress(&totals, &plan.metrics),
    }
}

/// Per-day progress, trend and streak over `[start, end]`.
pub fn range_report(plan: &NutritionPlan, start: Date, end: Date, rows: Vec<MealRow>) -> RangeProgress {
    let summaries = summarize_days(rows.iter().map(|r| (r.meal_date, r.items.0.as_slice())));

    let days = summaries
        .iter()
        .map(|day| {
            let progress = build_progress(&day.totals, &plan.metrics);
            DayProgress {
                date: day.date,
                meal_count: day.meal_count,
                totals_formatted: day.totals.formatted(),
                totals_numeric: consumed(&day.totals),
                call_to_action: call_to_action(day.meal_count, &progress),
                progress,
            }
        })
        .collect();

    let trend = compute_trend(&summaries, &plan.metrics);
    let streak = compute_streak(&summaries, start, end);

    let mut meals: Vec<MealLog> = rows.into_iter().map(Into::into).collect();
    meals.sort_by(|a, b| b.eaten_at.cmp(&a.eaten_at));

    RangeProgress {
        has_active_plan: true,
        plan_name: plan.display_name().to_string(),
        plan_id: plan.id,
        range: DateRange { start, end },
        days,
        meals,
        trend,
        streak,
    }
}
