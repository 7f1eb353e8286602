use std::collections::{HashMap, HashSet};

use serde::Serialize;
use time::{Date, Duration};

use super::calendar::{weekday_label, week_start, LocalClock};
use crate::meals::repo_types::Meal;
use crate::nutrition::{MacroGoals, MacroTotals};

/// Per-macro ceiling on consumed/target, so overshooting one macro cannot hide another.
pub const COMPLIANCE_RATIO_CAP: f64 = 1.2;
/// How far back the logging streak looks.
pub const STREAK_LOOKBACK_DAYS: u32 = 30;

/// Whole-number percentage in `[0, 100]`; 0 when no target is positive.
pub fn compliance_score(consumed: &MacroTotals, target: &MacroGoals) -> u32 {
    let ratios: Vec<f64> = [
        (consumed.protein, target.protein),
        (consumed.carbs, target.carbs),
        (consumed.fats, target.fats),
    ]
    .into_iter()
    .filter(|(_, goal)| *goal > 0.0)
    .map(|(eaten, goal)| (eaten / goal).min(COMPLIANCE_RATIO_CAP))
    .collect();

    if ratios.is_empty() {
        return 0;
    }
    let average = ratios.iter().sum::<f64>() / ratios.len() as f64;
    (average * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Sum of the stored meal totals.
pub fn meal_totals(meals: &[Meal]) -> MacroTotals {
    meals.iter().map(Meal::totals).sum()
}

pub fn totals_by_day(meals: &[Meal], clock: &LocalClock) -> HashMap<Date, MacroTotals> {
    let mut by_day: HashMap<Date, MacroTotals> = HashMap::new();
    for meal in meals {
        by_day
            .entry(clock.local_date(meal.logged_at))
            .or_default()
            .add(meal.totals());
    }
    by_day
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    pub label: &'static str,
    pub date_label: String,
    pub iso_date: String,
    pub is_selected: bool,
    pub is_logged: bool,
    pub compliance: u32,
}

/// Monday-to-Sunday grid around `selected`, each day scored on its own totals.
pub fn week_grid(
    selected: Date,
    by_day: &HashMap<Date, MacroTotals>,
    target: &MacroGoals,
) -> Vec<WeekDay> {
    let Some(monday) = week_start(selected) else {
        return Vec::new();
    };
    (0..7)
        .filter_map(|i| monday.checked_add(Duration::days(i)))
        .map(|day| {
            let totals = by_day.get(&day).copied().unwrap_or_default();
            WeekDay {
                label: weekday_label(day),
                date_label: format!("{:02}", day.day()),
                iso_date: day.to_string(),
                is_selected: day == selected,
                is_logged: totals.any_logged(),
                compliance: compliance_score(&totals, target),
            }
        })
        .collect()
}

/// Consecutive days with at least one meal, counting back from `selected`.
pub fn streak_days(logged: &HashSet<Date>, selected: Date) -> u32 {
    let mut streak = 0;
    let mut day = selected;
    while streak < STREAK_LOOKBACK_DAYS && logged.contains(&day) {
        streak += 1;
        match day.previous_day() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
