use std::collections::HashSet;

use serde::Serialize;
use time::Date;
use tracing::debug;

use super::aggregation::{
    compliance_score, meal_totals, streak_days, totals_by_day, week_grid, WeekDay,
};
use super::calendar::{LocalClock, ReportWindow};
use super::weight::{weekly_change, weight_series, WeightPoint};
use crate::auth::repo_types::User;
use crate::auth::services::Session;
use crate::custom_foods::repo_types::CustomFood;
use crate::meals::repo_types::Meal;
use crate::nutrition::{MacroGoals, MacroTotals};
use crate::store::Store;
use crate::tenant::TenantId;
use crate::weights::repo_types::WeightLog;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeal {
    #[serde(flatten)]
    pub meal: Meal,
    pub calories: f64,
}

impl From<Meal> for DashboardMeal {
    fn from(meal: Meal) -> Self {
        let calories = meal.calories();
        Self { meal, calories }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum DashboardView {
    #[serde(rename = "guest", rename_all = "camelCase")]
    Guest { experience_id: TenantId },
    #[serde(rename = "ready")]
    Ready(Box<Dashboard>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub experience_id: TenantId,
    pub user: User,
    pub selected_date: String,
    pub week_number: u8,
    pub targets: MacroGoals,
    pub consumed: MacroTotals,
    pub consumed_calories: f64,
    pub compliance_score: u32,
    pub streak_days: u32,
    pub week_days: Vec<WeekDay>,
    pub meals: Vec<DashboardMeal>,
    pub weight_series: Vec<WeightPoint>,
    pub latest_weight: Option<WeightLog>,
    pub weekly_change: Option<f64>,
    pub weight_history: Vec<WeightLog>,
    pub custom_foods: Vec<CustomFood>,
}

pub async fn build_dashboard(
    store: &dyn Store,
    session: &Session,
    clock: &LocalClock,
    window: &ReportWindow,
    goal_slope: Option<f64>,
) -> anyhow::Result<Dashboard> {
    let owner = session.owner();
    let selected = window.selected;

    let (day_meals, week_meals, recent_times, weights, custom_foods) = tokio::try_join!(
        store.list_meals(&owner, window.day),
        store.list_meals(&owner, window.week),
        store.meal_times(&owner, window.streak),
        store.weight_history(&owner),
        store.list_custom_foods(&owner),
    )?;

    let targets = session.macro_target.goals();
    let consumed = meal_totals(&day_meals).rounded();
    let logged_days: HashSet<Date> = recent_times.iter().map(|t| clock.local_date(*t)).collect();
    let meals: Vec<DashboardMeal> = day_meals.into_iter().map(DashboardMeal::from).collect();

    debug!(
        user_id = %session.user.id,
        meals = meals.len(),
        weights = weights.len(),
        "dashboard loaded"
    );

    Ok(Dashboard {
        experience_id: session.tenant.clone(),
        user: session.user.clone(),
        selected_date: selected.to_string(),
        week_number: selected.iso_week(),
        targets,
        consumed,
        consumed_calories: meals.iter().map(|m| m.calories).sum(),
        compliance_score: compliance_score(&consumed, &targets),
        streak_days: streak_days(&logged_days, selected),
        week_days: week_grid(selected, &totals_by_day(&week_meals, clock), &targets),
        meals,
        weight_series: weight_series(&weights, goal_slope),
        latest_weight: weights.last().cloned(),
        weekly_change: weekly_change(&weights),
        weight_history: weights,
        custom_foods,
    })
}
