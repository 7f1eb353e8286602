use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::nutrition::round1;
use crate::weights::repo_types::WeightLog;

/// Window `N` of the trend EMA; alpha = 2 / (N + 1).
pub const TREND_WINDOW: f64 = 7.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_for: OffsetDateTime,
    pub weight: f64,
    pub trend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
}

/// Exponential moving average seeded with the first reading.
pub fn trend(weights: &[f64]) -> Vec<f64> {
    let alpha = 2.0 / (TREND_WINDOW + 1.0);
    let mut out = Vec::with_capacity(weights.len());
    for (i, w) in weights.iter().enumerate() {
        let next = if i == 0 {
            *w
        } else {
            w * alpha + out[i - 1] * (1.0 - alpha)
        };
        out.push(next);
    }
    out
}

/// Chart series over readings sorted oldest first. The goal line drops
/// `goal_slope` per reading from the first weight and is left out when unset.
pub fn weight_series(logs: &[WeightLog], goal_slope: Option<f64>) -> Vec<WeightPoint> {
    let weights: Vec<f64> = logs.iter().map(|l| l.weight_lbs).collect();
    let first = weights.first().copied();
    logs.iter()
        .zip(trend(&weights))
        .enumerate()
        .map(|(i, (log, t))| WeightPoint {
            recorded_for: log.recorded_for,
            weight: round1(log.weight_lbs),
            trend: round1(t),
            goal: goal_slope
                .zip(first)
                .map(|(slope, start)| round1(start - i as f64 * slope)),
        })
        .collect()
}

/// Latest reading minus the last reading at least seven days older, over
/// readings sorted oldest first.
pub fn weekly_change(logs: &[WeightLog]) -> Option<f64> {
    if logs.len() < 2 {
        return None;
    }
    let latest = logs.last()?;
    let cutoff = latest.recorded_for - Duration::days(7);
    let reference = logs.iter().filter(|l| l.recorded_for <= cutoff).last()?;
    Some(round1(latest.weight_lbs - reference.weight_lbs))
}
