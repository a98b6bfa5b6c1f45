//! Training statistics.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Entity, Training};

/// Total minutes booked for one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTotal {
    pub activity: String,
    pub total_minutes: u64,
    pub sessions: usize,
}

/// Groups trainings by activity and sums their durations.
///
/// Activities appear in the order they are first seen.
pub fn activity_totals(trainings: &[Entity<Training>]) -> Vec<ActivityTotal> {
    let mut totals: Vec<ActivityTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for training in trainings {
        let activity = training.fields.activity.as_str();
        let slot = *index.entry(activity).or_insert_with(|| {
            totals.push(ActivityTotal {
                activity: activity.to_string(),
                total_minutes: 0,
                sessions: 0,
            });
            totals.len() - 1
        });

        totals[slot].total_minutes += u64::from(training.fields.duration);
        totals[slot].sessions += 1;
    }

    totals
}

/// Renders totals as a horizontal bar chart at most `width` cells wide.
pub fn bar_chart(totals: &[ActivityTotal], width: usize) -> String {
    let Some(max) = totals.iter().map(|t| t.total_minutes).max() else {
        return String::new();
    };
    let label_width = totals
        .iter()
        .map(|t| t.activity.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for total in totals {
        let cells = if max == 0 {
            0
        } else {
            (total.total_minutes as f64 / max as f64 * width as f64).round() as usize
        };
        out.push_str(&format!(
            "{:<label_width$}  {} {} min\n",
            total.activity,
            "#".repeat(cells),
            total.total_minutes,
        ));
    }
    out
}
