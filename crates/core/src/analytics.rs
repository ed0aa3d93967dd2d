//! Read-time analytics over the completion log.
//!
//! Two views are derived from the same rows:
//!
//! - [`build_dashboard`] summarises every habit a user owns.
//! - [`build_habit_analytics`] reconstructs the history of a single habit.
//!
//! Streak figures on the dashboard come from the snapshots stored at write
//! time (see [`crate::streak`]); streak periods in the habit view are
//! rebuilt from the dates themselves.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Duration;
use serde::Serialize;

use crate::dates::{days_between_ceil, format_date_key, is_next_day, month_key, start_of_day};
use crate::types::{CalendarDate, DbId, Timestamp};

/// Number of calendar days (ending today) covered by `weeklyCompletions`.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Upper bound for every completion-rate percentage.
pub const MAX_RATE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The subset of a habit row the dashboard needs.
#[derive(Debug, Clone)]
pub struct HabitSummary {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

/// One row of the completion log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRecord {
    pub habit_id: DbId,
    pub date: CalendarDate,
    /// Streak snapshot stored when the completion was written.
    pub streak: i32,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct DashboardStats {
    pub total_habits: i64,
    pub active_streaks: i64,
    pub completion_rate: f64,
    pub weekly_completions: Vec<CompletionDay>,
    pub habit_stats: Vec<HabitStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct CompletionDay {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct HabitStat {
    pub habit_id: DbId,
    pub habit_name: String,
    /// Snapshot on the latest-dated completion.
    pub current_streak: i32,
    /// Largest snapshot ever stored for the habit.
    pub longest_streak: i32,
    pub completion_rate: f64,
    pub total_completions: i64,
    pub last_completion_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct HabitAnalytics {
    pub habit_id: DbId,
    pub completions_by_date: Vec<CompletionPoint>,
    pub streak_history: Vec<StreakPeriod>,
    pub monthly_stats: Vec<MonthlyStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct CompletionPoint {
    pub date: String,
    /// Always `true`: the log only records positive completions.
    pub completed: bool,
}

/// A maximal run of consecutive completion days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct StreakPeriod {
    pub start_date: String,
    pub end_date: String,
    pub length: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::SimpleObject))]
pub struct MonthlyStat {
    /// `YYYY-MM`.
    pub month: String,
    pub completions: i64,
    pub days: i64,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Build the cross-habit dashboard for one user.
///
/// `completions` may contain rows for habits missing from `habits` (e.g.
/// left behind by an interrupted delete); those rows are ignored.
pub fn build_dashboard(
    habits: &[HabitSummary],
    completions: &[CompletionRecord],
    now: Timestamp,
) -> DashboardStats {
    let mut by_habit: HashMap<DbId, Vec<&CompletionRecord>> =
        habits.iter().map(|h| (h.id, Vec::new())).collect();
    for record in completions {
        if let Some(rows) = by_habit.get_mut(&record.habit_id) {
            rows.push(record);
        }
    }

    let total_habits = habits.len() as i64;
    let total_completions: i64 = by_habit.values().map(|rows| rows.len() as i64).sum();

    let active_streaks = by_habit
        .values()
        .filter(|rows| latest(rows).is_some_and(|r| r.streak > 0))
        .count() as i64;

    let first_created = habits.iter().map(|h| h.created_at).min();
    let completion_rate =
        overall_completion_rate(total_habits, total_completions, first_created, now);

    let owned: Vec<&CompletionRecord> = by_habit.values().flatten().copied().collect();
    let weekly_completions = weekly_completions(&owned, now.date_naive());

    let habit_stats = habits
        .iter()
        .map(|habit| {
            let rows = by_habit.get(&habit.id).map(Vec::as_slice).unwrap_or_default();
            habit_stat(habit, rows, now)
        })
        .collect();

    DashboardStats {
        total_habits,
        active_streaks,
        completion_rate,
        weekly_completions,
        habit_stats,
    }
}

/// Overall completion percentage.
///
/// `completions / (habits * days_since_first_habit)` as a percentage, with
/// the day count floored at 1 and the result clamped to 100. It ignores
/// frequency and the days before later habits existed.
pub fn overall_completion_rate(
    total_habits: i64,
    total_completions: i64,
    first_habit_created_at: Option<Timestamp>,
    now: Timestamp,
) -> f64 {
    let Some(first) = first_habit_created_at else {
        return 0.0;
    };
    if total_habits <= 0 {
        return 0.0;
    }
    let days = days_between_ceil(first, now).max(1);
    let expected = (total_habits * days) as f64;
    round2(clamp_rate(total_completions as f64 / expected * 100.0))
}

/// Per-habit completion percentage.
///
/// Divides by days since the habit's *last completion date*, not its
/// creation date, so it differs from [`overall_completion_rate`] on purpose.
/// Zero when the last completion is not in the past.
pub fn habit_completion_rate(
    total_completions: i64,
    last_completion_date: Option<CalendarDate>,
    now: Timestamp,
) -> f64 {
    let Some(last) = last_completion_date else {
        return 0.0;
    };
    let days = days_between_ceil(start_of_day(last), now);
    if days <= 0 {
        return 0.0;
    }
    round2(clamp_rate(total_completions as f64 / days as f64 * 100.0))
}

/// Completion counts per date for the trailing window ending `today`.
fn weekly_completions(rows: &[&CompletionRecord], today: CalendarDate) -> Vec<CompletionDay> {
    let window_start = today - Duration::days(WEEKLY_WINDOW_DAYS - 1);
    let mut counts: BTreeMap<CalendarDate, i64> = BTreeMap::new();
    for row in rows {
        if row.date >= window_start && row.date <= today {
            *counts.entry(row.date).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(date, count)| CompletionDay {
            date: format_date_key(date),
            count,
        })
        .collect()
}

fn habit_stat(habit: &HabitSummary, rows: &[&CompletionRecord], now: Timestamp) -> HabitStat {
    let last = latest(rows);
    let total_completions = rows.len() as i64;
    let last_date = last.map(|r| r.date);

    HabitStat {
        habit_id: habit.id,
        habit_name: habit.name.clone(),
        current_streak: last.map_or(0, |r| r.streak),
        longest_streak: rows.iter().map(|r| r.streak).max().unwrap_or(0),
        completion_rate: habit_completion_rate(total_completions, last_date, now),
        total_completions,
        last_completion_date: last_date.map(format_date_key),
    }
}

fn latest<'a>(rows: &[&'a CompletionRecord]) -> Option<&'a CompletionRecord> {
    rows.iter().copied().max_by_key(|r| r.date)
}

fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(0.0, MAX_RATE)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Single habit
// ---------------------------------------------------------------------------

/// Build the longitudinal view for one habit from its completion dates.
pub fn build_habit_analytics(habit_id: DbId, dates: &[CalendarDate]) -> HabitAnalytics {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();

    HabitAnalytics {
        habit_id,
        completions_by_date: sorted
            .iter()
            .map(|d| CompletionPoint {
                date: format_date_key(*d),
                completed: true,
            })
            .collect(),
        streak_history: streak_history(&sorted),
        monthly_stats: monthly_stats(&sorted),
    }
}

/// Split ascending completion dates into runs of consecutive days.
///
/// A gap of exactly one day extends the current run; any other gap
/// (including a repeated date) closes it and starts a new run of length 1.
pub fn streak_history(sorted_dates: &[CalendarDate]) -> Vec<StreakPeriod> {
    let mut periods = Vec::new();
    let mut run: Option<(CalendarDate, CalendarDate, i32)> = None;

    for &date in sorted_dates {
        run = match run {
            Some((start, end, length)) if is_next_day(end, date) => Some((start, date, length + 1)),
            Some(closed) => {
                periods.push(period(closed));
                Some((date, date, 1))
            }
            None => Some((date, date, 1)),
        };
    }
    if let Some(open) = run {
        periods.push(period(open));
    }
    periods
}

fn period((start, end, length): (CalendarDate, CalendarDate, i32)) -> StreakPeriod {
    StreakPeriod {
        start_date: format_date_key(start),
        end_date: format_date_key(end),
        length,
    }
}

/// Completions grouped by `YYYY-MM`, ascending by month.
pub fn monthly_stats(dates: &[CalendarDate]) -> Vec<MonthlyStat> {
    let mut buckets: BTreeMap<String, (i64, BTreeSet<CalendarDate>)> = BTreeMap::new();
    for &date in dates {
        let bucket = buckets.entry(month_key(date)).or_default();
        bucket.0 += 1;
        bucket.1.insert(date);
    }
    buckets
        .into_iter()
        .map(|(month, (completions, days))| MonthlyStat {
            month,
            completions,
            days: days.len() as i64,
        })
        .collect()
}
