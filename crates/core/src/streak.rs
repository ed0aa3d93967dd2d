//! Write-time streak calculation.
//!
//! The value computed here is stored on the new completion row as the
//! "streak at time of completion". It is a snapshot: filling an earlier gap
//! or deleting an earlier completion later does not rewrite stored values.

use std::collections::HashSet;

use crate::dates::previous_day;
use crate::types::CalendarDate;

/// Streak assigned to the first completion of a habit, and to any completion
/// whose previous day is missing from the log.
pub const STARTING_STREAK: i32 = 1;

/// Compute the streak for a completion on `completing`, given every date
/// already present in the habit's completion log.
///
/// Walks backward one calendar day at a time starting from the day before
/// `completing`, counting consecutive days that exist in `history`. The
/// result is `1 + consecutive_hits`. Dates after `completing` never count.
pub fn streak_ending_at<I>(history: I, completing: CalendarDate) -> i32
where
    I: IntoIterator<Item = CalendarDate>,
{
    let logged: HashSet<CalendarDate> = history.into_iter().collect();
    if logged.is_empty() {
        return STARTING_STREAK;
    }

    let mut hits = 0;
    let mut cursor = previous_day(completing);
    while let Some(day) = cursor {
        if !logged.contains(&day) {
            break;
        }
        hits += 1;
        cursor = previous_day(day);
    }

    STARTING_STREAK + hits
}
