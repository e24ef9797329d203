//! Daily streak and completion arithmetic

use chrono::{Local, NaiveDate};

use crate::storage::{ProgressRecord, StreakRecord};

/// Source of "today" for streak bookkeeping
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar day in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Apply one study session on `today` to a streak.
///
/// - studied already today: unchanged
/// - last studied yesterday: streak grows by one
/// - otherwise (gap, first session, or a date in the future): restarts at 1
pub fn advance_streak(streak: StreakRecord, today: NaiveDate) -> StreakRecord {
    let current = match streak.last_study_date {
        Some(last) if last == today => return streak,
        Some(last) if last.succ_opt() == Some(today) => streak.current_streak.saturating_add(1),
        _ => 1,
    };

    StreakRecord {
        current_streak: current,
        longest_streak: streak.longest_streak.max(current),
        last_study_date: Some(today),
    }
}

/// Whole-percent completion, rounded down and clamped to 0-100.
/// A category with no items is 0% complete.
pub fn completion_rate(studied: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (studied as u128 * 100) / total as u128;
    percent.min(100) as u8
}

pub fn progress_record(studied: usize, total: usize) -> ProgressRecord {
    ProgressRecord {
        completion_rate: completion_rate(studied, total),
        studied_count: studied,
        total_count: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_session_starts_streak() {
        let streak = advance_streak(StreakRecord::default(), day(2026, 5, 1));
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_study_date, Some(day(2026, 5, 1)));
    }

    #[test]
    fn test_yesterday_increments() {
        let before = StreakRecord {
            current_streak: 3,
            longest_streak: 3,
            last_study_date: Some(day(2026, 2, 28)),
        };
        let after = advance_streak(before, day(2026, 3, 1));
        assert_eq!(after.current_streak, 4);
        assert_eq!(after.longest_streak, 4);
    }

    #[test]
    fn test_same_day_is_noop() {
        let before = StreakRecord {
            current_streak: 2,
            longest_streak: 5,
            last_study_date: Some(day(2026, 5, 1)),
        };
        assert_eq!(advance_streak(before, day(2026, 5, 1)), before);
    }

    #[test]
    fn test_gap_resets_but_keeps_longest() {
        let before = StreakRecord {
            current_streak: 6,
            longest_streak: 9,
            last_study_date: Some(day(2026, 5, 1)),
        };
        let after = advance_streak(before, day(2026, 5, 3));
        assert_eq!(after.current_streak, 1);
        assert_eq!(after.longest_streak, 9);
    }

    #[test]
    fn test_last_date_at_calendar_end_restarts() {
        let before = StreakRecord {
            current_streak: 4,
            longest_streak: 4,
            last_study_date: Some(NaiveDate::MAX),
        };
        let after = advance_streak(before, day(2026, 5, 1));
        assert_eq!(after.current_streak, 1);
        assert_eq!(after.longest_streak, 4);
        assert_eq!(after.last_study_date, Some(day(2026, 5, 1)));
    }

    #[test]
    fn test_streak_saturates_at_max() {
        let before = StreakRecord {
            current_streak: u32::MAX,
            longest_streak: u32::MAX,
            last_study_date: Some(day(2026, 4, 30)),
        };
        let after = advance_streak(before, day(2026, 5, 1));
        assert_eq!(after.current_streak, u32::MAX);
        assert_eq!(after.longest_streak, u32::MAX);
    }

    #[test]
    fn test_completion_rate_bounds() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(3, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 66);
        assert_eq!(completion_rate(3, 3), 100);
        // Catalog shrank below what was studied
        assert_eq!(completion_rate(7, 5), 100);
    }
}
