// src/shift_policy.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::attendance::{CalendarDay, ShiftWindow, SkipReason, SubmissionMode};
use crate::shift_index::ShiftIndex;

/// A 7h day.
pub const SHORT_DAY_MINUTES: Decimal = dec!(420);
/// An 8h15 day, worked with a tracked break.
pub const STANDARD_DAY_MINUTES: Decimal = dec!(495);

pub const SHORT_DAY_CLOCK_IN: &str = "08:00";
pub const SHORT_DAY_CLOCK_OUT: &str = "15:00";

#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Window used for the overlap check and for regular days.
    pub default_window: ShiftWindow,
    pub today_only: bool,
    pub until_today: bool,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Proceed {
        window: ShiftWindow,
        mode: SubmissionMode,
    },
}

struct DayContext<'a> {
    day: &'a CalendarDay,
    shifts: &'a ShiftIndex,
    config: &'a PolicyConfig,
}

type SkipRule = fn(&DayContext<'_>) -> Option<SkipReason>;

// Order is precedence: the first rule returning a reason decides the day.
const SKIP_RULES: [(&str, SkipRule); 5] = [
    ("overlap", overlap_rule),
    ("leave", leave_rule),
    ("non-laborable", non_laborable_rule),
    ("today-only", today_only_rule),
    ("until-today", until_today_rule),
];

// Compares against the configured default window even when the day later
// gets the short window.
fn overlap_rule(ctx: &DayContext<'_>) -> Option<SkipReason> {
    let window = &ctx.config.default_window;
    match ctx
        .shifts
        .overlaps(ctx.day.day_of_month, &window.clock_in, &window.clock_out)
    {
        Ok(Some(range)) => Some(SkipReason::PeriodOverlap(range)),
        Ok(None) => None,
        Err(e) => Some(SkipReason::OverlapUndetermined(e.to_string())),
    }
}

fn leave_rule(ctx: &DayContext<'_>) -> Option<SkipReason> {
    ctx.day.is_leave.then(|| {
        SkipReason::Leave(
            ctx.day
                .leave_name
                .clone()
                .unwrap_or_else(|| "Leave".to_string()),
        )
    })
}

fn non_laborable_rule(ctx: &DayContext<'_>) -> Option<SkipReason> {
    (!ctx.day.is_laborable).then(|| SkipReason::NonLaborable(ctx.day.date.weekday()))
}

fn today_only_rule(ctx: &DayContext<'_>) -> Option<SkipReason> {
    (ctx.config.today_only && ctx.day.date != ctx.config.today).then_some(SkipReason::TodayOnly)
}

fn until_today_rule(ctx: &DayContext<'_>) -> Option<SkipReason> {
    (ctx.config.until_today && ctx.day.date > ctx.config.today).then_some(SkipReason::UntilToday)
}

/// July 1st through September 14th, inclusive.
pub fn is_summer(date: NaiveDate) -> bool {
    match date.month() {
        7 | 8 => true,
        9 => date.day() <= 14,
        _ => false,
    }
}

/// Picks the window and submission mode for a day that is not skipped.
pub fn shift_shape(day: &CalendarDay, default_window: &ShiftWindow) -> (ShiftWindow, SubmissionMode) {
    let summer = is_summer(day.date);

    if day.minutes_owed == SHORT_DAY_MINUTES || day.day_before_holiday || summer {
        (
            ShiftWindow::new(SHORT_DAY_CLOCK_IN, SHORT_DAY_CLOCK_OUT),
            SubmissionMode::Direct,
        )
    } else if day.minutes_owed == STANDARD_DAY_MINUTES {
        (default_window.clone(), SubmissionMode::WithBreak)
    } else {
        (default_window.clone(), SubmissionMode::Direct)
    }
}

pub fn decide(day: &CalendarDay, shifts: &ShiftIndex, config: &PolicyConfig) -> Decision {
    let ctx = DayContext {
        day,
        shifts,
        config,
    };

    for (name, rule) in SKIP_RULES.iter() {
        if let Some(reason) = rule(&ctx) {
            debug!("Day {} skipped by '{}' rule: {}", day.day_of_month, name, reason);
            return Decision::Skip(reason);
        }
    }

    let (window, mode) = shift_shape(day, &config.default_window);
    debug!(
        "Day {} proceeds with {} ({:?}), minutes owed {}",
        day.day_of_month, window, mode, day.minutes_owed
    );
    Decision::Proceed { window, mode }
}
