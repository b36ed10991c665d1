// src/attendance.rs

use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use std::fmt;

// --- Calendar Model ---

/// One day of the month as the attendance calendar reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub day_of_month: u32,
    pub date: NaiveDate,
    pub is_laborable: bool,
    pub is_leave: bool,
    pub leave_name: Option<String>,
    pub day_before_holiday: bool,
    /// Back-filled from the period estimate after the calendar fetch.
    pub minutes_owed: Decimal,
}

// --- Existing shifts ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingShift {
    pub id: i64,
    pub day_of_month: u32,
    pub clock_in: String,
    pub clock_out: String,
}

impl ExistingShift {
    pub fn range(&self) -> String {
        format!("{} - {}", self.clock_in, self.clock_out)
    }
}

// --- Shift requests ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftWindow {
    pub clock_in: String,
    pub clock_out: String,
}

impl ShiftWindow {
    pub fn new(clock_in: impl Into<String>, clock_out: impl Into<String>) -> Self {
        Self {
            clock_in: clock_in.into(),
            clock_out: clock_out.into(),
        }
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.clock_in, self.clock_out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// A single shift-creation call.
    Direct,
    /// Clock-in, break-start, break-end and clock-out as four calls.
    WithBreak,
}

/// Fixed timestamps used by a break-split submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakSchedule {
    pub clock_in: NaiveTime,
    pub break_start: NaiveTime,
    pub break_end: NaiveTime,
    pub clock_out: NaiveTime,
}

impl BreakSchedule {
    pub fn standard() -> Self {
        Self {
            clock_in: hm(8, 45),
            break_start: hm(14, 30),
            break_end: hm(15, 0),
            clock_out: hm(17, 30),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRequest {
    pub day_of_month: u32,
    pub date: NaiveDate,
    pub window: ShiftWindow,
    pub employee_id: i64,
    pub location_type: String,
    pub mode: SubmissionMode,
}

// --- Reporting ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    PeriodOverlap(String),
    OverlapUndetermined(String),
    Leave(String),
    NonLaborable(Weekday),
    TodayOnly,
    UntilToday,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PeriodOverlap(range) => write!(f, "period overlap: {}", range),
            SkipReason::OverlapUndetermined(detail) => {
                write!(f, "cannot determine overlap: {}", detail)
            }
            SkipReason::Leave(name) => write!(f, "{}", name),
            SkipReason::NonLaborable(weekday) => write!(f, "{}", weekday_name(*weekday)),
            SkipReason::TodayOnly => write!(f, "today-only filter"),
            SkipReason::UntilToday => write!(f, "until-today filter"),
        }
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayStatus {
    Submitted(ShiftWindow),
    WouldSubmit(ShiftWindow),
    Skipped(SkipReason),
    Failed(String),
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayStatus::Submitted(window) => write!(f, "submitted {}", window),
            DayStatus::WouldSubmit(window) => write!(f, "would submit {}", window),
            DayStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            DayStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutcome {
    pub day_of_month: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
}

impl DayOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DayStatus::Failed(_))
    }
}

impl fmt::Display for DayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.status {
            DayStatus::Submitted(_) | DayStatus::WouldSubmit(_) => "✅",
            DayStatus::Skipped(_) | DayStatus::Failed(_) => "❌",
        };
        write!(f, "{}... {} {}", self.date.format("%d %b"), marker, self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStatus {
    Deleted,
    WouldDelete,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub shift_id: i64,
    pub day_of_month: u32,
    /// `None` when the shift's day does not exist in the session month.
    pub date: Option<NaiveDate>,
    pub range: String,
    pub status: ResetStatus,
}

impl ResetOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ResetStatus::Failed(_))
    }

    fn day_label(&self) -> String {
        match self.date {
            Some(date) => date.format("%d %b").to_string(),
            None => format!("day {:02}", self.day_of_month),
        }
    }
}

impl fmt::Display for ResetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = self.day_label();
        match &self.status {
            ResetStatus::Deleted => write!(f, "{}... ✅ Shift deleted: {}", day, self.range),
            ResetStatus::WouldDelete => {
                write!(f, "{}... ✅ Would delete shift: {}", day, self.range)
            }
            ResetStatus::Failed(reason) => write!(
                f,
                "{}... ❌ Error when attempting to delete shift {} ({}): {}",
                day, self.shift_id, self.range, reason
            ),
        }
    }
}
