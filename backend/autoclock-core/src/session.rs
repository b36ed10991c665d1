// src/session.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::attendance::{CalendarDay, ExistingShift};
use crate::attendance_api::{AttendanceApi, CalendarDayRecord, ShiftRecord};
use crate::factorial_client::FactorialError;
use crate::shift_index::ShiftIndex;

/// Everything one run knows about the target month.
///
/// Built once by [`Session::establish`] and read-only afterwards. Shifts
/// created during the run are not added to `shifts`.
#[derive(Debug, Clone)]
pub struct Session {
    pub employee_id: i64,
    pub period_id: i64,
    pub year: i32,
    pub month: u32,
    pub calendar: Vec<CalendarDay>,
    pub shifts: ShiftIndex,
}

impl Session {
    /// Signs in and loads the month. Each step needs what the previous one
    /// returned, so they run strictly in order and the first error aborts.
    pub async fn establish<A: AttendanceApi + ?Sized>(
        api: &A,
        email: &str,
        password: &str,
        year: i32,
        month: u32,
    ) -> Result<Self, FactorialError> {
        info!("Logging in...");
        api.login(email, password).await?;

        info!("Getting periods data...");
        let period = api.fetch_period(year, month).await?;
        debug!(
            "Using period {} for employee {}",
            period.id, period.employee_id
        );

        info!("Getting calendar data...");
        let records = api.fetch_calendar(period.employee_id, year, month).await?;
        let mut calendar = build_calendar(records, year, month);

        if let (Some(first), Some(last)) = (calendar.first(), calendar.last()) {
            let (start_on, end_on) = (first.date, last.date);
            let minutes = api
                .fetch_minutes_owed(period.employee_id, year, month, start_on, end_on)
                .await?;
            backfill_minutes_owed(&mut calendar, start_on, &minutes);
        } else {
            warn!("Calendar for {}/{} is empty", month, year);
        }

        info!("Getting shifts data...");
        let records = api.fetch_shifts(period.employee_id, year, month).await?;
        let shifts = ShiftIndex::new(records.into_iter().map(existing_shift).collect());
        info!(
            "Session ready: {} calendar days, {} existing shifts",
            calendar.len(),
            shifts.len()
        );

        Ok(Self {
            employee_id: period.employee_id,
            period_id: period.id,
            year,
            month,
            calendar,
            shifts,
        })
    }
}

/// Keeps the days that belong to the target month, one per day, sorted.
pub fn build_calendar(records: Vec<CalendarDayRecord>, year: i32, month: u32) -> Vec<CalendarDay> {
    let mut by_day: BTreeMap<u32, CalendarDay> = BTreeMap::new();

    for record in records {
        if record.date.year() != year || record.date.month() != month {
            debug!("Ignoring calendar entry outside {}/{}: {}", month, year, record.date);
            continue;
        }
        if by_day.contains_key(&record.day) {
            warn!("Duplicate calendar entry for day {}, keeping the first", record.day);
            continue;
        }
        by_day.insert(
            record.day,
            CalendarDay {
                day_of_month: record.day,
                date: record.date,
                is_laborable: record.is_laborable,
                is_leave: record.is_leave,
                leave_name: record.leave_name,
                day_before_holiday: record.day_before_holiday,
                minutes_owed: Decimal::ZERO,
            },
        );
    }

    by_day.into_values().collect()
}

/// Copies the estimate onto each day. The distribution starts at `start_on`
/// with one entry per calendar date.
pub fn backfill_minutes_owed(calendar: &mut [CalendarDay], start_on: NaiveDate, minutes: &[Decimal]) {
    for day in calendar.iter_mut() {
        let offset = (day.date - start_on).num_days();
        match usize::try_from(offset).ok().and_then(|i| minutes.get(i)) {
            Some(value) => day.minutes_owed = *value,
            None => warn!("No minutes estimate for {}", day.date),
        }
    }
}

fn existing_shift(record: ShiftRecord) -> ExistingShift {
    ExistingShift {
        id: record.id,
        day_of_month: record.day,
        clock_in: record.clock_in.unwrap_or_default(),
        clock_out: record.clock_out.unwrap_or_default(),
    }
}
