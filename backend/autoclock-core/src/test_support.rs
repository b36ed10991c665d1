// src/test_support.rs
// In-memory stand-ins for the Factorial service, shared by the unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use std::sync::Mutex;

use crate::attendance::{CalendarDay, ExistingShift, ShiftWindow};
use crate::attendance_api::{
    AttendanceApi, AttendanceMutations, CalendarDayRecord, ClockPayload, NewShift, Period,
    ShiftRecord,
};
use crate::factorial_client::FactorialError;
use crate::shift_index::ShiftIndex;
use crate::shift_policy::PolicyConfig;
use crate::session::Session;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn working_day(year: i32, month: u32, day: u32, minutes_owed: i64) -> CalendarDay {
    CalendarDay {
        day_of_month: day,
        date: date(year, month, day),
        is_laborable: true,
        is_leave: false,
        leave_name: None,
        day_before_holiday: false,
        minutes_owed: Decimal::from(minutes_owed),
    }
}

pub fn shift(id: i64, day: u32, clock_in: &str, clock_out: &str) -> ExistingShift {
    ExistingShift {
        id,
        day_of_month: day,
        clock_in: clock_in.to_string(),
        clock_out: clock_out.to_string(),
    }
}

pub fn policy(today: NaiveDate) -> PolicyConfig {
    PolicyConfig {
        default_window: ShiftWindow::new("09:00", "18:00"),
        today_only: false,
        until_today: false,
        today,
    }
}

pub fn session(year: i32, month: u32, calendar: Vec<CalendarDay>, shifts: Vec<ExistingShift>) -> Session {
    Session {
        employee_id: 930867,
        period_id: 42,
        year,
        month,
        calendar,
        shifts: ShiftIndex::new(shifts),
    }
}

/// Stands in for a transport failure; reqwest errors cannot be built by hand.
pub fn fatal_error() -> FactorialError {
    FactorialError::Json(serde_json::from_str::<i32>("not json").unwrap_err())
}

/// Records every mutation in call order and optionally rejects one of them.
#[derive(Default)]
pub struct RecordingMutations {
    pub calls: Mutex<Vec<String>>,
    reject: Option<(&'static str, StatusCode)>,
    fail_fatally_on: Option<&'static str>,
}

impl RecordingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(call: &'static str, status: StatusCode) -> Self {
        Self {
            reject: Some((call, status)),
            ..Self::default()
        }
    }

    pub fn failing_fatally(call: &'static str) -> Self {
        Self {
            fail_fatally_on: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str, detail: String) -> Result<(), FactorialError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", name, detail));
        if self.fail_fatally_on == Some(name) {
            return Err(fatal_error());
        }
        match self.reject {
            Some((call, status)) if call == name => Err(FactorialError::ApiError {
                status,
                message: "rejected by fake".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AttendanceMutations for RecordingMutations {
    async fn create_shift(&self, shift: &NewShift) -> Result<(), FactorialError> {
        self.record(
            "create_shift",
            format!("{} {}-{}", shift.date, shift.clock_in, shift.clock_out),
        )
    }

    async fn clock_in(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.record("clock_in", payload.now.format("%Y-%m-%dT%H:%M").to_string())
    }

    async fn break_start(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.record("break_start", payload.now.format("%Y-%m-%dT%H:%M").to_string())
    }

    async fn break_end(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.record("break_end", payload.now.format("%Y-%m-%dT%H:%M").to_string())
    }

    async fn clock_out(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.record("clock_out", payload.now.format("%Y-%m-%dT%H:%M").to_string())
    }

    async fn delete_shift(&self, shift_id: i64) -> Result<(), FactorialError> {
        self.record("delete_shift", shift_id.to_string())
    }
}

/// Serves a fixed month and records which fetches ran.
pub struct FakeAttendanceApi {
    pub period: Period,
    pub calendar: Vec<CalendarDayRecord>,
    pub minutes: Vec<Decimal>,
    pub shifts: Vec<ShiftRecord>,
    pub reject_login: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAttendanceApi {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            calendar: Vec::new(),
            minutes: Vec::new(),
            shifts: Vec::new(),
            reject_login: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AttendanceApi for FakeAttendanceApi {
    async fn login(&self, email: &str, _password: &str) -> Result<(), FactorialError> {
        self.record(format!("login {}", email));
        if self.reject_login {
            return Err(FactorialError::LoginRejected(
                "Invalid email or password.".to_string(),
            ));
        }
        Ok(())
    }

    async fn fetch_period(&self, year: i32, month: u32) -> Result<Period, FactorialError> {
        self.record(format!("fetch_period {}/{}", month, year));
        if self.period.year == year && self.period.month == month {
            Ok(self.period.clone())
        } else {
            Err(FactorialError::PeriodNotFound { year, month })
        }
    }

    async fn fetch_calendar(
        &self,
        employee_id: i64,
        _year: i32,
        _month: u32,
    ) -> Result<Vec<CalendarDayRecord>, FactorialError> {
        self.record(format!("fetch_calendar {}", employee_id));
        Ok(self.calendar.clone())
    }

    async fn fetch_minutes_owed(
        &self,
        employee_id: i64,
        _year: i32,
        _month: u32,
        start_on: NaiveDate,
        end_on: NaiveDate,
    ) -> Result<Vec<Decimal>, FactorialError> {
        self.record(format!(
            "fetch_minutes_owed {} {}..{}",
            employee_id, start_on, end_on
        ));
        Ok(self.minutes.clone())
    }

    async fn fetch_shifts(
        &self,
        employee_id: i64,
        _year: i32,
        _month: u32,
    ) -> Result<Vec<ShiftRecord>, FactorialError> {
        self.record(format!("fetch_shifts {}", employee_id));
        Ok(self.shifts.clone())
    }
}
