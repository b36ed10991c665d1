// src/attendance_api.rs

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::factorial_client::FactorialError;

// --- Factorial API Data Structures ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: i64,
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub estimated_regular_minutes_distribution: Vec<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDayRecord {
    pub day: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_laborable: bool,
    #[serde(default)]
    pub is_leave: bool,
    pub leave_name: Option<String>,
    #[serde(default)]
    pub day_before_holiday: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub id: i64,
    pub day: u32,
    // An open shift has no clock_out yet.
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
}

/// Body of the shift-creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShift {
    pub clock_in: String,
    pub clock_out: String,
    pub day: u32,
    pub employee_id: i64,
    pub workable: bool,
    pub location_type: String,
    pub time_settings_break_configuration_id: Option<i64>,
    pub minutes: Option<i64>,
    pub date: NaiveDate,
    pub source: String,
    pub reference_date: NaiveDate,
}

/// Body of the clock-in, break and clock-out calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockPayload {
    #[serde(with = "clock_timestamp")]
    pub now: NaiveDateTime,
    pub employee_id: i64,
    pub location_type: String,
    pub source: String,
}

mod clock_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

// --- Collaborator traits ---

/// Read side of the attendance service, used while a session is set up.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<(), FactorialError>;

    /// Finds the period for `year`/`month`, which carries the employee id.
    async fn fetch_period(&self, year: i32, month: u32) -> Result<Period, FactorialError>;

    async fn fetch_calendar(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDayRecord>, FactorialError>;

    /// Estimated minutes per day between `start_on` and `end_on`, in date order.
    async fn fetch_minutes_owed(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
        start_on: NaiveDate,
        end_on: NaiveDate,
    ) -> Result<Vec<Decimal>, FactorialError>;

    async fn fetch_shifts(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<ShiftRecord>, FactorialError>;
}

/// Write side of the attendance service.
///
/// A rejected call comes back as [`FactorialError::ApiError`]; anything else
/// means the transport itself failed.
#[async_trait]
pub trait AttendanceMutations: Send + Sync {
    async fn create_shift(&self, shift: &NewShift) -> Result<(), FactorialError>;

    async fn clock_in(&self, payload: &ClockPayload) -> Result<(), FactorialError>;

    async fn break_start(&self, payload: &ClockPayload) -> Result<(), FactorialError>;

    async fn break_end(&self, payload: &ClockPayload) -> Result<(), FactorialError>;

    async fn clock_out(&self, payload: &ClockPayload) -> Result<(), FactorialError>;

    async fn delete_shift(&self, shift_id: i64) -> Result<(), FactorialError>;
}
