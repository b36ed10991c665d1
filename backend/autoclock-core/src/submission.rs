// src/submission.rs

use chrono::NaiveTime;
use reqwest::StatusCode;
use std::fmt;
use tracing::{info, warn};

use crate::attendance::{BreakSchedule, ShiftRequest, SubmissionMode};
use crate::attendance_api::{AttendanceMutations, ClockPayload, NewShift};
use crate::factorial_client::FactorialError;

pub const DEFAULT_SOURCE: &str = "desktop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    CreateShift,
    ClockIn,
    BreakStart,
    BreakEnd,
    ClockOut,
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStep::CreateShift => "create-shift",
            SubmissionStep::ClockIn => "clock-in",
            SubmissionStep::BreakStart => "break-start",
            SubmissionStep::BreakEnd => "break-end",
            SubmissionStep::ClockOut => "clock-out",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Accepted,
    Rejected {
        step: SubmissionStep,
        status: StatusCode,
        message: String,
        /// Steps the service already accepted for this day. They are not undone.
        completed: Vec<SubmissionStep>,
    },
}

impl SubmissionResult {
    /// Operator-facing description of a rejection.
    pub fn failure_summary(&self) -> Option<String> {
        match self {
            SubmissionResult::Accepted => None,
            SubmissionResult::Rejected {
                step,
                status,
                completed,
                ..
            } if completed.is_empty() => Some(format!("{} rejected ({})", step, status)),
            SubmissionResult::Rejected {
                step,
                status,
                completed,
                ..
            } => {
                let done: Vec<String> = completed.iter().map(|s| s.to_string()).collect();
                Some(format!(
                    "{} rejected ({}) after {} succeeded, check the day manually",
                    step,
                    status,
                    done.join(", ")
                ))
            }
        }
    }
}

pub fn new_shift_payload(request: &ShiftRequest, source: &str) -> NewShift {
    NewShift {
        clock_in: request.window.clock_in.clone(),
        clock_out: request.window.clock_out.clone(),
        day: request.day_of_month,
        employee_id: request.employee_id,
        workable: true,
        location_type: request.location_type.clone(),
        time_settings_break_configuration_id: None,
        minutes: None,
        date: request.date,
        source: source.to_string(),
        reference_date: request.date,
    }
}

/// Turns a shift request into the remote calls that record it.
pub struct SubmissionSequencer<'a, M: AttendanceMutations + ?Sized> {
    mutations: &'a M,
    source: String,
    break_schedule: BreakSchedule,
}

impl<'a, M: AttendanceMutations + ?Sized> SubmissionSequencer<'a, M> {
    pub fn new(mutations: &'a M) -> Self {
        Self {
            mutations,
            source: DEFAULT_SOURCE.to_string(),
            break_schedule: BreakSchedule::standard(),
        }
    }

    /// Submits the request. `Err` is reserved for failures that end the run;
    /// a status rejection is an `Ok(Rejected { .. })`.
    pub async fn submit(&self, request: &ShiftRequest) -> Result<SubmissionResult, FactorialError> {
        match request.mode {
            SubmissionMode::Direct => self.submit_direct(request).await,
            SubmissionMode::WithBreak => self.submit_with_break(request).await,
        }
    }

    async fn submit_direct(&self, request: &ShiftRequest) -> Result<SubmissionResult, FactorialError> {
        let payload = new_shift_payload(request, &self.source);
        let outcome = self.mutations.create_shift(&payload).await;
        Self::settle(SubmissionStep::CreateShift, outcome, &[]).map(|rejected| {
            rejected.unwrap_or_else(|| {
                info!(
                    "Created shift {} for day {}",
                    request.window, request.day_of_month
                );
                SubmissionResult::Accepted
            })
        })
    }

    async fn submit_with_break(
        &self,
        request: &ShiftRequest,
    ) -> Result<SubmissionResult, FactorialError> {
        let schedule = self.break_schedule;
        let mut completed = Vec::with_capacity(4);

        let outcome = self
            .mutations
            .clock_in(&self.clock_payload(request, schedule.clock_in))
            .await;
        if let Some(rejected) = Self::settle(SubmissionStep::ClockIn, outcome, &completed)? {
            return Ok(rejected);
        }
        completed.push(SubmissionStep::ClockIn);

        let outcome = self
            .mutations
            .break_start(&self.clock_payload(request, schedule.break_start))
            .await;
        if let Some(rejected) = Self::settle(SubmissionStep::BreakStart, outcome, &completed)? {
            return Ok(rejected);
        }
        completed.push(SubmissionStep::BreakStart);

        let outcome = self
            .mutations
            .break_end(&self.clock_payload(request, schedule.break_end))
            .await;
        if let Some(rejected) = Self::settle(SubmissionStep::BreakEnd, outcome, &completed)? {
            return Ok(rejected);
        }
        completed.push(SubmissionStep::BreakEnd);

        let outcome = self
            .mutations
            .clock_out(&self.clock_payload(request, schedule.clock_out))
            .await;
        if let Some(rejected) = Self::settle(SubmissionStep::ClockOut, outcome, &completed)? {
            return Ok(rejected);
        }

        info!(
            "Recorded break-split attendance for day {}",
            request.day_of_month
        );
        Ok(SubmissionResult::Accepted)
    }

    fn clock_payload(&self, request: &ShiftRequest, time: NaiveTime) -> ClockPayload {
        ClockPayload {
            now: request.date.and_time(time),
            employee_id: request.employee_id,
            location_type: request.location_type.clone(),
            source: self.source.clone(),
        }
    }

    // Ok(None) when the step was accepted.
    fn settle(
        step: SubmissionStep,
        outcome: Result<(), FactorialError>,
        completed: &[SubmissionStep],
    ) -> Result<Option<SubmissionResult>, FactorialError> {
        match outcome {
            Ok(()) => Ok(None),
            Err(FactorialError::ApiError { status, message }) => {
                warn!("Step {} rejected with {}: {}", step, status, message);
                Ok(Some(SubmissionResult::Rejected {
                    step,
                    status,
                    message,
                    completed: completed.to_vec(),
                }))
            }
            Err(e) => Err(e),
        }
    }
}
