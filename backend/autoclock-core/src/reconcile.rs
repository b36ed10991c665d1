// src/reconcile.rs

use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, error};

use crate::attendance::{DayOutcome, DayStatus, ResetOutcome, ResetStatus, ShiftRequest};
use crate::attendance_api::AttendanceMutations;
use crate::factorial_client::FactorialError;
use crate::session::Session;
use crate::shift_policy::{decide, Decision, PolicyConfig};
use crate::submission::SubmissionSequencer;

pub const DEFAULT_LOCATION_TYPE: &str = "work_from_home";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub policy: PolicyConfig,
    pub location_type: String,
    pub dry_run: bool,
}

/// Walks the calendar in day order and records every working day that is not
/// already covered.
///
/// Days are independent: a rejected submission fails that day only. A
/// transport failure stops the whole run.
pub async fn reconcile<M: AttendanceMutations + ?Sized>(
    session: &Session,
    mutations: &M,
    options: &RunOptions,
) -> Result<Vec<DayOutcome>, FactorialError> {
    let sequencer = SubmissionSequencer::new(mutations);
    let mut outcomes = Vec::with_capacity(session.calendar.len());

    for day in &session.calendar {
        let status = match decide(day, &session.shifts, &options.policy) {
            Decision::Skip(reason) => DayStatus::Skipped(reason),
            Decision::Proceed { window, mode } => {
                let request = ShiftRequest {
                    day_of_month: day.day_of_month,
                    date: day.date,
                    window,
                    employee_id: session.employee_id,
                    location_type: options.location_type.clone(),
                    mode,
                };

                if options.dry_run {
                    DayStatus::WouldSubmit(request.window)
                } else {
                    let result = sequencer.submit(&request).await.map_err(|e| {
                        error!("Aborting run on day {}: {}", day.day_of_month, e);
                        e
                    })?;
                    match result.failure_summary() {
                        None => DayStatus::Submitted(request.window),
                        Some(summary) => DayStatus::Failed(summary),
                    }
                }
            }
        };

        let outcome = DayOutcome {
            day_of_month: day.day_of_month,
            date: day.date,
            status,
        };
        debug!("{}", outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Deletes every shift in the session snapshot, one call per shift.
pub async fn reset_month<M: AttendanceMutations + ?Sized>(
    session: &Session,
    mutations: &M,
    dry_run: bool,
) -> Result<Vec<ResetOutcome>, FactorialError> {
    let mut outcomes = Vec::with_capacity(session.shifts.len());

    for shift in session.shifts.iter() {
        let status = if dry_run {
            ResetStatus::WouldDelete
        } else {
            match mutations.delete_shift(shift.id).await {
                Ok(()) => ResetStatus::Deleted,
                Err(FactorialError::ApiError { status, message }) => {
                    ResetStatus::Failed(format!("{} {}", status, message).trim().to_string())
                }
                Err(e) => {
                    error!("Aborting reset on shift {}: {}", shift.id, e);
                    return Err(e);
                }
            }
        };

        let outcome = ResetOutcome {
            shift_id: shift.id,
            day_of_month: shift.day_of_month,
            date: NaiveDate::from_ymd_opt(session.year, session.month, shift.day_of_month),
            range: shift.range(),
            status,
        };
        debug!("{}", outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[DayOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match outcome.status {
                    DayStatus::Submitted(_) | DayStatus::WouldSubmit(_) => summary.submitted += 1,
                    DayStatus::Skipped(_) => summary.skipped += 1,
                    DayStatus::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} submitted, {} skipped, {} failed",
            self.submitted, self.skipped, self.failed
        )
    }
}
