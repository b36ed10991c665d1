// src/shift_index.rs

use std::collections::BTreeMap;

use crate::attendance::ExistingShift;
use crate::clock_time::{clock_key, TimeParseError};

/// Shifts already recorded remotely for the month, grouped by day.
///
/// Built once from the fetch at session start and never refreshed, so overlap
/// answers reflect that snapshot only.
#[derive(Debug, Clone, Default)]
pub struct ShiftIndex {
    shifts: Vec<ExistingShift>,
    by_day: BTreeMap<u32, Vec<usize>>,
}

impl ShiftIndex {
    pub fn new(shifts: Vec<ExistingShift>) -> Self {
        let mut by_day: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (position, shift) in shifts.iter().enumerate() {
            by_day.entry(shift.day_of_month).or_default().push(position);
        }
        Self { shifts, by_day }
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExistingShift> {
        self.shifts.iter()
    }

    pub fn on_day(&self, day_of_month: u32) -> impl Iterator<Item = &ExistingShift> {
        self.by_day
            .get(&day_of_month)
            .into_iter()
            .flatten()
            .map(move |&position| &self.shifts[position])
    }

    /// Returns the range of the first shift on `day_of_month` that conflicts
    /// with the candidate window, or `None` when nothing conflicts.
    ///
    /// A shift conflicts when its start or end falls strictly inside the
    /// candidate, or when it covers the whole candidate.
    pub fn overlaps(
        &self,
        day_of_month: u32,
        candidate_in: &str,
        candidate_out: &str,
    ) -> Result<Option<String>, TimeParseError> {
        let mut existing = self.on_day(day_of_month).peekable();
        if existing.peek().is_none() {
            return Ok(None);
        }

        let start = clock_key(candidate_in)?;
        let end = clock_key(candidate_out)?;

        for shift in existing {
            let shift_start = clock_key(&shift.clock_in)?;
            let shift_end = clock_key(&shift.clock_out)?;

            let starts_inside = start < shift_start && shift_start < end;
            let ends_inside = start < shift_end && shift_end < end;
            let covers = shift_start <= start && shift_end >= end;

            if starts_inside || ends_inside || covers {
                return Ok(Some(shift.range()));
            }
        }
        Ok(None)
    }
}
