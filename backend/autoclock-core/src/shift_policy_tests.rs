// src/shift_policy_tests.rs

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    use crate::attendance::{ShiftWindow, SkipReason, SubmissionMode};
    use crate::shift_index::ShiftIndex;
    use crate::shift_policy::*;
    use crate::test_support::{date, policy, shift, working_day};

    fn short_window() -> ShiftWindow {
        ShiftWindow::new("08:00", "15:00")
    }

    fn default_window() -> ShiftWindow {
        ShiftWindow::new("09:00", "18:00")
    }

    #[test]
    fn test_leave_skips_with_leave_name_regardless_of_other_fields() {
        let mut day = working_day(2024, 10, 7, 420);
        day.is_leave = true;
        day.leave_name = Some("Vacaciones".to_string());
        day.day_before_holiday = true;

        let mut config = policy(date(2024, 10, 1));
        config.today_only = true;
        config.until_today = true;

        let expected = Decision::Skip(SkipReason::Leave("Vacaciones".to_string()));
        assert_eq!(decide(&day, &ShiftIndex::default(), &config), expected);

        day.is_laborable = false;
        assert_eq!(decide(&day, &ShiftIndex::default(), &config), expected);
    }

    #[test]
    fn test_leave_without_name_still_skips() {
        let mut day = working_day(2024, 10, 7, 495);
        day.is_leave = true;

        match decide(&day, &ShiftIndex::default(), &policy(date(2024, 10, 1))) {
            Decision::Skip(SkipReason::Leave(name)) => assert_eq!(name, "Leave"),
            other => panic!("Expected leave skip, got {:?}", other),
        }
    }

    #[test]
    fn test_non_laborable_reports_weekday_name() {
        // 2024-10-05 is a Saturday.
        let mut day = working_day(2024, 10, 5, 0);
        day.is_laborable = false;

        let decision = decide(&day, &ShiftIndex::default(), &policy(date(2024, 10, 1)));
        assert_eq!(decision, Decision::Skip(SkipReason::NonLaborable(Weekday::Sat)));
        if let Decision::Skip(reason) = decision {
            assert_eq!(reason.to_string(), "Saturday");
        }
    }

    #[test]
    fn test_short_day_uses_short_window_in_every_month() {
        for month in 1..=12 {
            let day = working_day(2025, month, 10, 420);
            let decision = decide(&day, &ShiftIndex::default(), &policy(date(2025, 1, 1)));
            assert_eq!(
                decision,
                Decision::Proceed {
                    window: short_window(),
                    mode: SubmissionMode::Direct,
                },
                "month {}",
                month
            );
        }
    }

    #[test]
    fn test_summer_overrides_break_split() {
        let august = working_day(2024, 8, 10, 495);
        assert_eq!(
            decide(&august, &ShiftIndex::default(), &policy(date(2024, 8, 1))),
            Decision::Proceed {
                window: short_window(),
                mode: SubmissionMode::Direct,
            }
        );

        let october = working_day(2024, 10, 10, 495);
        assert_eq!(
            decide(&october, &ShiftIndex::default(), &policy(date(2024, 10, 1))),
            Decision::Proceed {
                window: default_window(),
                mode: SubmissionMode::WithBreak,
            }
        );
    }

    #[test]
    fn test_summer_boundaries() {
        assert!(!is_summer(date(2024, 6, 30)));
        assert!(is_summer(date(2024, 7, 1)));
        assert!(is_summer(date(2024, 8, 31)));
        assert!(is_summer(date(2024, 9, 14)));
        assert!(!is_summer(date(2024, 9, 15)));
        assert!(!is_summer(date(2024, 1, 14)));
    }

    #[test]
    fn test_day_before_holiday_gets_short_window() {
        let mut day = working_day(2024, 12, 24, 495);
        day.day_before_holiday = true;

        let (window, mode) = shift_shape(&day, &default_window());
        assert_eq!(window, short_window());
        assert_eq!(mode, SubmissionMode::Direct);
    }

    #[test]
    fn test_other_minutes_fall_back_to_default_direct() {
        for minutes in [0, 240, 480, 500] {
            let day = working_day(2024, 11, 12, minutes);
            assert_eq!(
                shift_shape(&day, &default_window()),
                (default_window(), SubmissionMode::Direct),
                "minutes {}",
                minutes
            );
        }
    }

    #[test]
    fn test_fractional_minutes_do_not_match_thresholds() {
        let mut day = working_day(2024, 11, 12, 0);
        day.minutes_owed = dec!(494.5);
        assert_eq!(
            shift_shape(&day, &default_window()),
            (default_window(), SubmissionMode::Direct)
        );

        day.minutes_owed = dec!(495.0);
        assert_eq!(shift_shape(&day, &default_window()).1, SubmissionMode::WithBreak);
    }

    #[test]
    fn test_overlap_wins_over_leave() {
        let mut day = working_day(2024, 10, 7, 495);
        day.is_leave = true;
        day.leave_name = Some("Sick leave".to_string());
        let shifts = ShiftIndex::new(vec![shift(1, 7, "10:00", "12:00")]);

        assert_eq!(
            decide(&day, &shifts, &policy(date(2024, 10, 1))),
            Decision::Skip(SkipReason::PeriodOverlap("10:00 - 12:00".to_string()))
        );
    }

    #[test]
    fn test_overlap_is_checked_against_default_window() {
        // The day gets 08:00-15:00, but the check uses 09:00-18:00, so an
        // 08:00-08:30 entry does not block it.
        let day = working_day(2024, 10, 7, 420);
        let shifts = ShiftIndex::new(vec![shift(1, 7, "08:00", "08:30")]);

        assert_eq!(
            decide(&day, &shifts, &policy(date(2024, 10, 1))),
            Decision::Proceed {
                window: short_window(),
                mode: SubmissionMode::Direct,
            }
        );
    }

    #[test]
    fn test_unparseable_shift_blocks_the_day() {
        let day = working_day(2024, 10, 7, 495);
        let shifts = ShiftIndex::new(vec![shift(1, 7, "09:00", "")]);

        match decide(&day, &shifts, &policy(date(2024, 10, 1))) {
            Decision::Skip(SkipReason::OverlapUndetermined(_)) => {}
            other => panic!("Expected undetermined overlap skip, got {:?}", other),
        }
    }

    #[test]
    fn test_today_only_filter() {
        let mut config = policy(date(2024, 10, 10));
        config.today_only = true;

        let yesterday = working_day(2024, 10, 9, 495);
        assert_eq!(
            decide(&yesterday, &ShiftIndex::default(), &config),
            Decision::Skip(SkipReason::TodayOnly)
        );

        let today = working_day(2024, 10, 10, 495);
        assert!(matches!(
            decide(&today, &ShiftIndex::default(), &config),
            Decision::Proceed { .. }
        ));
    }

    #[test]
    fn test_until_today_filter() {
        let mut config = policy(date(2024, 10, 10));
        config.until_today = true;

        for day in [1, 9, 10] {
            let calendar_day = working_day(2024, 10, day, 495);
            assert!(
                matches!(
                    decide(&calendar_day, &ShiftIndex::default(), &config),
                    Decision::Proceed { .. }
                ),
                "day {}",
                day
            );
        }

        let tomorrow = working_day(2024, 10, 11, 495);
        assert_eq!(
            decide(&tomorrow, &ShiftIndex::default(), &config),
            Decision::Skip(SkipReason::UntilToday)
        );
    }

    #[test]
    fn test_non_laborable_precedes_date_filters() {
        let mut day = working_day(2024, 10, 12, 0);
        day.is_laborable = false;
        let mut config = policy(date(2024, 10, 10));
        config.today_only = true;
        config.until_today = true;

        assert_eq!(
            decide(&day, &ShiftIndex::default(), &config),
            Decision::Skip(SkipReason::NonLaborable(Weekday::Sat))
        );
    }

    #[test]
    fn test_skip_reason_text() {
        assert_eq!(
            SkipReason::PeriodOverlap("09:00 - 18:00".to_string()).to_string(),
            "period overlap: 09:00 - 18:00"
        );
        assert_eq!(SkipReason::TodayOnly.to_string(), "today-only filter");
        assert_eq!(SkipReason::UntilToday.to_string(), "until-today filter");
        assert_eq!(SkipReason::Leave("Holiday".to_string()).to_string(), "Holiday");
    }
}
