#[cfg(test)]
mod tests {
    use crate::availability::*;
    use crate::test_support::{appointment, d, grid, hours, service, staff, t};

    #[test]
    fn test_scenario_sixty_minutes_around_a_booking() {
        let existing = vec![appointment("a1", "e1", d(2025, 6, 2), t(10, 0), t(11, 0))];
        let slots = available_slots(hours(9, 18), 30, 60, &existing);

        let mut expected = vec![t(9, 0)];
        let mut hour = 11;
        let mut minute = 0;
        while (hour, minute) <= (17, 0) {
            expected.push(t(hour, minute));
            minute += 30;
            if minute == 60 {
                minute = 0;
                hour += 1;
            }
        }
        assert_eq!(slots, expected);
        assert_eq!(slots.last(), Some(&t(17, 0)));
        assert!(!slots.contains(&t(9, 30)));
        assert!(!slots.contains(&t(10, 30)));
    }

    #[test]
    fn test_empty_schedule_returns_every_candidate() {
        let slots = available_slots(hours(9, 12), 30, 30, &[]);
        assert_eq!(
            slots,
            vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]
        );
    }

    #[test]
    fn test_duration_longer_than_window_is_empty() {
        assert!(available_slots(hours(9, 10), 30, 61, &[]).is_empty());
        assert_eq!(available_slots(hours(9, 10), 30, 60, &[]), vec![t(9, 0)]);
    }

    #[test]
    fn test_zero_duration_has_no_candidates() {
        assert!(candidate_start_times(hours(9, 18), 30, 0).is_empty());
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let existing = vec![appointment("a1", "e1", d(2025, 6, 2), t(12, 0), t(13, 0))];
        assert!(validate_booking(t(13, 0), 30, &existing).is_ok());
        assert!(validate_booking(t(11, 0), 60, &existing).is_ok());
    }

    #[test]
    fn test_overlap_reports_the_blocking_appointment() {
        let existing = vec![appointment("a1", "e1", d(2025, 6, 2), t(12, 0), t(13, 0))];
        let conflict = validate_booking(t(12, 30), 60, &existing).unwrap_err();
        assert_eq!(conflict.appointment_id, "a1");
        assert_eq!(conflict.existing_end, t(13, 0));
        assert!(conflict.to_string().contains("12:30"));
    }

    #[test]
    fn test_interval_overlap_is_half_open() {
        assert!(intervals_overlap(0, 10, 5, 15));
        assert!(intervals_overlap(0, 10, 2, 3));
        assert!(!intervals_overlap(0, 10, 10, 20));
        assert!(!intervals_overlap(10, 20, 0, 10));
    }

    #[test]
    fn test_check_slot_rejections() {
        let grid = grid(9, 18);
        let existing = vec![appointment("a1", "e1", d(2025, 6, 2), t(10, 0), t(11, 0))];

        assert_eq!(check_slot(&grid, t(9, 0), 0, &[]), Err(SlotRejection::ZeroDuration));
        assert!(matches!(
            check_slot(&grid, t(8, 30), 30, &[]),
            Err(SlotRejection::OutsideBusinessHours { .. })
        ));
        assert!(matches!(
            check_slot(&grid, t(17, 30), 60, &[]),
            Err(SlotRejection::OutsideBusinessHours { .. })
        ));
        assert!(matches!(
            check_slot(&grid, t(9, 15), 30, &[]),
            Err(SlotRejection::OffGrid { .. })
        ));
        assert!(matches!(
            check_slot(&grid, t(10, 30), 30, &existing),
            Err(SlotRejection::Conflict(_))
        ));
        assert!(check_slot(&grid, t(11, 0), 60, &existing).is_ok());
    }

    #[test]
    fn test_eligible_staff_follows_service_lists() {
        let cut = service("cut", 30);
        let roster = vec![
            staff("all", None),
            staff("colour", Some(&["colour"])),
            staff("both", Some(&["cut", "colour"])),
            staff("none", Some(&[])),
        ];
        let ids: Vec<&str> = eligible_staff(&roster, &cut)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["all", "both"]);
    }
}
