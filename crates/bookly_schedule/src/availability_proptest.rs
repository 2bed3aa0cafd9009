#[cfg(test)]
mod tests {
    use crate::availability::{available_slots, validate_booking};
    use crate::time_grid::{generate_time_slots, BusinessHours};
    use bookly_common::models::{Appointment, AppointmentStatus};
    use chrono::{Duration, NaiveDate, NaiveTime};
    use proptest::prelude::*;

    // Helper function to create valid business hours
    fn business_hours() -> impl Strategy<Value = BusinessHours> {
        (0u32..23)
            .prop_flat_map(|start| (Just(start), (start + 1)..=23))
            .prop_map(|(start, end)| BusinessHours::new(start, end).unwrap())
    }

    fn booked(id: usize, start: NaiveTime, duration_minutes: u32) -> Appointment {
        Appointment {
            id: format!("a{}", id),
            client_id: "c1".to_string(),
            client_name: "Ada".to_string(),
            client_phone: "0791234567".to_string(),
            client_email: None,
            employee_id: "e1".to_string(),
            service_id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            start_time: start,
            end_time: start + Duration::minutes(i64::from(duration_minutes)),
            status: AppointmentStatus::Confirmed,
            price: 0,
            comment: None,
        }
    }

    proptest! {
        #[test]
        fn test_slots_stay_within_business_hours(
            hours in business_hours(),
            granularity in 1u32..=120,
        ) {
            let slots = generate_time_slots(hours, granularity);
            prop_assert!(!slots.is_empty());
            for slot in &slots {
                prop_assert!(*slot >= hours.opening_time());
                prop_assert!(*slot <= hours.closing_time());
            }
            prop_assert!(slots.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn test_available_slots_fit_before_closing(
            hours in business_hours(),
            granularity in prop::sample::select(vec![5u32, 10, 15, 20, 30, 60]),
            duration in 1u32..=300,
        ) {
            for slot in available_slots(hours, granularity, duration, &[]) {
                let end = slot + Duration::minutes(i64::from(duration));
                prop_assert!(slot >= hours.opening_time());
                prop_assert!(end <= hours.closing_time());
            }
        }

        /// Booking greedily from the offered slots never produces two
        /// overlapping appointments.
        #[test]
        fn test_accepted_bookings_never_overlap(
            hours in business_hours(),
            durations in prop::collection::vec(
                prop::sample::select(vec![15u32, 30, 45, 60, 90]),
                1..12,
            ),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 12),
        ) {
            let mut accepted: Vec<Appointment> = Vec::new();
            for (i, duration) in durations.iter().enumerate() {
                let slots = available_slots(hours, 15, *duration, &accepted);
                if slots.is_empty() {
                    continue;
                }
                let start = *picks[i].get(&slots);
                prop_assert!(validate_booking(start, *duration, &accepted).is_ok());
                accepted.push(booked(i, start, *duration));
            }

            for (i, a) in accepted.iter().enumerate() {
                for b in accepted.iter().skip(i + 1) {
                    prop_assert!(
                        !(a.start_time < b.end_time && b.start_time < a.end_time),
                        "{:?} overlaps {:?}", a, b
                    );
                }
            }
        }
    }
}
