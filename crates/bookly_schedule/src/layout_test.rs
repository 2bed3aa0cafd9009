#[cfg(test)]
mod tests {
    use crate::layout::*;
    use crate::test_support::{appointment, d, hours, t};

    #[test]
    fn test_block_geometry_from_start_of_day() {
        let a = appointment("a1", "e1", d(2025, 6, 2), t(10, 0), t(11, 30));
        let block = layout(&a, hours(8, 18), 1.0).unwrap();
        assert_eq!(block, BlockGeometry { top: 120.0, height: 90.0 });
    }

    #[test]
    fn test_block_geometry_scales_with_zoom() {
        let a = appointment("a1", "e1", d(2025, 6, 2), t(9, 15), t(9, 45));
        let block = layout(&a, hours(9, 18), 2.5).unwrap();
        assert_eq!(block.top, 37.5);
        assert_eq!(block.height, 75.0);
    }

    #[test]
    fn test_block_may_end_at_closing() {
        let a = appointment("a1", "e1", d(2025, 6, 2), t(17, 0), t(18, 0));
        assert!(layout(&a, hours(9, 18), 1.0).is_ok());
    }

    #[test]
    fn test_out_of_hours_is_rejected_not_clamped() {
        let early = appointment("early", "e1", d(2025, 6, 2), t(7, 30), t(8, 30));
        match layout(&early, hours(8, 18), 1.0) {
            Err(LayoutError::OutsideBusinessHours { id, time }) => {
                assert_eq!(id, "early");
                assert_eq!(time, t(7, 30));
            }
            other => panic!("unexpected {:?}", other),
        }

        let late = appointment("late", "e1", d(2025, 6, 2), t(17, 30), t(18, 30));
        assert!(matches!(
            layout(&late, hours(8, 18), 1.0),
            Err(LayoutError::OutsideBusinessHours { .. })
        ));
    }

    #[test]
    fn test_inverted_interval_is_integrity_error() {
        let a = appointment("bad", "e1", d(2025, 6, 2), t(11, 0), t(10, 0));
        assert!(matches!(
            layout(&a, hours(8, 18), 1.0),
            Err(LayoutError::NonPositiveHeight { .. })
        ));

        let empty = appointment("zero", "e1", d(2025, 6, 2), t(11, 0), t(11, 0));
        assert!(matches!(
            layout(&empty, hours(8, 18), 1.0),
            Err(LayoutError::NonPositiveHeight { .. })
        ));
    }
}
