use std::time::Duration;

use proptest::prelude::*;

use dms::geometry::{eye_aspect_ratio, head_pose, mouth_aspect_ratio};
use dms::{DrowsinessConfig, DrowsinessMonitor, DrowsinessState, LandmarkSet, Point2D};

fn hexagon(x0: f64, y0: f64, half_a: f64, half_b: f64, width: f64) -> [Point2D; 6] {
    [
        Point2D::new(x0, y0),
        Point2D::new(x0 + width / 3.0, y0 - half_a),
        Point2D::new(x0 + 2.0 * width / 3.0, y0 - half_b),
        Point2D::new(x0 + width, y0),
        Point2D::new(x0 + 2.0 * width / 3.0, y0 + half_b),
        Point2D::new(x0 + width / 3.0, y0 + half_a),
    ]
}

fn open_face() -> LandmarkSet {
    LandmarkSet {
        left_eye: hexagon(100.0, 100.0, 4.5, 4.5, 30.0),
        right_eye: hexagon(160.0, 100.0, 4.5, 4.5, 30.0),
        mouth: [
            Point2D::new(110.0, 180.0),
            Point2D::new(120.0, 177.0),
            Point2D::new(130.0, 177.0),
            Point2D::new(140.0, 177.0),
            Point2D::new(150.0, 180.0),
            Point2D::new(140.0, 183.0),
            Point2D::new(130.0, 183.0),
            Point2D::new(120.0, 183.0),
        ],
        nose: Point2D::new(130.0, 140.0),
        left_ear: Point2D::new(60.0, 110.0),
        right_ear: Point2D::new(200.0, 110.0),
    }
}

proptest! {
    #[test]
    fn test_ear_matches_spans(
        x0 in -500.0_f64..500.0,
        y0 in -500.0_f64..500.0,
        a in 0.0_f64..40.0,
        b in 0.0_f64..40.0,
        c in 1.0_f64..200.0,
    ) {
        let eye = hexagon(x0, y0, a / 2.0, b / 2.0, c);
        let ear = eye_aspect_ratio(&eye).unwrap();
        let expected = (a + b) / (2.0 * c);
        prop_assert!((ear - expected).abs() < 1e-9 * (1.0 + expected));
    }

    #[test]
    fn test_coincident_corners_always_fail(x in -1e4_f64..1e4, y in -1e4_f64..1e4) {
        let mut eye = hexagon(x, y, 3.0, 3.0, 30.0);
        eye[3] = eye[0];
        prop_assert!(eye_aspect_ratio(&eye).is_err());

        let mut mouth = open_face().mouth;
        mouth[0] = Point2D::new(x, y);
        mouth[4] = Point2D::new(x, y);
        prop_assert!(mouth_aspect_ratio(&mouth).is_err());
    }

    #[test]
    fn test_level_ears_zero_tilt(
        y in -1000.0_f64..1000.0,
        lx in -1000.0_f64..0.0,
        rx in 1.0_f64..1000.0,
        nose_y in -1000.0_f64..1000.0,
    ) {
        let pose = head_pose(Point2D::new(0.0, nose_y), Point2D::new(lx, y), Point2D::new(rx, y)).unwrap();
        prop_assert_eq!(pose.tilt_degrees, 0.0);
    }

    #[test]
    fn test_tilt_sign_follows_vertical_offset(dy in -500.0_f64..500.0, dx in 1.0_f64..500.0) {
        prop_assume!(dy != 0.0);
        let pose = head_pose(Point2D::new(0.0, 0.0), Point2D::new(0.0, 0.0), Point2D::new(dx, dy)).unwrap();
        prop_assert_eq!(pose.tilt_degrees > 0.0, dy > 0.0);
        prop_assert!(pose.tilt_degrees.abs() < 90.0);
    }

    #[test]
    fn test_elevation_uses_floored_midpoint(
        ly in -2000_i32..2000,
        ry in -2000_i32..2000,
        nose in -2000_i32..2000,
    ) {
        let pose = head_pose(
            Point2D::new(0.0, nose as f64),
            Point2D::new(-50.0, ly as f64),
            Point2D::new(50.0, ry as f64),
        ).unwrap();
        let expected = nose - (ly + ry).div_euclid(2);
        prop_assert_eq!(pose.elevation, expected as f64);
    }

    #[test]
    fn test_non_triggering_frames_never_alert(steps in prop::collection::vec(1_u64..500, 1..60)) {
        let mut monitor = DrowsinessMonitor::new(DrowsinessConfig::default()).unwrap();
        let face = open_face();
        let mut now = Duration::ZERO;
        for step in steps {
            now += Duration::from_millis(step);
            let reading = monitor.observe(Some(&face), now).unwrap();
            prop_assert!(!reading.is_drowsy);
            prop_assert_eq!(monitor.state().frame_counter(), 0);
            prop_assert_eq!(monitor.state().episode_start(), None);
        }
    }

    #[test]
    fn test_alert_iff_streak_exceeds_drowsy_time(
        frames in prop::collection::vec((any::<bool>(), 0_u64..400), 1..80),
        drowsy_ms in 0_u64..2000,
    ) {
        let drowsy_time = Duration::from_millis(drowsy_ms);
        let mut state = DrowsinessState::default();
        let mut now = Duration::ZERO;
        let mut streak_start: Option<Duration> = None;

        for (triggered, step) in frames {
            now += Duration::from_millis(step);
            if triggered {
                streak_start.get_or_insert(now);
            } else {
                streak_start = None;
            }

            let drowsy = state.update(triggered, now, drowsy_time);
            let expected = streak_start.map_or(false, |s| now - s > drowsy_time);
            prop_assert_eq!(drowsy, expected);
            prop_assert_eq!(state.episode_start(), streak_start);
        }
    }

    #[test]
    fn test_absent_frames_leave_state_untouched(
        gaps in prop::collection::vec(1_u64..300, 1..20),
    ) {
        let mut monitor = DrowsinessMonitor::new(DrowsinessConfig::default()).unwrap();
        let mut closed = open_face();
        closed.left_eye = hexagon(100.0, 100.0, 1.0, 1.0, 30.0);
        closed.right_eye = hexagon(160.0, 100.0, 1.0, 1.0, 30.0);

        monitor.observe(Some(&closed), Duration::ZERO).unwrap();
        let before = monitor.state().clone();

        let mut now = Duration::ZERO;
        for gap in gaps {
            now += Duration::from_millis(gap);
            let reading = monitor.observe(None, now).unwrap();
            prop_assert_eq!(reading.as_tuple(), (false, 0.0, 0.0, 0.0, 0.0));
        }
        prop_assert_eq!(monitor.state(), &before);
    }
}
