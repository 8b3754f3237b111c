//! Fatigue indicators derived from landmark geometry
//!
//! Pure functions over a single frame's points. Nothing here keeps state,
//! so independent sessions may call them concurrently.

use crate::error::GeometryError;
use crate::landmarks::{LandmarkSet, Point2D};
use serde::{Deserialize, Serialize};

/// Head orientation estimated from the nose and ear landmarks
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Angle of the ear-to-ear line against horizontal, degrees in (-180, 180]
    pub tilt_degrees: f64,
    /// Nose height relative to the ear midpoint, pixels (positive = nose lower)
    pub elevation: f64,
}

/// Eye aspect ratio: lid opening over eye width.
///
/// Points are ordered outer corner, upper lid (2), inner corner, lower lid (2).
pub fn eye_aspect_ratio(eye: &[Point2D; 6]) -> Result<f64, GeometryError> {
    aspect_ratio("ear", eye, (1, 5), (2, 4), (0, 3))
}

/// Mouth aspect ratio, same construction over the 8 lip points
pub fn mouth_aspect_ratio(mouth: &[Point2D; 8]) -> Result<f64, GeometryError> {
    aspect_ratio("mar", mouth, (1, 7), (3, 5), (0, 4))
}

/// Mean of the two per-eye ratios
pub fn average_eye_aspect_ratio(
    left: &[Point2D; 6],
    right: &[Point2D; 6],
) -> Result<f64, GeometryError> {
    Ok((eye_aspect_ratio(left)? + eye_aspect_ratio(right)?) / 2.0)
}

/// Head tilt and elevation.
///
/// The ear midpoint is floored before the subtraction, so odd pixel sums
/// round toward negative infinity exactly as the recorded datasets do.
pub fn head_pose(
    nose: Point2D,
    left_ear: Point2D,
    right_ear: Point2D,
) -> Result<HeadPose, GeometryError> {
    if !(nose.is_finite() && left_ear.is_finite() && right_ear.is_finite()) {
        return Err(GeometryError::NonFinite { measure: "head_pose" });
    }

    let dx = right_ear.x - left_ear.x;
    let dy = right_ear.y - left_ear.y;
    // atan2(-0.0, x < 0) is -180; fold it onto 180 to keep the range half-open
    let tilt_degrees = match dy.atan2(dx).to_degrees() {
        t if t <= -180.0 => 180.0,
        t => t,
    };

    let ear_center_y = ((left_ear.y + right_ear.y) / 2.0).floor();

    Ok(HeadPose {
        tilt_degrees,
        elevation: nose.y - ear_center_y,
    })
}

fn aspect_ratio(
    measure: &'static str,
    points: &[Point2D],
    vertical_a: (usize, usize),
    vertical_b: (usize, usize),
    horizontal: (usize, usize),
) -> Result<f64, GeometryError> {
    if !points.iter().all(Point2D::is_finite) {
        return Err(GeometryError::NonFinite { measure });
    }

    let span = |(i, j): (usize, usize)| points[i].distance(&points[j]);
    let a = span(vertical_a);
    let b = span(vertical_b);
    let c = span(horizontal);

    if c == 0.0 {
        return Err(GeometryError::DegenerateSpan { measure });
    }

    let ratio = (a + b) / (2.0 * c);
    if ratio.is_finite() {
        Ok(ratio)
    } else {
        Err(GeometryError::NonFinite { measure })
    }
}

/// Every indicator for one frame, each computed independently
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameIndicators {
    pub ear: Result<f64, GeometryError>,
    pub mar: Result<f64, GeometryError>,
    pub pose: Result<HeadPose, GeometryError>,
}

impl FrameIndicators {
    pub fn measure(landmarks: &LandmarkSet) -> Self {
        Self {
            ear: average_eye_aspect_ratio(&landmarks.left_eye, &landmarks.right_eye),
            mar: mouth_aspect_ratio(&landmarks.mouth),
            pose: head_pose(landmarks.nose, landmarks.left_ear, landmarks.right_ear),
        }
    }
}
