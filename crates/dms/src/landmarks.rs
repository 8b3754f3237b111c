//! Facial landmark point sets

use crate::error::{Region, ShapeError};
use serde::{Deserialize, Serialize};

/// Landmark position in image pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Landmark sequences as the detector emits them, one entry per region.
///
/// Arity is not checked here; convert into a [`LandmarkSet`] before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLandmarks {
    pub left_eye: Vec<Point2D>,
    pub right_eye: Vec<Point2D>,
    pub mouth: Vec<Point2D>,
    pub nose: Vec<Point2D>,
    pub left_ear: Vec<Point2D>,
    pub right_ear: Vec<Point2D>,
}

/// Shape-checked landmarks for one face in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    /// Outer corner, two upper lid points, inner corner, two lower lid points
    pub left_eye: [Point2D; 6],
    pub right_eye: [Point2D; 6],
    /// Left corner first, upper and lower lip points interleaved
    pub mouth: [Point2D; 8],
    pub nose: Point2D,
    pub left_ear: Point2D,
    pub right_ear: Point2D,
}

impl LandmarkSet {
    /// Validate region arities and copy the points into fixed-size arrays
    pub fn from_raw(raw: &RawLandmarks) -> Result<Self, ShapeError> {
        Ok(Self {
            left_eye: fixed(Region::LeftEye, &raw.left_eye)?,
            right_eye: fixed(Region::RightEye, &raw.right_eye)?,
            mouth: fixed(Region::Mouth, &raw.mouth)?,
            nose: single(Region::Nose, &raw.nose)?,
            left_ear: single(Region::LeftEar, &raw.left_ear)?,
            right_ear: single(Region::RightEar, &raw.right_ear)?,
        })
    }

    /// Back to the detector-facing representation
    pub fn to_raw(&self) -> RawLandmarks {
        RawLandmarks {
            left_eye: self.left_eye.to_vec(),
            right_eye: self.right_eye.to_vec(),
            mouth: self.mouth.to_vec(),
            nose: vec![self.nose],
            left_ear: vec![self.left_ear],
            right_ear: vec![self.right_ear],
        }
    }
}

impl TryFrom<RawLandmarks> for LandmarkSet {
    type Error = ShapeError;

    fn try_from(raw: RawLandmarks) -> Result<Self, Self::Error> {
        Self::from_raw(&raw)
    }
}

impl TryFrom<&RawLandmarks> for LandmarkSet {
    type Error = ShapeError;

    fn try_from(raw: &RawLandmarks) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

fn fixed<const N: usize>(region: Region, points: &[Point2D]) -> Result<[Point2D; N], ShapeError> {
    debug_assert_eq!(region.arity(), N);
    points.try_into().map_err(|_| ShapeError::Arity {
        region,
        expected: N,
        actual: points.len(),
    })
}

fn single(region: Region, points: &[Point2D]) -> Result<Point2D, ShapeError> {
    let [point] = fixed::<1>(region, points)?;
    Ok(point)
}
