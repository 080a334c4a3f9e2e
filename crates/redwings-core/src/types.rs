//! Fundamental types for the RedWings motion metrics system.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Single detected body point.
///
/// `x` and `y` are normalized to the frame extent, `z` is depth relative to
/// the hips, `confidence` is the detector's visibility score in [0, 1].
/// Serialized as the estimator's `[x, y, z, confidence]` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub confidence: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, confidence: f64) -> Self {
        Self { x, y, z, confidence }
    }

    /// Landmark with full confidence.
    pub fn certain(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 1.0)
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.confidence.is_finite()
    }

    fn check(&self, index: usize) -> Result<()> {
        if !self.is_finite() {
            return Err(Error::NonFiniteLandmark { index });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::ConfidenceRange {
                index,
                confidence: self.confidence,
            });
        }
        Ok(())
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl From<[f64; 4]> for Landmark {
    fn from(row: [f64; 4]) -> Self {
        Self::new(row[0], row[1], row[2], row[3])
    }
}

impl From<Landmark> for [f64; 4] {
    fn from(l: Landmark) -> Self {
        [l.x, l.y, l.z, l.confidence]
    }
}

/// 33-point body landmark model emitted by the pose estimator.
///
/// The discriminants are the row indices inside a [`Frame`]; the metrics
/// pipeline depends on them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    const ALL: [PoseLandmark; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

}

/// Full landmark snapshot at one sampled instant.
///
/// Always holds exactly [`PoseLandmark::COUNT`] finite landmarks with
/// confidence in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct Frame {
    landmarks: Vec<Landmark>,
}

impl Frame {
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self> {
        if landmarks.len() != PoseLandmark::COUNT {
            return Err(Error::LandmarkCount {
                expected: PoseLandmark::COUNT,
                actual: landmarks.len(),
            });
        }
        for (index, landmark) in landmarks.iter().enumerate() {
            landmark.check(index)?;
        }
        Ok(Self { landmarks })
    }

    /// Build a frame from the estimator's `(33, 4)` row layout.
    pub fn from_rows(rows: &[[f64; 4]]) -> Result<Self> {
        Self::new(rows.iter().copied().map(Landmark::from).collect())
    }

    pub fn landmark(&self, which: PoseLandmark) -> &Landmark {
        &self.landmarks[which.index()]
    }

    /// Replace one landmark, with the same checks as [`Frame::new`].
    pub fn set(&mut self, which: PoseLandmark, landmark: Landmark) -> Result<()> {
        landmark.check(which.index())?;
        self.landmarks[which.index()] = landmark;
        Ok(())
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            landmarks: vec![Landmark::default(); PoseLandmark::COUNT],
        }
    }
}

impl TryFrom<Vec<Landmark>> for Frame {
    type Error = Error;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self> {
        Self::new(landmarks)
    }
}

impl From<Frame> for Vec<Landmark> {
    fn from(frame: Frame) -> Self {
        frame.landmarks
    }
}

/// Temporally ordered frames of one subject.
pub type Sequence = Vec<Frame>;

/// Build a sequence from a `(frames, 33, 4)` array.
pub fn frames_from_rows(rows: &[Vec<[f64; 4]>]) -> Result<Sequence> {
    rows.iter().map(|r| Frame::from_rows(r)).collect()
}
