use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of keypoints reported by the pose estimator per person
pub const JOINT_COUNT: usize = 33;

/// Keypoint vocabulary of the pose estimator, in landmark index order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Joint> {
        Self::ALL.get(index).copied()
    }

    /// Looks up a joint by its snake_case name, e.g. `left_knee`
    pub fn from_name(name: &str) -> Option<Joint> {
        Self::ALL.iter().copied().find(|j| j.to_string() == name)
    }
}

/// Triple of joints `[a, b, c]`; angles are measured at `b`
pub type KeypointTriple = [Joint; 3];

/// One keypoint as reported by the pose estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    seq: u64,
    #[serde(default)]
    timestamp_ms: Option<u64>,
    #[serde(default)]
    joints: HashMap<Joint, Landmark>,
}

/// Pose estimation result for a single video frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFrame")]
pub struct JointFrame {
    pub seq: u64,
    pub timestamp_ms: Option<u64>,
    landmarks: [Option<Landmark>; JOINT_COUNT],
}

impl From<RawFrame> for JointFrame {
    fn from(raw: RawFrame) -> Self {
        let mut frame = JointFrame::new(raw.seq);
        frame.timestamp_ms = raw.timestamp_ms;
        for (joint, landmark) in raw.joints {
            frame.set(joint, landmark);
        }
        frame
    }
}

impl JointFrame {
    pub fn new(seq: u64) -> Self {
        Self {
            seq,
            timestamp_ms: None,
            landmarks: [None; JOINT_COUNT],
        }
    }

    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.set(joint, landmark);
        self
    }

    pub fn set(&mut self, joint: Joint, landmark: Landmark) {
        self.landmarks[joint.index()] = Some(landmark);
    }

    pub fn get(&self, joint: Joint) -> Option<&Landmark> {
        self.landmarks[joint.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }
}
