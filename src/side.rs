use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Picks the working angle for a frame from the left and right candidates.
///
/// With one defined side that side wins. With both defined, arm exercises
/// take the side with the higher aggregate confidence (ties go left) while
/// leg exercises report the lower angle; the dual-side policy still looks
/// at both sides when counting.
pub fn select(
    left_angle: Option<f64>,
    right_angle: Option<f64>,
    left_confidence: f64,
    right_confidence: f64,
    is_leg_exercise: bool,
) -> Option<(f64, Side)> {
    match (left_angle, right_angle) {
        (None, None) => None,
        (Some(left), None) => Some((left, Side::Left)),
        (None, Some(right)) => Some((right, Side::Right)),
        (Some(left), Some(right)) if is_leg_exercise => {
            if right < left {
                Some((right, Side::Right))
            } else {
                Some((left, Side::Left))
            }
        }
        (Some(left), Some(right)) => {
            if right_confidence > left_confidence {
                Some((right, Side::Right))
            } else {
                Some((left, Side::Left))
            }
        }
    }
}
