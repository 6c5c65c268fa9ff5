//! Joint angle calculation using the dot product
//!
//! The angle at vertex `b` is measured between the rays `b→a` and `b→c`.
//! Angles are planar: only `x` and `y` take part, depth is ignored.

use crate::joints::{JointFrame, KeypointTriple, Landmark};
use crate::util::mean;

/// Default minimum landmark visibility for a joint to take part in an angle
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

const MIN_ARM_LENGTH: f64 = 1e-9;

/// Angle in degrees (0..=180) at `b`, or `None` when it is undefined.
///
/// Undefined means any of the three landmarks is below `min_confidence`,
/// one of the arms has zero length, or an input is not a finite number.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark, min_confidence: f64) -> Option<f64> {
    if min_confidence.is_nan() {
        return None;
    }
    if [a, b, c]
        .iter()
        .any(|l| !l.visibility.is_finite() || l.visibility < min_confidence)
    {
        return None;
    }
    angle_between((a.x, a.y), (b.x, b.y), (c.x, c.y))
}

/// Angle at `b` for raw planar points, `None` for coincident points
pub fn angle_between(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<f64> {
    if [a.0, a.1, b.0, b.1, c.0, c.1].iter().any(|v| !v.is_finite()) {
        return None;
    }
    let u = (a.0 - b.0, a.1 - b.1);
    let v = (c.0 - b.0, c.1 - b.1);

    let mag_u = u.0.hypot(u.1);
    let mag_v = v.0.hypot(v.1);
    if mag_u < MIN_ARM_LENGTH || mag_v < MIN_ARM_LENGTH {
        return None;
    }

    let cos_angle = ((u.0 * v.0 + u.1 * v.1) / (mag_u * mag_v)).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees();
    degrees.is_finite().then_some(degrees)
}

/// Angle of a keypoint triple within one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripleAngle {
    pub angle: Option<f64>,
    /// Mean visibility of the three joints, 0 when any joint is missing
    pub confidence: f64,
}

/// Resolves `triple` against `frame` and measures it
pub fn triple_angle(frame: &JointFrame, triple: &KeypointTriple, min_confidence: f64) -> TripleAngle {
    let landmarks: Option<Vec<&Landmark>> = triple.iter().map(|j| frame.get(*j)).collect();
    match landmarks.as_deref() {
        Some([a, b, c]) => {
            let visibilities = [a.visibility, b.visibility, c.visibility];
            TripleAngle {
                angle: angle_at(a, b, c, min_confidence),
                confidence: mean(&visibilities).unwrap_or(0.0),
            }
        }
        _ => TripleAngle {
            angle: None,
            confidence: 0.0,
        },
    }
}
