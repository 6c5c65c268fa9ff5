pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Signed distance of `value` past `threshold`, positive once crossed in
/// the given direction (`increasing == true` means crossing upward)
pub fn overshoot(value: f64, threshold: f64, increasing: bool) -> f64 {
    if increasing {
        value - threshold
    } else {
        threshold - value
    }
}
