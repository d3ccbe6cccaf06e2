//! Input shaping for `quickcheck` properties

/// Replaces NaN and infinities, which quickcheck generates liberally, with zero
#[must_use]
pub fn sanitize(raw: f64) -> f64 {
    if raw.is_finite() {
        raw
    } else {
        0.0
    }
}

/// Maps any float onto an aspect ratio between 1:10 and 10:1
#[must_use]
pub fn ratio_from(seed: f64) -> f64 {
    let unit = sanitize(seed).abs().fract();
    // log-uniform so that portrait and landscape are equally likely
    10f64.powf(unit * 2.0 - 1.0)
}

/// Picks a device pixel ratio that is exact in binary floating point
#[must_use]
pub fn pixel_ratio_from(seed: u8) -> f64 {
    [1.0, 1.25, 1.5, 2.0, 3.0][seed as usize % 5]
}
