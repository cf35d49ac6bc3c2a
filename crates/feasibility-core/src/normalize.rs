/// Linear min-max scaling into [0, 1].
///
/// A degenerate domain (`domain_min == domain_max`) yields 0.5. With `clip`
/// the input is clamped into the domain first; without it the formula is
/// applied as-is and values outside the domain map outside [0, 1].
pub fn normalize(raw: f64, domain_min: f64, domain_max: f64, clip: bool) -> f64 {
    if domain_min == domain_max {
        return 0.5;
    }
    let x = if clip {
        raw.clamp(domain_min.min(domain_max), domain_min.max(domain_max))
    } else {
        raw
    };
    (x - domain_min) / (domain_max - domain_min)
}

/// Sign-preserving squash into [-1, 1] via `tanh(raw / scale)`.
///
/// Keeps magnitude information that a hard clip would discard. A scale that
/// is not strictly positive falls back to clamping.
pub fn normalize_signed(raw: f64, scale: f64) -> f64 {
    if !(scale.is_finite() && scale > 0.0) {
        return raw.clamp(-1.0, 1.0);
    }
    (raw / scale).tanh()
}

/// Maps a signed value in [-1, 1] onto [0, 1].
pub fn to_unit(signed: f64) -> f64 {
    ((signed + 1.0) / 2.0).clamp(0.0, 1.0)
}

pub(crate) fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub(crate) fn saturating_ratio(count: usize, saturation: usize) -> f64 {
    if saturation == 0 {
        return 1.0;
    }
    (count as f64 / saturation as f64).min(1.0)
}
