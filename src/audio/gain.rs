/// Gain multiplier for peak normalization.
///
/// Unity when normalization is off or the peak is not known yet; otherwise
/// the multiplier that brings `peak` to `target`, capped at `max_gain`.
pub fn normalization_gain(normalize: bool, peak: Option<f32>, target: f32, max_gain: f32) -> f32 {
    if !normalize {
        return 1.0;
    }
    match peak {
        Some(p) if p > 0.0 => (target / p).min(max_gain),
        _ => 1.0,
    }
}
