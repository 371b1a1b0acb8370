//! Linear range mapping

/// Map `value` from `[in_low, in_high]` to `[out_low, out_high]`.
///
/// Output ranges may be inverted (`out_low > out_high`). With `clamp` the
/// result is limited to the output range. A degenerate input range yields
/// `out_low`.
pub fn map_range(
    value: f32,
    in_low: f32,
    in_high: f32,
    out_low: f32,
    out_high: f32,
    clamp: bool,
) -> f32 {
    if (in_low - in_high).abs() < f32::EPSILON {
        return out_low;
    }

    let out = (value - in_low) / (in_high - in_low) * (out_high - out_low) + out_low;

    if !clamp {
        return out;
    }

    if out_high < out_low {
        out.clamp(out_high, out_low)
    } else {
        out.clamp(out_low, out_high)
    }
}
