//! Periodic pulse primitives over the circadian minute.
//!
//! Every primitive is made periodic by reducing the phase into `[0, 1440)`
//! and summing the pulse over the neighbouring days. A pulse whose support
//! is much narrower than a day then has identical values and derivatives at
//! minute 0 and minute 1440, so there is no seam at midnight.

/// Minutes per circadian day
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Reduce any minute stamp to the circadian minute of day in `[0, 1440)`
#[inline]
pub fn minute_of_day(minute: f64) -> f64 {
    minute.rem_euclid(MINUTES_PER_DAY)
}

#[inline]
fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Periodic Gaussian bump peaking at 1.0 on `center_min`
///
/// # Arguments
/// * `minute` - Any minute stamp (reduced internally)
/// * `center_min` - Peak position within the day
/// * `width_min` - Standard deviation in minutes (keep well below 1440)
pub fn gaussian(minute: f64, center_min: f64, width_min: f64) -> f64 {
    if width_min <= 0.0 {
        return 0.0;
    }
    let phase = minute_of_day(minute);
    let center = minute_of_day(center_min);
    let two_var = 2.0 * width_min * width_min;
    (-2..=2)
        .map(|k| {
            let d = phase - center + k as f64 * MINUTES_PER_DAY;
            (-d * d / two_var).exp()
        })
        .sum()
}

/// Periodic smooth window, ~1.0 between `on_min` and `off_min`, ~0.0 outside
///
/// Edges are logistic with the given steepness (minutes per e-fold).
/// Windows that cross midnight (`off_min <= on_min`) are supported.
pub fn window(minute: f64, on_min: f64, off_min: f64, edge_min: f64) -> f64 {
    let edge = edge_min.max(1.0);
    let phase = minute_of_day(minute);
    let on = minute_of_day(on_min);
    let mut off = minute_of_day(off_min);
    if off <= on {
        off += MINUTES_PER_DAY;
    }
    (-2..=2)
        .map(|k| {
            let t = phase + k as f64 * MINUTES_PER_DAY;
            logistic((t - on) / edge) - logistic((t - off) / edge)
        })
        .sum()
}
