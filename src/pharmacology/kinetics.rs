//! Saturable rate laws.
//!
//! References:
//! - Michaelis L, Menten ML. Biochemische Zeitschrift. 1913;49:333-369
//! - Hill AV. Journal of Physiology. 1910;40:iv-vii
//! - Holford NHG, Sheiner LB. Clin Pharmacokinet. 1981;6:429-453 (PK/PD link models)

/// Michaelis-Menten elimination rate
///
/// v = Vmax * C / (Km + C)
///
/// # Arguments
/// * `vmax_mg_per_l_per_min` - Maximum elimination velocity
/// * `km_mg_per_l` - Concentration at half-maximal velocity
/// * `c_mg_per_l` - Current concentration
#[inline]
pub fn michaelis_menten(vmax_mg_per_l_per_min: f64, km_mg_per_l: f64, c_mg_per_l: f64) -> f64 {
    if c_mg_per_l <= 0.0 {
        return 0.0;
    }
    let denom = km_mg_per_l + c_mg_per_l;
    if denom <= 0.0 {
        return 0.0;
    }
    vmax_mg_per_l_per_min * c_mg_per_l / denom
}

/// Hill occupancy (fraction of targets engaged)
///
/// occ = C^n / (K^n + C^n)
///
/// Returns 0 for non-positive concentration or potency, and never NaN.
#[inline]
pub fn hill_occupancy(c: f64, k_half: f64, n: f64) -> f64 {
    if c <= 0.0 || k_half <= 0.0 || n <= 0.0 {
        return 0.0;
    }
    // Ratio form avoids overflow of C^n for large concentrations
    let ratio = (k_half / c).powf(n);
    let occ = 1.0 / (1.0 + ratio);
    if occ.is_finite() {
        occ
    } else {
        0.0
    }
}

/// Time-to-peak of the one-compartment first-order absorption model
///
/// tmax = ln(ka/ke) / (ka - ke), with the limit 1/ke at ka == ke.
pub fn time_to_peak(ka_per_min: f64, ke_per_min: f64) -> f64 {
    if ka_per_min <= 0.0 || ke_per_min <= 0.0 {
        return 0.0;
    }
    let diff = ka_per_min - ke_per_min;
    if diff.abs() < 1e-12 * ke_per_min.max(1e-12) {
        return 1.0 / ke_per_min;
    }
    (ka_per_min / ke_per_min).ln() / diff
}

/// Absorption rate constant giving the requested time-to-peak
///
/// `time_to_peak` is strictly decreasing in ka over (0, inf), so a bisection
/// in log space finds the unique root. A zero or negative tmax means
/// near-instant absorption.
pub fn ka_from_tmax(ke_per_min: f64, tmax_min: f64) -> f64 {
    const KA_MAX: f64 = 10.0;
    if ke_per_min <= 0.0 {
        return if tmax_min > 0.0 { 1.0 / tmax_min } else { KA_MAX };
    }
    if tmax_min <= 0.0 {
        return KA_MAX;
    }
    let mut lo = (1e-6f64).ln();
    let mut hi = KA_MAX.ln();
    if time_to_peak(KA_MAX, ke_per_min) >= tmax_min {
        return KA_MAX;
    }
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if time_to_peak(mid.exp(), ke_per_min) > tmax_min {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (0.5 * (lo + hi)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_michaelis_menten_half_max() {
        let v = michaelis_menten(2.0, 100.0, 100.0);
        assert!((v - 1.0).abs() < 1e-12);
        assert_eq!(michaelis_menten(2.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_hill_occupancy() {
        assert!((hill_occupancy(50.0, 50.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((hill_occupancy(50.0, 50.0, 2.5) - 0.5).abs() < 1e-12);
        assert!(hill_occupancy(1e12, 1.0, 3.0) > 0.999);
        assert_eq!(hill_occupancy(0.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_ka_from_tmax_recovers_tmax() {
        let ke = (2.0f64).ln() / 300.0;
        for tmax in [15.0, 45.0, 120.0, 360.0] {
            let ka = ka_from_tmax(ke, tmax);
            let recovered = time_to_peak(ka, ke);
            assert!((recovered - tmax).abs() < 1e-6 * tmax, "tmax {} -> ka {} -> {}", tmax, ka, recovered);
        }
    }

    #[test]
    fn test_ka_from_slow_tmax_is_flip_flop() {
        // tmax longer than 1/ke forces ka < ke
        let ke = 0.01;
        let ka = ka_from_tmax(ke, 200.0);
        assert!(ka < ke);
    }
}
