//! Closed-form circadian rhythm of each signal.
//!
//! Shapes are sums of periodic Gaussian bumps and smooth windows over the
//! circadian minute (0 = midnight). Wake-dominant signals use a 07:00-23:00
//! window; the asleep branch lowers arousal systems and adds the REM-linked
//! cholinergic drive.
//!
//! References:
//! - Weitzman ED et al. J Clin Endocrinol Metab. 1971;33:14-22 (cortisol 24h profile)
//! - Brzezinski A. N Engl J Med. 1997;336:186-195 (melatonin profile)
//! - Hasselmo ME. Curr Opin Neurobiol. 1999;9:351-359 (ACh in REM sleep)
//! - Cummings DE et al. Diabetes. 2001;50:1714-1719 (preprandial ghrelin surges)

use super::phase::{gaussian, window};
use crate::signals::Signal;

/// Wake window used by arousal-linked signals (minutes of day)
const WAKE_ON_MIN: f64 = 420.0;
const WAKE_OFF_MIN: f64 = 1380.0;

/// Ultradian REM episodes across a night (approx. every 90 min after midnight)
const REM_CENTERS_MIN: [f64; 5] = [30.0, 120.0, 210.0, 300.0, 390.0];

/// Cholinergic REM drive, growing toward morning as REM episodes lengthen
fn rem_drive(phase: f64) -> f64 {
    REM_CENTERS_MIN
        .iter()
        .enumerate()
        .map(|(i, &c)| (0.6 + 0.1 * i as f64) * gaussian(phase, c, 12.0))
        .sum()
}

/// Unshifted setpoint of a signal at a circadian phase
pub(super) fn raw_setpoint(signal: Signal, phase: f64, asleep: bool) -> f64 {
    let awake = window(phase, WAKE_ON_MIN, WAKE_OFF_MIN, 60.0);
    match signal {
        Signal::Dopamine => 40.0 + 15.0 * gaussian(phase, 660.0, 240.0) + 5.0 * gaussian(phase, 1080.0, 180.0),
        Signal::Serotonin => 30.0 + 15.0 * window(phase, WAKE_ON_MIN, 1320.0, 90.0),
        Signal::Norepinephrine => 200.0 + 150.0 * awake + 60.0 * gaussian(phase, 540.0, 120.0),
        Signal::Adrenaline => 30.0 + 30.0 * gaussian(phase, 600.0, 180.0),
        Signal::Gaba => 550.0 + 120.0 * gaussian(phase, 120.0, 200.0),
        Signal::Glutamate => 8.0 + 4.0 * window(phase, WAKE_ON_MIN, WAKE_OFF_MIN, 90.0),
        Signal::Acetylcholine => {
            if asleep {
                15.0 + 35.0 * rem_drive(phase)
            } else {
                30.0 + 20.0 * awake
            }
        }
        Signal::Histamine => {
            if asleep {
                5.0 + 4.0 * awake
            } else {
                8.0 + 12.0 * awake
            }
        }
        Signal::Orexin => {
            if asleep {
                120.0 + 40.0 * awake
            } else {
                150.0 + 150.0 * awake
            }
        }
        // Brzezinski 1997: onset ~21:00, peak 02:00-04:00, offset ~07:00-09:00
        Signal::Melatonin => 5.0 + 65.0 * gaussian(phase, 180.0, 150.0),
        // Weitzman 1971: nadir around midnight, acrophase shortly after waking
        Signal::Cortisol => 4.0 + 14.0 * gaussian(phase, 510.0, 90.0) + 3.0 * gaussian(phase, 780.0, 120.0),
        Signal::Adenosine => 170.0 + 60.0 * gaussian(phase, 1200.0, 240.0),
        // Dawn phenomenon
        Signal::Glucose => 88.0 + 6.0 * gaussian(phase, 420.0, 90.0),
        Signal::Insulin => 6.0 + 4.0 * window(phase, 480.0, 1260.0, 120.0),
        Signal::Glucagon => 65.0 + 15.0 * gaussian(phase, 240.0, 180.0),
        // Cummings 2001: entrained surges before habitual meals
        Signal::Ghrelin => {
            500.0
                + 200.0 * gaussian(phase, 720.0, 60.0)
                + 250.0 * gaussian(phase, 1140.0, 60.0)
                + 150.0 * gaussian(phase, 180.0, 180.0)
        }
    }
}
