//! Carrier-detect sweep across the 2.4 GHz channel space.
//!
//! Produces a coarse occupancy histogram the host UI uses to pick a quiet [`Band`]. The sweep
//! briefly parks the receiver on every channel and records whether the radio saw any carrier;
//! two passes smooth out bursty interferers a little.
//!
//! [`Band`]: ../phy/enum.Band.html

use crate::radio::Radio;
use crate::time::{Duration, Timer};

/// Number of channels covered by a sweep.
pub const SCAN_CHANNELS: usize = 84;

/// Sweep passes per histogram.
pub const SCAN_PASSES: u8 = 2;

/// How long the receiver dwells on each channel before sampling carrier detect.
pub const DWELL_TIME: Duration = Duration::from_micros(128);

/// Per-channel carrier counts; each bucket is at most [`SCAN_PASSES`].
///
/// [`SCAN_PASSES`]: constant.SCAN_PASSES.html
pub type Histogram = [u8; SCAN_CHANNELS];

/// Runs a two-pass carrier sweep.
///
/// Leaves the radio stopped on the last scanned channel; the caller is expected to restore its
/// working configuration afterwards.
pub fn sweep<R: Radio, T: Timer>(radio: &mut R, timer: &T) -> Histogram {
    let mut histogram = [0; SCAN_CHANNELS];

    radio.stop_listening();
    for _ in 0..SCAN_PASSES {
        for (channel, bucket) in histogram.iter_mut().enumerate() {
            radio.set_channel(channel as u8);
            radio.start_listening();
            let entered = timer.now();
            while timer.now().duration_since(entered) < DWELL_TIME {}
            radio.stop_listening();

            if radio.test_carrier() {
                *bucket += 1;
            }
        }
    }

    histogram
}
