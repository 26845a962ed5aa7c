//! The DMX universe scratch buffer and its on-air frame layout.
//!
//! The E1.31 collaborator writes channel values into this buffer; the pacer in [`link`] drains
//! it one 32-byte frame at a time.
//!
//! Two layouts exist:
//!
//! * **Legacy**: a single 32-byte frame, channel `c` at offset `c`, matching first-generation
//!   fixtures that expect one raw payload.
//! * **Universe**: 17 frames of 1 index byte + 31 channel bytes, carrying a full 512-channel
//!   universe. Channel `c` lives at offset `1 + ((c / 31) << 5) + (c % 31)`; byte 0 of frame `f`
//!   is the prewritten index `f`, which channel writes never touch.
//!
//! The universe backing store is padded to 17 full frames so the last (17-channel) frame can be
//! handed to the radio as a complete payload.
//!
//! [`link`]: ../link/index.html

use crate::radio::PAYLOAD_LEN;
use crate::time::Duration;

/// Channels carried in legacy mode.
pub const LEGACY_CHANNELS: u16 = 32;

/// Channels carried in universe mode.
pub const UNIVERSE_CHANNELS: u16 = 512;

/// Frames per universe refresh.
pub const UNIVERSE_FRAMES: usize = 17;

/// Channel bytes per universe frame; the remaining byte holds the frame index.
const FRAME_PAYLOAD: usize = PAYLOAD_LEN - 1;

const UNIVERSE_BUF: usize = UNIVERSE_FRAMES * PAYLOAD_LEN;

/// Shortest pause between legacy frames, pacing a 44 Hz refresh.
pub const LEGACY_FRAME_GAP: Duration = Duration::from_millis(22);

/// Shortest pause between universe frames.
///
/// 44 universe refreshes per second over 17 frames would allow 1.33 ms; the fixtures keep up
/// with considerably tighter gating, so the pacer only enforces this floor.
pub const UNIVERSE_FRAME_GAP: Duration = Duration::from_micros(665);

/// Frames between heartbeat LED toggles, chosen so the LED blinks about once per second.
const BLINK_REFRESHES: u16 = 44;

/// Universe size selector handed to `begin`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniverseSize {
    /// 32 channels, one frame per refresh.
    Legacy,
    /// 512 channels, 17 frames per refresh.
    Full,
}

/// The channel scratch buffer, laid out for transmission.
pub enum Universe {
    Legacy {
        data: [u8; PAYLOAD_LEN],
    },
    Full {
        data: [u8; UNIVERSE_BUF],
        next: u8,
    },
}

impl Universe {
    /// Creates a zeroed buffer in the requested layout, with universe frame indices prewritten.
    pub fn new(size: UniverseSize) -> Self {
        match size {
            UniverseSize::Legacy => Universe::Legacy {
                data: [0; PAYLOAD_LEN],
            },
            UniverseSize::Full => {
                let mut data = [0; UNIVERSE_BUF];
                for f in 0..UNIVERSE_FRAMES {
                    data[f * PAYLOAD_LEN] = f as u8;
                }
                Universe::Full { data, next: 0 }
            }
        }
    }

    /// Number of channels this buffer carries.
    pub fn channels(&self) -> u16 {
        match self {
            Universe::Legacy { .. } => LEGACY_CHANNELS,
            Universe::Full { .. } => UNIVERSE_CHANNELS,
        }
    }

    /// Stores one channel value. Out-of-range channels are ignored.
    pub fn set_channel(&mut self, channel: u16, value: u8) {
        match self {
            Universe::Legacy { data } => {
                if channel < LEGACY_CHANNELS {
                    data[channel as usize] = value;
                }
            }
            Universe::Full { data, .. } => {
                if channel < UNIVERSE_CHANNELS {
                    let c = channel as usize;
                    data[1 + ((c / FRAME_PAYLOAD) << 5) + (c % FRAME_PAYLOAD)] = value;
                }
            }
        }
    }

    /// The frame the pacer should transmit next.
    pub fn next_frame(&self) -> &[u8] {
        match self {
            Universe::Legacy { data } => &data[..],
            Universe::Full { data, next } => {
                let off = *next as usize * PAYLOAD_LEN;
                &data[off..off + PAYLOAD_LEN]
            }
        }
    }

    /// Advances the frame cursor after a transmission.
    pub fn advance(&mut self) {
        if let Universe::Full { next, .. } = self {
            *next = (*next + 1) % UNIVERSE_FRAMES as u8;
        }
    }

    /// Minimum pause between two frame transmissions.
    pub fn frame_gap(&self) -> Duration {
        match self {
            Universe::Legacy { .. } => LEGACY_FRAME_GAP,
            Universe::Full { .. } => UNIVERSE_FRAME_GAP,
        }
    }

    /// Frames between two heartbeat LED toggles.
    pub fn frames_per_blink(&self) -> u16 {
        match self {
            Universe::Legacy { .. } => BLINK_REFRESHES,
            Universe::Full { .. } => BLINK_REFRESHES * UNIVERSE_FRAMES as u16,
        }
    }

    /// The raw buffer, for host-side visualization.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Universe::Legacy { data } => &data[..],
            Universe::Full { data, .. } => &data[..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_channels_map_directly() {
        let mut u = Universe::new(UniverseSize::Legacy);
        u.set_channel(5, 0x11);
        u.set_channel(31, 0x22);
        u.set_channel(32, 0x99);

        let frame = u.next_frame();
        assert_eq!(frame.len(), PAYLOAD_LEN);
        assert_eq!(frame[5], 0x11);
        assert_eq!(frame[31], 0x22);
        assert!(u.as_bytes().iter().all(|&b| b != 0x99));
    }

    #[test]
    fn universe_frame_indices_are_prewritten() {
        let u = Universe::new(UniverseSize::Full);
        for f in 0..UNIVERSE_FRAMES {
            assert_eq!(u.as_bytes()[f * PAYLOAD_LEN], f as u8);
        }
    }

    #[test]
    fn universe_channel_offsets() {
        let mut u = Universe::new(UniverseSize::Full);
        for &(ch, value) in &[(0u16, 0xAB), (30, 0x01), (31, 0x02), (61, 0x03), (511, 0x04)] {
            u.set_channel(ch, value);
            let c = ch as usize;
            let off = 1 + ((c / 31) << 5) + (c % 31);
            assert_eq!(u.as_bytes()[off], value);
        }
        // Indices survive the writes.
        for f in 0..UNIVERSE_FRAMES {
            assert_eq!(u.as_bytes()[f * PAYLOAD_LEN], f as u8);
        }
    }

    #[test]
    fn channel_writes_land_in_their_frame() {
        let mut u = Universe::new(UniverseSize::Full);
        u.set_channel(0, 0xAB);
        assert_eq!(&u.next_frame()[..3], &[0x00, 0xAB, 0x00]);

        u.set_channel(511, 0xCD);
        u.set_channel(512, 0xEE);
        for _ in 0..16 {
            u.advance();
        }
        let last = u.next_frame();
        assert_eq!(last[0], 16);
        assert_eq!(last[1 + 511 % 31], 0xCD);
    }

    #[test]
    fn frame_cursor_wraps() {
        let mut u = Universe::new(UniverseSize::Full);
        for _ in 0..UNIVERSE_FRAMES {
            u.advance();
        }
        assert_eq!(u.next_frame()[0], 0);
    }
}
