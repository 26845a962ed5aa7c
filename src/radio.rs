//! Contract over an nRF24L01-class 2.4 GHz packet radio.
//!
//! The core never touches SPI registers itself; it drives the transceiver through this trait.
//! One implementation per supported radio chip is enough, and a scripted fake stands in for the
//! hardware under test.

use crate::phy::{Address, CrcMode, DataRate, PaLevel};

/// Fixed on-air payload size. Every frame the core sends or receives is this long.
pub const PAYLOAD_LEN: usize = 32;

/// Number of hardware receive pipes.
///
/// Pipe 0 shadows the transmit address (for auto-ack), pipe 1 listens on the control broadcast
/// address, and pipes 2..=5 serve point-to-point sessions.
pub const NUM_PIPES: u8 = 6;

/// Trait for radio transceiver drivers.
pub trait Radio {
    /// Applies the base RF configuration: data rate, channel, address width, CRC length and
    /// transmit power.
    ///
    /// Must be idempotent and safe to call between TX and RX cycles.
    fn configure(&mut self, rate: DataRate, channel: u8, addr_width: u8, crc: CrcMode, pa: PaLevel);

    /// Retunes to another RF channel without touching the remaining configuration.
    ///
    /// Used by the carrier scanner while sweeping the band.
    fn set_channel(&mut self, channel: u8);

    /// Sets the current write pipe. Subsequent calls to [`write`] target `addr`.
    ///
    /// [`write`]: #tymethod.write
    fn open_tx(&mut self, addr: &Address);

    /// Binds a receive pipe to `addr`.
    fn open_rx(&mut self, pipe: u8, addr: &Address);

    /// Enables or disables auto-acknowledgement on a single pipe.
    fn set_auto_ack(&mut self, pipe: u8, enabled: bool);

    /// Transitions the radio into receive mode.
    fn start_listening(&mut self);

    /// Transitions the radio out of receive mode so a frame can be transmitted.
    fn stop_listening(&mut self);

    /// Blocking transmit of one payload on the current write pipe.
    ///
    /// With `broadcast` set, the frame is sent without requesting an acknowledgement and the call
    /// returns `true` once the transmission completes. Otherwise the return value reports whether
    /// the hardware saw an ack.
    ///
    /// This is the longest operation the core ever performs; at 2 Mbit/s a payload is on the air
    /// for well under a millisecond.
    fn write(&mut self, payload: &[u8], broadcast: bool) -> bool;

    /// Returns the pipe index of the next queued received frame, if any. Non-blocking.
    fn available(&mut self) -> Option<u8>;

    /// Pops the next received frame into `payload`.
    fn read(&mut self, payload: &mut [u8; PAYLOAD_LEN]);

    /// Reports whether a carrier was detected on the current channel since entering receive
    /// mode. Used by the channel scanner.
    fn test_carrier(&mut self) -> bool;
}
