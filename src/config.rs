//! Capability bundle supplied by the host.

use crate::{hex::FirmwareFile, link::Observer, radio::Radio, time::Timer};

/// Trait bundling the host-provided types the core is built from.
///
/// Every host defines one type implementing this trait and hands it to [`RadioLink`]. Tests
/// substitute fakes for all four capabilities.
///
/// [`RadioLink`]: ../link/struct.RadioLink.html
pub trait Config {
    /// A time source with microsecond resolution.
    type Timer: Timer;

    /// The transceiver driver.
    type Radio: Radio;

    /// Byte-addressable read access to an Intel-HEX firmware image.
    type Firmware: FirmwareFile;

    /// Receiver of discovery batches, session outcomes and the heartbeat.
    type Observer: Observer;
}
