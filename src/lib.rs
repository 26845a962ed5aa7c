//! Core of a wireless DMX bridge.
//!
//! This crate turns a streamed E1.31/sACN universe into short 2.4 GHz radio broadcasts for
//! battery-powered fixtures, and doubles as the control-plane master that discovers those
//! fixtures, reconfigures them, and re-flashes their firmware over the same radio.
//!
//! # Using the core
//!
//! The core is runtime and hardware-agnostic: it does not own a main loop and has no driver for
//! any particular transceiver. The host supplies a few capabilities through [`Config`]:
//! * A millisecond-to-microsecond precision [`Timer`].
//! * A [`Radio`] contract over an nRF24L01-class packet radio.
//! * A [`FirmwareFile`] giving byte-addressable access to an Intel-HEX image.
//! * An [`Observer`] that receives discovery batches and session outcomes.
//!
//! Everything else (Wi-Fi bring-up, the E1.31 receiver, the UI) stays outside and talks to
//! [`RadioLink`] through `set_channel`/`show` on the data plane and the async admin operations on
//! the control plane.
//!
//! [`Config`]: config/trait.Config.html
//! [`Timer`]: time/trait.Timer.html
//! [`Radio`]: radio/trait.Radio.html
//! [`FirmwareFile`]: hex/trait.FirmwareFile.html
//! [`Observer`]: link/trait.Observer.html
//! [`RadioLink`]: link/struct.RadioLink.html

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;
#[macro_use]
mod utils;
pub mod bytes;
pub mod config;
pub mod device;
pub mod dmx;
mod error;
pub mod hex;
pub mod link;
pub mod phy;
pub mod radio;
pub mod scan;
pub mod time;

pub use self::error::Error;
