//! Fixture identity and the inventory record carried in beacon replies.

use core::fmt;

use bitflags::bitflags;

use crate::bytes::ByteReader;
use crate::link::wire;
use crate::phy::Address;
use crate::Error;

/// A 24-bit fixture identifier.
///
/// Besides naming a fixture logically, the identifier doubles as that fixture's radio address in
/// 3-byte addressing mode, so point-to-point requests need no address table.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Creates an identifier from the low 24 bits of `raw`.
    pub const fn new(raw: u32) -> Self {
        DeviceId(raw & 0x00FF_FFFF)
    }

    /// Creates an identifier from its 3 on-air bytes (LSB first).
    pub fn from_le_bytes(bytes: [u8; 3]) -> Self {
        DeviceId(u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16)
    }

    /// Returns the identifier's 3 on-air bytes (LSB first).
    pub fn to_le_bytes(self) -> [u8; 3] {
        [self.0 as u8, (self.0 >> 8) as u8, (self.0 >> 16) as u8]
    }

    /// Returns the raw 24-bit value.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Returns the radio address of this fixture.
    pub fn address(self) -> Address {
        Address::from_id(self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Debug>::fmt(self, f)
    }
}

enum_with_unknown! {
    /// Printed circuit board assemblies fielded so far.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum PcbType(u8) {
        None = 0x00,
        ThreeChannel = 0x01,
        DmxAdapter = 0x02,
        LuxeonRgb = 0x03,
        TwelveChannel = 0x04,
        Uno = 0x05,
        RfColor = 0x06,
    }
}

enum_with_unknown! {
    /// Microcontroller families the bootloader reports.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Processor(u8) {
        Pic16F1823 = 0x00,
        Pic16F1825 = 0x01,
        Pic16F722 = 0x02,
        Atmega328P = 0x80,
    }
}

enum_with_unknown! {
    /// On-air data rate a fixture is configured for.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum RfRate(u8) {
        Kbps250 = 0x00,
        Mbps1 = 0x01,
        Mbps2 = 0x02,
    }
}

bitflags! {
    /// Admin operations a fixture's firmware claims to support.
    pub struct AdminCaps: u8 {
        const OTA = 0x01;
        const DEVID = 0x02;
        const START = 0x04;
        const BAUD = 0x08;
        const RFCHAN = 0x10;
        const LEDMAP = 0x20;
    }
}

/// Inventory record a fixture reports in its beacon reply.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub dev_id: DeviceId,
    pub pcb_type: PcbType,
    pub pcb_version: u8,
    pub processor: Processor,
    pub num_channels: u16,
    pub bl_version: u8,
    pub app_magic: u8,
    pub app_version: u8,
    pub start_channel: u16,
    pub rf_chan: u8,
    pub rf_rate: RfRate,
    pub caps: AdminCaps,
}

impl DeviceInfo {
    /// Decodes a beacon reply frame.
    ///
    /// The image size and checksum the bootloader tracks for itself sit between the application
    /// magic and version; the bridge has no use for them and skips them.
    pub fn parse(frame: &[u8]) -> Result<Self, Error> {
        let mut r = ByteReader::new(frame);
        if r.read_u8()? != wire::opcode::DEVINFO {
            return Err(Error::InvalidValue);
        }

        let dev_id = DeviceId::new(r.read_u24_le()?);
        let pcb_type = PcbType::from(r.read_u8()?);
        let pcb_version = r.read_u8()?;
        let processor = Processor::from(r.read_u8()?);
        let num_channels = r.read_u16_le()?;
        let bl_version = r.read_u8()?;
        let app_magic = r.read_u8()?;
        r.skip(4)?;
        let app_version = r.read_u8()?;
        let start_channel = r.read_u16_le()?;
        let rf_chan = r.read_u8()?;
        let rf_rate = RfRate::from(r.read_u8()?);
        let caps = AdminCaps::from_bits_truncate(r.read_u8()?);

        Ok(DeviceInfo {
            dev_id,
            pcb_type,
            pcb_version,
            processor,
            num_channels,
            bl_version,
            app_magic,
            app_version,
            start_channel,
            rf_chan,
            rf_rate,
            caps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::PAYLOAD_LEN;

    fn reply() -> [u8; PAYLOAD_LEN] {
        let mut frame = [0u8; PAYLOAD_LEN];
        frame[0] = wire::opcode::DEVINFO;
        frame[1..4].copy_from_slice(&[0x01, 0x02, 0x03]); // dev_id
        frame[4] = 0x01; // pcb type
        frame[5] = 0x02; // pcb version
        frame[6] = 0x01; // processor
        frame[7..9].copy_from_slice(&3u16.to_le_bytes());
        frame[9] = 0x07; // bootloader version
        frame[10] = 0x42; // app magic
        frame[11..15].copy_from_slice(&[0x00, 0x10, 0x34, 0x12]); // size + csum, skipped
        frame[15] = 0x09; // app version
        frame[16..18].copy_from_slice(&160u16.to_le_bytes());
        frame[18] = 70; // rf channel
        frame[19] = 0x02; // rf rate
        frame[20] = 0x17; // caps
        frame
    }

    #[test]
    fn parses_a_beacon_reply() {
        let info = DeviceInfo::parse(&reply()).unwrap();
        assert_eq!(info.dev_id, DeviceId::new(0x030201));
        assert_eq!(info.pcb_type, PcbType::ThreeChannel);
        assert_eq!(info.processor, Processor::Pic16F1825);
        assert_eq!(info.num_channels, 3);
        assert_eq!(info.bl_version, 0x07);
        assert_eq!(info.app_magic, 0x42);
        assert_eq!(info.app_version, 0x09);
        assert_eq!(info.start_channel, 160);
        assert_eq!(info.rf_chan, 70);
        assert_eq!(info.rf_rate, RfRate::Mbps2);
        assert_eq!(
            info.caps,
            AdminCaps::OTA | AdminCaps::DEVID | AdminCaps::START | AdminCaps::RFCHAN
        );
    }

    #[test]
    fn rejects_other_opcodes() {
        let mut frame = reply();
        frame[0] = 0x85;
        assert_eq!(DeviceInfo::parse(&frame), Err(Error::InvalidValue));
    }

    #[test]
    fn unknown_code_points_are_preserved() {
        let mut frame = reply();
        frame[4] = 0x7F;
        let info = DeviceInfo::parse(&frame).unwrap();
        assert_eq!(info.pcb_type, PcbType::Unknown(0x7F));
        assert_eq!(u8::from(info.pcb_type), 0x7F);
    }

    #[test]
    fn id_round_trips_through_wire_bytes() {
        let id = DeviceId::new(0xAABBCC);
        assert_eq!(id.to_le_bytes(), [0xCC, 0xBB, 0xAA]);
        assert_eq!(DeviceId::from_le_bytes(id.to_le_bytes()), id);
        assert_eq!(format!("{}", id), "aabbcc");
        assert_eq!(id.address().bytes(), &[0xCC, 0xBB, 0xAA]);
    }
}
