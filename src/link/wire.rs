//! Control-plane frame layout.
//!
//! Every frame is exactly 32 bytes; multi-byte fields are little-endian. The first byte selects
//! the operation, and replies echo that byte with a result code at offset 1.
//!
//! ```notrust
//! BIND (broadcast on the control address):
//! +------+-----------+------------+- - - - - -+-------+- - - - - -+
//! | 0x87 | dev_id[3] | rx_addr[3] |           | nonce |           |
//! +------+-----------+------------+- - - - - -+-------+- - - - - -+
//! 0      1           4            7           16      17
//!
//! OTA, per record:  SETUP 0x80 (word address)  ->  WRITE 0x81 (first ≤31 payload bytes)
//!                   ->  COMMIT 0x82 (record byte-sum + tail word)
//! then once:        AUDIT 0x83 (start, size in words, word-sum) ->  RESET 0x86
//! ```
//!
//! The WRITE frame has room for 31 of a record's up to 32 bytes; the COMMIT frame carries the
//! record's final word, which completes coverage.

use byteorder::{ByteOrder, LittleEndian};

use crate::device::DeviceId;
use crate::hex::Record;
use crate::phy::Address;
use crate::radio::PAYLOAD_LEN;

/// One on-air control frame.
pub type Frame = [u8; PAYLOAD_LEN];

/// Operation selectors, one per frame kind.
pub mod opcode {
    /// Set the E1.31 start channel.
    pub const SET_START: u8 = 0x01;
    /// Move the fixture to another RF channel.
    pub const SET_RFCHAN: u8 = 0x02;
    /// Rewrite the fixture's device identifier.
    pub const SET_DEVID: u8 = 0x03;
    /// Erase and prepare one target flash page.
    pub const SETUP: u8 = 0x80;
    /// Stream one record's payload.
    pub const WRITE: u8 = 0x81;
    /// Conclude one record with its checksum and tail word.
    pub const COMMIT: u8 = 0x82;
    /// Verify the whole uploaded image.
    pub const AUDIT: u8 = 0x83;
    /// Discovery beacon, broadcast by the bridge.
    pub const BEACON: u8 = 0x85;
    /// Fire-and-forget reboot request.
    pub const RESET: u8 = 0x86;
    /// Session bind request, broadcast on the control address.
    pub const BIND: u8 = 0x87;
    /// Beacon reply carrying a device inventory record.
    pub const DEVINFO: u8 = 0x88;
}

/// Positive acknowledgement code in reply frames.
pub const ACK: u8 = 0x01;

/// Broadcast address all fixtures listen on for channel data (3-byte mode).
pub const BROADCAST: Address = Address::from_id(0x00C0_DE42);

/// Control address: beacons and bind requests go out here.
pub const CONTROL: Address = Address::from_id(CONTROL_ID);

/// Broadcast address first-generation fixtures listen on (5-byte mode).
pub const LEGACY_BROADCAST: Address = Address::from_bytes([0x81, 0xF0, 0xF0, 0xF0, 0xF0]);

const CONTROL_ID: u32 = 0x00C0_DEC1;

/// Guard string carried by SET_DEVID so a stray frame cannot re-address a fixture.
pub const DEVID_TAG: &[u8; 6] = b"LABRAT";

/// Offset of the anti-duplicate nonce in a BIND frame.
const BIND_NONCE_OFFSET: usize = 16;

/// Radio pipe a session slot listens on.
pub fn session_pipe(slot: usize) -> u8 {
    slot as u8 + 2
}

/// Per-slot return address: the control address with its low byte swapped for the pipe number.
pub fn session_rx_id(slot: usize) -> u32 {
    CONTROL_ID & 0xFF_FF00 | (slot as u32 + 2)
}

/// The return address as an on-air [`Address`].
///
/// [`Address`]: ../../phy/struct.Address.html
pub fn session_rx_addr(slot: usize) -> Address {
    Address::from_id(session_rx_id(slot))
}

/// Builds a discovery beacon.
pub fn beacon() -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::BEACON;
    f
}

/// Builds a bind request for `target`, directing its replies to `reply_id`.
pub fn bind(target: DeviceId, reply_id: u32, nonce: u8) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::BIND;
    f[1..4].copy_from_slice(&target.to_le_bytes());
    LittleEndian::write_u24(&mut f[4..7], reply_id);
    f[BIND_NONCE_OFFSET] = nonce;
    f
}

/// Builds a SETUP frame preparing the flash page at `addr` (a word address).
pub fn setup(addr: u16) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::SETUP;
    LittleEndian::write_u16(&mut f[1..3], addr);
    f[3] = 0x01;
    f
}

/// Builds a WRITE frame carrying the first ≤31 bytes of `rec`.
pub fn write(rec: &Record) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::WRITE;
    let payload = rec.payload();
    let n = payload.len().min(PAYLOAD_LEN - 1);
    f[1..1 + n].copy_from_slice(&payload[..n]);
    f
}

/// Builds a COMMIT frame concluding `rec`.
pub fn commit(rec: &Record) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::COMMIT;
    f[1] = 0x01;
    f[2] = record_csum8(rec.payload());
    LittleEndian::write_u16(&mut f[3..5], tail_word(rec.payload()));
    f
}

/// Builds the whole-image AUDIT frame.
pub fn audit(start_addr: u16, size_words: u16, csum16: u16) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::AUDIT;
    LittleEndian::write_u16(&mut f[1..3], start_addr);
    LittleEndian::write_u16(&mut f[3..5], size_words);
    LittleEndian::write_u16(&mut f[5..7], csum16);
    f[7] = 0x01;
    f
}

/// Builds a fire-and-forget RESET frame.
pub fn reset() -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::RESET;
    f
}

/// Builds a SET_START frame. `channel` is already zero-based.
pub fn set_start(channel: u16) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::SET_START;
    LittleEndian::write_u16(&mut f[1..3], channel);
    f
}

/// Builds a SET_RFCHAN frame.
pub fn set_rf_channel(channel: u8) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::SET_RFCHAN;
    LittleEndian::write_u16(&mut f[1..3], u16::from(channel));
    f
}

/// Builds a SET_DEVID frame, tagged so fixtures can reject accidental writes.
pub fn set_devid(new_id: DeviceId) -> Frame {
    let mut f = [0; PAYLOAD_LEN];
    f[0] = opcode::SET_DEVID;
    f[1..4].copy_from_slice(&new_id.to_le_bytes());
    f[4..10].copy_from_slice(DEVID_TAG);
    f
}

/// The 8-bit record checksum carried by COMMIT: the negated byte sum of the payload.
pub fn record_csum8(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &b| sum.wrapping_sub(b))
}

/// The record's final 16-bit word, completing what WRITE could not carry.
pub fn tail_word(payload: &[u8]) -> u16 {
    match payload.len() {
        0 => 0,
        1 => u16::from(payload[0]),
        n => LittleEndian::read_u16(&payload[n - 2..]),
    }
}

/// Folds a record's payload into the running image checksum: the negated sum of all
/// little-endian words written.
pub fn fold_csum16(mut csum: u16, payload: &[u8]) -> u16 {
    let mut chunks = payload.chunks_exact(2);
    for word in &mut chunks {
        csum = csum.wrapping_sub(LittleEndian::read_u16(word));
    }
    if let [lone] = chunks.remainder() {
        csum = csum.wrapping_sub(u16::from(*lone));
    }
    csum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(addr: u16, payload: &[u8]) -> Record {
        use crate::hex::testutil::{image, MemFile};
        // Round payloads through the reader so tests use real records. The image builder takes
        // byte addresses; the reader halves them.
        let mut file = MemFile::new(&image(&[(addr << 1, payload)]));
        crate::hex::read_record(&mut file)
    }

    #[test]
    fn bind_layout() {
        let f = bind(DeviceId::new(0xAABBCC), session_rx_id(1), 0x5A);
        assert_eq!(f[0], 0x87);
        assert_eq!(&f[1..4], &[0xCC, 0xBB, 0xAA]);
        assert_eq!(&f[4..7], &[0x03, 0xDE, 0xC0]);
        assert_eq!(f[16], 0x5A);
    }

    #[test]
    fn session_addressing() {
        assert_eq!(session_pipe(0), 2);
        assert_eq!(session_pipe(3), 5);
        assert_eq!(session_rx_id(0), 0x00C0_DE02);
        assert_eq!(session_rx_addr(3).bytes(), &[0x05, 0xDE, 0xC0]);
    }

    #[test]
    fn setup_and_audit_layout() {
        let f = setup(0x0120);
        assert_eq!(&f[..4], &[0x80, 0x20, 0x01, 0x01]);

        let f = audit(0x0100, 24, 0xFEDC);
        assert_eq!(
            &f[..8],
            &[0x83, 0x00, 0x01, 24, 0x00, 0xDC, 0xFE, 0x01]
        );
    }

    #[test]
    fn write_carries_at_most_31_bytes() {
        let payload: Vec<u8> = (1u8..=32).collect();
        let rec = record(0x100, &payload);
        let f = write(&rec);
        assert_eq!(f[0], 0x81);
        assert_eq!(&f[1..32], &payload[..31]);
    }

    #[test]
    fn commit_concludes_the_record() {
        let rec = record(0x100, &[0x10, 0x20, 0x30, 0x40]);
        let f = commit(&rec);
        assert_eq!(f[0], 0x82);
        assert_eq!(f[1], 0x01);
        assert_eq!(f[2], 0u8.wrapping_sub(0xA0));
        assert_eq!(&f[3..5], &[0x30, 0x40]);
    }

    #[test]
    fn devid_frame_is_guarded() {
        let f = set_devid(DeviceId::new(0x112233));
        assert_eq!(f[0], 0x03);
        assert_eq!(&f[1..4], &[0x33, 0x22, 0x11]);
        assert_eq!(&f[4..10], b"LABRAT");
    }

    #[test]
    fn checksums() {
        assert_eq!(record_csum8(&[0x01, 0x02, 0x03]), 0u8.wrapping_sub(6));
        assert_eq!(tail_word(&[0xAA, 0xBB, 0xCC, 0xDD]), 0xDDCC);
        assert_eq!(tail_word(&[0x42]), 0x0042);

        // The image checksum is the negated word sum.
        let csum = fold_csum16(0, &[0x01, 0x00, 0x02, 0x00]);
        assert_eq!(csum, 0u16.wrapping_sub(3));
        let csum = fold_csum16(csum, &[0xFF, 0xFF]);
        assert_eq!(csum, 0u16.wrapping_sub(3).wrapping_sub(0xFFFF));
    }
}
