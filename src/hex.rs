//! Intel-HEX record reader feeding the OTA flashing path.
//!
//! Firmware images arrive as ASCII Intel-HEX. Only type-0 (data) records carry payload; the
//! reader skips everything else. Record addresses are halved on the way out: the file addresses
//! bytes, while the target bootloader addresses 16-bit flash words.
//!
//! Fixture images are produced with short lines, so two consecutive data records are coalesced
//! into one returned [`Record`] when their combined payload still fits, which keeps the number of
//! radio round-trips per image down.
//!
//! [`Record`]: struct.Record.html

use core::fmt;

use crate::utils::HexSlice;

/// Largest payload a single returned record can carry.
pub const MAX_RECORD: usize = 32;

/// Longest line the end-of-line scan will swallow before giving up.
const MAX_LINE: usize = 80;

/// Byte-addressable read access to a firmware image.
///
/// Mirrors the small slice of a filesystem handle the OTA path needs: sequential reads plus
/// seeking, so a record can be re-read when a transmission has to be retried.
pub trait FirmwareFile {
    /// Returns the current read position in bytes from the start of the image.
    fn position(&mut self) -> u32;

    /// Moves the read position. Returns `false` when the offset is outside the image.
    fn seek(&mut self, offset: u32) -> bool;

    /// Reads up to `buf.len()` bytes, returning how many were actually read.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Returns `true` while more bytes can be read.
    fn available(&mut self) -> bool;
}

/// One decoded data record: a flash word address and up to 32 payload bytes.
#[derive(Copy, Clone)]
pub struct Record {
    addr: u16,
    len: u8,
    data: [u8; MAX_RECORD],
}

impl Record {
    /// Creates a record with no payload.
    pub const fn empty() -> Self {
        Record {
            addr: 0,
            len: 0,
            data: [0; MAX_RECORD],
        }
    }

    /// Returns `true` when the record carries no payload.
    ///
    /// Empty records double as the reader's failure value: end of image, a malformed line, or an
    /// I/O error all yield one.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The target flash word address of the first payload byte.
    pub fn addr(&self) -> u16 {
        self.addr
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    fn push(&mut self, byte: u8) {
        self.data[self.len as usize] = byte;
        self.len += 1;
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("addr", &self.addr)
            .field("payload", &HexSlice(self.payload()))
            .finish()
    }
}

/// Reads the next data record, coalescing a directly following short record when it fits.
///
/// Non-data lines are skipped. Returns an empty record at end of image or when the line under the
/// cursor cannot be decoded.
pub fn read_record<F: FirmwareFile>(file: &mut F) -> Record {
    let mut rec = Record::empty();
    let mut done = false;

    while !done {
        let line_start = file.position();
        match read_header(file) {
            Some((count, addr)) => {
                if rec.is_empty() {
                    if !read_payload(file, count, &mut rec) {
                        return Record::empty();
                    }
                    rec.addr = addr >> 1;
                } else if rec.len() + count as usize <= MAX_RECORD {
                    // Second line of the pair; keep the first line's address.
                    read_payload(file, count, &mut rec);
                    done = true;
                } else {
                    // Doesn't fit; rewind so the next call starts on this line.
                    file.seek(line_start);
                    return rec;
                }
            }
            None => done = !rec.is_empty(),
        }

        if scan_eol(file).is_none() {
            done = true;
        }
    }

    rec
}

/// Seeks to `offset`, then reads one record.
///
/// The OTA state machine stores the file offset of the record in flight and re-reads it through
/// this function on every retransmission.
pub fn read_record_at<F: FirmwareFile>(file: &mut F, offset: u32) -> Record {
    file.seek(offset);
    read_record(file)
}

/// Decodes the `:LLAAAATT` line prefix.
///
/// Returns the payload length and byte address for usable data lines, `None` for anything else
/// (other record types, empty lines, a bad marker, lengths over [`MAX_RECORD`], truncation).
fn read_header<F: FirmwareFile>(file: &mut F) -> Option<(u8, u16)> {
    if read_byte(file)? != b':' {
        return None;
    }
    let count = read_hex_byte(file)?;
    let addr = read_hex_word(file)?;
    let rtype = read_hex_byte(file)?;

    if rtype == 0 && count > 0 && count as usize <= MAX_RECORD {
        Some((count, addr))
    } else {
        trace!("hex: skipping type {} line at {:#x}", rtype, addr);
        None
    }
}

/// Appends `count` payload bytes to `rec` and consumes the line checksum.
///
/// The checksum byte is not verified; the OTA protocol carries its own per-record and whole-image
/// checksums.
fn read_payload<F: FirmwareFile>(file: &mut F, count: u8, rec: &mut Record) -> bool {
    for _ in 0..count {
        match read_hex_byte(file) {
            Some(byte) => rec.push(byte),
            None => return false,
        }
    }
    read_hex_byte(file).is_some()
}

/// Consumes input until just past the next newline, up to [`MAX_LINE`] bytes.
fn scan_eol<F: FirmwareFile>(file: &mut F) -> Option<usize> {
    for skipped in 0..MAX_LINE {
        match read_byte(file) {
            Some(b'\n') => return Some(skipped),
            Some(_) => {}
            None => return None,
        }
    }
    Some(MAX_LINE)
}

fn read_byte<F: FirmwareFile>(file: &mut F) -> Option<u8> {
    let mut buf = [0u8; 1];
    if file.read(&mut buf) == 1 {
        Some(buf[0])
    } else {
        None
    }
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

fn read_hex_byte<F: FirmwareFile>(file: &mut F) -> Option<u8> {
    let hi = hex_val(read_byte(file)?)?;
    let lo = hex_val(read_byte(file)?)?;
    Some(hi << 4 | lo)
}

/// Reads a 16-bit field, transmitted most significant pair first.
fn read_hex_word<F: FirmwareFile>(file: &mut F) -> Option<u16> {
    let hi = read_hex_byte(file)?;
    let lo = read_hex_byte(file)?;
    Some(u16::from(hi) << 8 | u16::from(lo))
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::FirmwareFile;
    use std::fmt::Write;
    use std::string::String;
    use std::vec::Vec;

    /// In-memory `FirmwareFile` used across the crate's tests.
    pub(crate) struct MemFile {
        data: Vec<u8>,
        pos: usize,
    }

    impl MemFile {
        pub(crate) fn new(text: &str) -> Self {
            MemFile {
                data: text.as_bytes().to_vec(),
                pos: 0,
            }
        }
    }

    impl FirmwareFile for MemFile {
        fn position(&mut self) -> u32 {
            self.pos as u32
        }

        fn seek(&mut self, offset: u32) -> bool {
            if offset as usize <= self.data.len() {
                self.pos = offset as usize;
                true
            } else {
                false
            }
        }

        fn read(&mut self, buf: &mut [u8]) -> usize {
            let left = self.data.len() - self.pos;
            let n = buf.len().min(left);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            n
        }

        fn available(&mut self) -> bool {
            self.pos < self.data.len()
        }
    }

    /// Renders one Intel-HEX line with a correct checksum.
    pub(crate) fn hex_line(addr: u16, rtype: u8, data: &[u8]) -> String {
        let mut sum = data.len() as u8;
        sum = sum
            .wrapping_add((addr >> 8) as u8)
            .wrapping_add(addr as u8)
            .wrapping_add(rtype);
        let mut line = String::new();
        write!(line, ":{:02X}{:04X}{:02X}", data.len(), addr, rtype).unwrap();
        for b in data {
            write!(line, "{:02X}", b).unwrap();
            sum = sum.wrapping_add(*b);
        }
        write!(line, "{:02X}\n", sum.wrapping_neg()).unwrap();
        line
    }

    /// A minimal image: `records` data lines followed by an end-of-file record.
    pub(crate) fn image(records: &[(u16, &[u8])]) -> String {
        let mut text = String::new();
        for (addr, data) in records {
            text.push_str(&hex_line(*addr, 0, data));
        }
        text.push_str(&hex_line(0, 1, &[]));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{hex_line, image, MemFile};
    use super::*;

    #[test]
    fn reads_a_single_record_with_halved_address() {
        let mut file = MemFile::new(&image(&[(0x0200, &[0xAA, 0xBB, 0xCC, 0xDD])]));
        let rec = read_record(&mut file);
        assert_eq!(rec.addr(), 0x0100);
        assert_eq!(rec.payload(), &[0xAA, 0xBB, 0xCC, 0xDD]);

        assert!(read_record(&mut file).is_empty());
    }

    #[test]
    fn coalesces_two_short_records() {
        let first: Vec<u8> = (0u8..16).collect();
        let second: Vec<u8> = (16u8..32).collect();
        let mut file = MemFile::new(&image(&[(0x0200, &first), (0x0210, &second)]));

        let rec = read_record(&mut file);
        assert_eq!(rec.addr(), 0x0100);
        assert_eq!(rec.len(), 32);
        assert_eq!(rec.payload()[15], 15);
        assert_eq!(rec.payload()[16], 16);
    }

    #[test]
    fn leaves_a_record_that_does_not_fit_for_the_next_call() {
        let big: Vec<u8> = (0u8..32).collect();
        let tail = [0xEEu8; 16];
        let mut file = MemFile::new(&image(&[(0x0200, &big), (0x0240, &tail)]));

        let rec = read_record(&mut file);
        assert_eq!(rec.len(), 32);
        assert_eq!(rec.addr(), 0x0100);

        let rec = read_record(&mut file);
        assert_eq!(rec.len(), 16);
        assert_eq!(rec.addr(), 0x0120);
    }

    #[test]
    fn skips_non_data_records() {
        let mut text = hex_line(0x0000, 4, &[0x00, 0x00]);
        text.push_str(&image(&[(0x0100, &[0x12, 0x34])]));
        let mut file = MemFile::new(&text);

        let rec = read_record(&mut file);
        assert_eq!(rec.addr(), 0x0080);
        assert_eq!(rec.payload(), &[0x12, 0x34]);
    }

    #[test]
    fn recovers_from_junk_before_a_record() {
        let mut text = String::from("# not hex at all\n");
        text.push_str(&image(&[(0x0010, &[0x42])]));
        let mut file = MemFile::new(&text);

        let rec = read_record(&mut file);
        assert_eq!(rec.payload(), &[0x42]);
    }

    #[test]
    fn truncated_payload_yields_empty() {
        let mut file = MemFile::new(":04020000AABB");
        assert!(read_record(&mut file).is_empty());
    }

    #[test]
    fn empty_input_yields_empty() {
        let mut file = MemFile::new("");
        assert!(read_record(&mut file).is_empty());
    }

    #[test]
    fn read_record_at_rewinds() {
        let img = image(&[(0x0200, &[0x01, 0x02]), (0x0204, &[0x03, 0x04])]);
        let mut file = MemFile::new(&img);

        let first = read_record(&mut file);
        let second_offset = file.position();
        let second = read_record(&mut file);
        assert_eq!(second.payload(), &[0x03, 0x04]);

        let again = read_record_at(&mut file, 0);
        assert_eq!(again.payload(), first.payload());
        let again = read_record_at(&mut file, second_offset);
        assert_eq!(again.payload(), second.payload());
    }
}
