//! On-wire frame layout and codec.
//!
//! ```text
//! | prefix (2) | seq (2, LE) | flags (1) | len (1) | payload (len) | crc (2, LE) |
//! ```
//!
//! Encoding streams the frame out as four regions (prefix, header,
//! payload, checksum) via a caller-supplied write closure rather than
//! building the whole frame in a buffer first, so a transport write
//! callback can stream each region straight through without an extra
//! copy. Decoding is a read-only view over bytes already resident in
//! the receive buffer; nothing is copied.

use crate::crc::Crc16;

/// Literal bytes that mark the start of every frame.
pub const PREFIX: [u8; 2] = [0x0A, 0x0D];

/// Bytes in the prefix.
pub const LEN_PREFIX: usize = PREFIX.len();
/// Bytes in the header (sequence + flags + length), not counting the prefix.
pub const LEN_HEADER: usize = 4;
/// Bytes in the trailing checksum.
pub const LEN_CHECKSUM: usize = 2;
/// Total framing overhead around the payload.
pub const FRAME_OVERHEAD: usize = LEN_PREFIX + LEN_HEADER + LEN_CHECKSUM;
/// Largest payload length the wire format can express.
pub const MAX_PAYLOAD_LEN: usize = 253;

bitflags::bitflags! {
    /// The flags byte of a frame header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const ACK = 0b001;
        const DATA = 0b010;
        const SEQ_RESET = 0b100;
    }
}

impl Flags {
    /// A flags byte is well-formed iff exactly one of ACK/DATA is set;
    /// SEQ_RESET may accompany either.
    pub fn is_valid(self) -> bool {
        matches!(
            self & (Flags::ACK | Flags::DATA),
            Flags::ACK | Flags::DATA
        )
    }

    pub fn is_ack(self) -> bool {
        self.contains(Flags::ACK)
    }

    pub fn is_data(self) -> bool {
        self.contains(Flags::DATA)
    }

    pub fn is_seq_reset(self) -> bool {
        self.contains(Flags::SEQ_RESET)
    }
}

/// A read-only view over a complete frame already resident in a byte
/// slice, as produced by the receive state machine once prefix, header,
/// payload and checksum are all present.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub seq: u16,
    pub flags: Flags,
    pub payload: &'a [u8],
    pub checksum: u16,
}

impl<'a> FrameView<'a> {
    /// Parses a header + payload (everything but the prefix and trailing
    /// checksum) out of `body`, which must be exactly `4 + payload_len`
    /// bytes: seq(2) + flags(1) + len(1) + payload.
    pub fn from_header_and_payload(body: &'a [u8], checksum: u16) -> Self {
        let seq = u16::from_le_bytes([body[0], body[1]]);
        let flags = Flags::from_bits_truncate(body[2]);
        let len = body[3] as usize;
        FrameView {
            seq,
            flags,
            payload: &body[4..4 + len],
            checksum,
        }
    }
}

/// Streams an encoded frame out through `write`, calling it once per
/// region (prefix, header, payload if non-empty, checksum).
pub fn encode_frame(seq: u16, flags: Flags, payload: &[u8], mut write: impl FnMut(&[u8])) {
    debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);

    let mut crc = Crc16::new();

    write(&PREFIX);
    crc.update(&PREFIX);

    let header = [
        (seq & 0xFF) as u8,
        (seq >> 8) as u8,
        flags.bits(),
        payload.len() as u8,
    ];
    write(&header);
    crc.update(&header);

    if !payload.is_empty() {
        write(payload);
        crc.update(payload);
    }

    let checksum = crc.finish().to_le_bytes();
    write(&checksum);
}
