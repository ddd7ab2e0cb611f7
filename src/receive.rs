//! Byte-driven receive state machine.
//!
//! Bytes arrive in arbitrary chunks through [`Receiver::feed`] and are
//! staged in a fixed-capacity [`ArrayBuffer`]. [`Receiver::poll`] then
//! drives the PREFIX → HEADER → PAYLOAD → CHECKSUM loop until either a
//! complete frame has been dispatched or the buffer holds too little to
//! make further progress, resynchronising on any structural mismatch by
//! dropping exactly one byte from the head and starting over at PREFIX.

use crate::array_buffer::ArrayBuffer;
use crate::crc::crc16;
use crate::frame::{Flags, PREFIX};

/// Where the receive state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    Prefix,
    Header,
    Payload,
    Checksum,
}

/// Outcome of a full [`Receiver::poll`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveStatus {
    /// The buffer was drained of everything it can currently resolve.
    Ok,
    /// The state machine observed a value outside its known states.
    ///
    /// Unreachable in safe Rust — `ReceiveState` is an exhaustively
    /// matched enum, so there is no representable "corrupted" variant.
    /// Kept so callers can handle it the way the original driver's
    /// contract requires, and so a future unsafe optimisation has
    /// somewhere to report into.
    Fatal,
}

/// A single frame handed up from the receive state machine.
///
/// Payload slices borrow directly from the receive buffer and are valid
/// only for the duration of the call to the closure passed to
/// [`Receiver::poll`].
#[derive(Debug)]
pub enum Frame<'a> {
    Data {
        seq: u16,
        /// True if `seq` was already seen and this is a retransmitted
        /// duplicate — the caller must still ACK it, but must not
        /// deliver it upward again.
        duplicate: bool,
        payload: &'a [u8],
    },
    Ack {
        acked_seq: u16,
    },
}

#[derive(Debug, Clone, Copy)]
struct HeaderInfo {
    seq: u16,
    flags: Flags,
    len: u8,
}

/// Owns the receive buffer and the parsing state machine over it.
pub struct Receiver<const N: usize> {
    buffer: ArrayBuffer<N>,
    state: ReceiveState,
    header: Option<HeaderInfo>,
    receive_counter: u16,
}

impl<const N: usize> Receiver<N> {
    pub fn new() -> Self {
        Self {
            buffer: ArrayBuffer::new(),
            state: ReceiveState::Prefix,
            header: None,
            receive_counter: 0,
        }
    }

    pub fn state(&self) -> ReceiveState {
        self.state
    }

    pub fn receive_counter(&self) -> u16 {
        self.receive_counter
    }

    /// Stages inbound bytes in the receive buffer. Bytes beyond the
    /// remaining capacity are silently dropped; flow control above the
    /// push boundary is the caller's responsibility.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        self.buffer.push(bytes)
    }

    /// Drives the state machine as far as the buffered bytes allow,
    /// calling `on_frame` once per delivered frame (DATA or ACK).
    ///
    /// Returns once no further progress is possible, i.e. the buffer
    /// holds too little to resolve the current state.
    pub fn poll(&mut self, mut on_frame: impl FnMut(Frame<'_>)) -> ReceiveStatus {
        loop {
            match self.state {
                ReceiveState::Prefix => {
                    if self.buffer.size() < 2 {
                        return ReceiveStatus::Ok;
                    }
                    if self.buffer.at(0) == PREFIX[0] && self.buffer.at(1) == PREFIX[1] {
                        self.state = ReceiveState::Header;
                    } else {
                        self.buffer.pop(1);
                    }
                }
                ReceiveState::Header => {
                    if self.buffer.size() < 6 {
                        return ReceiveStatus::Ok;
                    }
                    let seq = u16::from_le_bytes([self.buffer.at(2), self.buffer.at(3)]);
                    let flags = Flags::from_bits_truncate(self.buffer.at(4));
                    let len = self.buffer.at(5);
                    let max_len = N.saturating_sub(8);
                    let ack_len_ok = !flags.is_ack() || len == 2;
                    if !flags.is_valid() || len as usize > max_len || !ack_len_ok {
                        log::debug!("resync: invalid header (flags={:#04x}, len={})", flags.bits(), len);
                        self.buffer.pop(1);
                        self.state = ReceiveState::Prefix;
                        continue;
                    }
                    self.header = Some(HeaderInfo { seq, flags, len });
                    self.state = ReceiveState::Payload;
                }
                ReceiveState::Payload => {
                    let len = self.header.expect("header set before Payload state").len as usize;
                    if self.buffer.size() < 6 + len {
                        return ReceiveStatus::Ok;
                    }
                    self.state = ReceiveState::Checksum;
                }
                ReceiveState::Checksum => {
                    let len = self.header.expect("header set before Checksum state").len as usize;
                    if self.buffer.size() < 8 + len {
                        return ReceiveStatus::Ok;
                    }

                    let computed = crc16(&self.buffer.as_slice()[..6 + len]);
                    let trailer =
                        u16::from_le_bytes([self.buffer.at(6 + len), self.buffer.at(7 + len)]);

                    if computed != trailer {
                        log::debug!("resync: CRC mismatch");
                        self.header = None;
                        self.buffer.pop(1);
                        self.state = ReceiveState::Prefix;
                        continue;
                    }

                    let info = self.header.take().expect("checked above");

                    if info.flags.is_ack() {
                        if info.flags.is_seq_reset() {
                            self.receive_counter = info.seq;
                        }
                        let payload = &self.buffer.as_slice()[6..6 + len];
                        let acked_seq = u16::from_le_bytes([payload[0], payload[1]]);
                        on_frame(Frame::Ack { acked_seq });
                    } else {
                        // A SEQ_RESET frame always adopts its sequence and is
                        // never a duplicate; otherwise a sequence no newer
                        // than the last delivered one is a retransmission.
                        let duplicate = if info.flags.is_seq_reset() {
                            self.receive_counter = info.seq;
                            false
                        } else {
                            let is_dup = info.seq <= self.receive_counter;
                            if !is_dup {
                                self.receive_counter = info.seq;
                            }
                            is_dup
                        };
                        let payload = &self.buffer.as_slice()[6..6 + len];
                        on_frame(Frame::Data {
                            seq: info.seq,
                            duplicate,
                            payload,
                        });
                    }

                    self.buffer.pop(8 + len);
                    self.state = ReceiveState::Prefix;
                }
            }
        }
    }
}

impl<const N: usize> Default for Receiver<N> {
    fn default() -> Self {
        Self::new()
    }
}
