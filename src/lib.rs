//! `whisper-link` — a small reliable framing protocol for byte-oriented
//! transports such as a serial line between embedded devices.
//!
//! The crate covers only the data link layer: a byte-driven receive
//! state machine that locates, validates and delivers frames; a
//! single-slot transmit engine with sequence numbering, CRC and
//! timer-driven retransmission; and the bounded buffering primitive
//! that feeds them. The application layer, the physical transport and
//! the timing source are external collaborators, reached only through
//! the [`LinkHooks`] trait.
//!
//! No dynamic allocation happens on the hot path: the receive buffer is
//! a fixed-size array sized by a const generic, and the transmit slot
//! holds at most one in-flight frame.
//!
//! ```
//! use whisper_link::{Link, LinkHooks};
//!
//! #[derive(Default)]
//! struct Loopback { received: Vec<Vec<u8>> }
//!
//! impl LinkHooks for Loopback {
//!     fn data_write(&mut self, _bytes: &[u8]) {}
//!     fn packet_received(&mut self, payload: &[u8]) {
//!         self.received.push(payload.to_vec());
//!     }
//!     fn set_delay(&mut self, _millis: u32) {}
//!     fn cancel_delay(&mut self) {}
//! }
//!
//! let mut link = Link::<Loopback, 64>::new(Loopback::default()).unwrap();
//! link.send(b"hello", false);
//! ```

mod array_buffer;
mod crc;
mod error;
mod frame;
mod link;
mod receive;
mod transmit;

pub use array_buffer::ArrayBuffer;
pub use crc::crc16;
pub use error::LinkError;
pub use frame::{encode_frame, Flags, FrameView, FRAME_OVERHEAD, MAX_PAYLOAD_LEN, PREFIX};
pub use link::{Link, LinkHooks};
pub use receive::{ReceiveState, ReceiveStatus};
pub use transmit::{MAX_RETRANSMISSIONS, RETRANSMISSION_DELAY_MS};
