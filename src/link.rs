//! Top-level link controller: wires the receive state machine to the
//! transmit engine and exposes the handful of entry points a host calls.

use crate::error::LinkError;
use crate::frame::{encode_frame, Flags, FRAME_OVERHEAD};
use crate::receive::{Frame, ReceiveState, ReceiveStatus, Receiver};
use crate::transmit::TransmitEngine;

/// Capabilities a host must supply for a [`Link`] to operate.
///
/// `data_ack` defaults to a no-op so hosts that don't care about
/// terminal ACK/NACK notifications don't need to implement it.
pub trait LinkHooks {
    /// Synchronous best-effort byte sink. Must not re-enter the link.
    fn data_write(&mut self, bytes: &[u8]);
    /// Called exactly once per accepted DATA frame; duplicates are
    /// suppressed before this is reached.
    fn packet_received(&mut self, payload: &[u8]);
    /// Terminal notification for a `send`: `sent` is `true` on ACK match,
    /// `false` on retry exhaustion.
    fn data_ack(&mut self, seq: u16, sent: bool) {
        let _ = (seq, sent);
    }
    /// Schedules a call to [`Link::on_retransmit_timer`] in `millis`
    /// milliseconds, replacing any prior pending schedule from this link.
    fn set_delay(&mut self, millis: u32);
    /// Cancels any pending scheduled callback. No-op if none is pending.
    fn cancel_delay(&mut self);
}

/// A reliable framing link over a byte transport.
///
/// `N` is the receive buffer's capacity in bytes; it bounds the largest
/// frame (`N - 8` bytes of payload) the link can receive.
pub struct Link<H: LinkHooks, const N: usize> {
    receiver: Receiver<N>,
    transmit: TransmitEngine,
    hooks: H,
}

impl<H: LinkHooks, const N: usize> Link<H, N> {
    /// Builds a link with its own `N`-byte receive buffer.
    ///
    /// Fails if `N` is too small to ever hold a zero-payload frame
    /// (prefix + header + checksum, [`FRAME_OVERHEAD`] bytes).
    pub fn new(hooks: H) -> Result<Self, LinkError> {
        if N < FRAME_OVERHEAD {
            return Err(LinkError::BufferTooSmall {
                capacity: N,
                minimum: FRAME_OVERHEAD,
            });
        }
        Ok(Self {
            receiver: Receiver::new(),
            transmit: TransmitEngine::new(),
            hooks,
        })
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn receive_state(&self) -> ReceiveState {
        self.receiver.state()
    }

    /// Feeds inbound bytes into the receive state machine, delivering
    /// every complete frame they resolve before returning.
    pub fn data_received(&mut self, bytes: &[u8]) -> ReceiveStatus {
        self.receiver.feed(bytes);

        let Link {
            receiver,
            transmit,
            hooks,
        } = self;

        receiver.poll(|frame| match frame {
            Frame::Ack { acked_seq } => {
                log::trace!("ack received for seq {}", acked_seq);
                transmit.on_ack(acked_seq, hooks);
            }
            Frame::Data {
                seq,
                duplicate,
                payload,
            } => {
                if duplicate {
                    log::debug!("duplicate data frame seq {}, suppressing redelivery", seq);
                } else {
                    hooks.packet_received(payload);
                }

                let ack_payload = seq.to_le_bytes();
                encode_frame(transmit.send_counter(), Flags::ACK, &ack_payload, |chunk| {
                    hooks.data_write(chunk)
                });
            }
        })
    }

    /// Enqueues `payload` for transmission. See [`TransmitEngine::send`].
    pub fn send(&mut self, payload: &[u8], ack_required: bool) -> u16 {
        self.transmit.send(payload, ack_required, &mut self.hooks)
    }

    /// Must be called by the host when the scheduled retransmission
    /// delay elapses.
    pub fn on_retransmit_timer(&mut self) {
        self.transmit.on_retransmit_timer(&mut self.hooks);
    }
}
