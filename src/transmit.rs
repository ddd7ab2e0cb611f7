//! Single-slot outbound frame engine: sequencing, retransmission, and ACK
//! matching.
//!
//! Only one frame may be in flight at a time. `send` populates the slot
//! and performs the first emit; the host's timer drives every
//! subsequent retry through [`TransmitEngine::on_retransmit_timer`] until
//! either an ACK arrives or the retry budget is spent.

use crate::frame::{encode_frame, Flags, MAX_PAYLOAD_LEN};
use crate::link::LinkHooks;

/// Retries attempted before a send is abandoned.
pub const MAX_RETRANSMISSIONS: u8 = 3;
/// Delay between retransmissions, in milliseconds.
pub const RETRANSMISSION_DELAY_MS: u32 = 50;

struct Slot {
    seq: u16,
    flags: Flags,
    payload: [u8; MAX_PAYLOAD_LEN],
    payload_len: u8,
    attempts: u8,
    ack_required: bool,
}

/// The outbound half of the link: one pending frame at a time, retried
/// on a host-driven timer until acknowledged or exhausted.
pub struct TransmitEngine {
    slot: Option<Slot>,
    send_counter: u16,
}

impl TransmitEngine {
    pub fn new() -> Self {
        Self {
            slot: None,
            send_counter: 0,
        }
    }

    pub fn send_counter(&self) -> u16 {
        self.send_counter
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    /// Enqueues `payload` for transmission. Returns `0` if the slot is
    /// already occupied (caller must retry later), otherwise the
    /// assigned sequence number, which is always non-zero.
    pub fn send(
        &mut self,
        payload: &[u8],
        ack_required: bool,
        hooks: &mut impl LinkHooks,
    ) -> u16 {
        if self.slot.is_some() {
            return 0;
        }
        debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);

        self.send_counter = self.send_counter.wrapping_add(1);
        let wrapped = self.send_counter == 0;
        if wrapped {
            self.send_counter = 1;
        }

        let mut flags = Flags::DATA;
        if self.send_counter == 1 {
            flags |= Flags::SEQ_RESET;
        }

        let mut buf = [0u8; MAX_PAYLOAD_LEN];
        buf[..payload.len()].copy_from_slice(payload);

        self.slot = Some(Slot {
            seq: self.send_counter,
            flags,
            payload: buf,
            payload_len: payload.len() as u8,
            attempts: 0,
            ack_required,
        });

        self.emit(hooks);
        self.send_counter
    }

    /// Called by the host when the retransmission timer elapses.
    pub fn on_retransmit_timer(&mut self, hooks: &mut impl LinkHooks) {
        self.emit(hooks);
    }

    fn emit(&mut self, hooks: &mut impl LinkHooks) {
        let slot = match self.slot.as_mut() {
            Some(slot) => slot,
            None => return,
        };

        if slot.attempts >= MAX_RETRANSMISSIONS {
            let seq = slot.seq;
            let ack_required = slot.ack_required;
            self.slot = None;
            log::warn!("retransmission exhausted for seq {}", seq);
            if ack_required {
                hooks.data_ack(seq, false);
            }
            return;
        }

        let seq = slot.seq;
        let flags = slot.flags;
        let len = slot.payload_len as usize;
        let payload = &slot.payload[..len];
        encode_frame(seq, flags, payload, |chunk| hooks.data_write(chunk));

        let slot = self.slot.as_mut().expect("slot populated above");
        slot.attempts += 1;
        // Always rearm while the slot is occupied, even on the attempt
        // that reaches MAX_RETRANSMISSIONS: the host timer is single-shot,
        // so this fire is what drives the next `emit` call that finds
        // `attempts >= MAX_RETRANSMISSIONS` and takes the exhaustion branch.
        hooks.set_delay(RETRANSMISSION_DELAY_MS);
    }

    /// Routes a decoded ACK frame's acknowledged sequence to the slot.
    /// Ignored if the slot is empty or the sequence doesn't match the
    /// slot's (a stale or cross-talk ACK).
    pub fn on_ack(&mut self, acked_seq: u16, hooks: &mut impl LinkHooks) {
        let is_match = matches!(&self.slot, Some(slot) if slot.seq == acked_seq);
        if !is_match {
            return;
        }
        let slot = self.slot.take().expect("checked above");
        hooks.cancel_delay();
        hooks.data_ack(slot.seq, true);
    }
}

impl Default for TransmitEngine {
    fn default() -> Self {
        Self::new()
    }
}
