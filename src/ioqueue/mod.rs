//! Packet-based IO protocol between keyboard halves
//!
//! Implementation of packet transmission and reception queues on top of an
//! external serial-style link. The [`Packet`] trait marks a message type
//! as usable in the protocol; frames carry a packet ID and a checksum and
//! are COBS-delimited on the wire.
//!
//! The link itself is outside of this crate (UART/DMA on hardware, an
//! in-memory pipe in tests) and provides no timing guarantees. The
//! contract offered to users of [`TransmitQueue`]/[`ReceiveQueue`] is:
//! a pushed message is eventually delivered to the other half, messages
//! are never reordered within the stream, retransmitted duplicates are
//! discarded, and a receiver may lag an arbitrary number of messages
//! behind the transmitter. Consumers must treat stale data as ordinary.

/// Checksum generation for packet integrity
pub mod checksum;
/// Serialization/deserialization of packets with checksum
pub mod packet;
/// Packet reception queue
pub mod receiver;
/// Packet transmission queue
pub mod transmitter;

pub use checksum::Crc16;
pub use packet::Packet;
pub use receiver::Receiver;
pub use transmitter::Transmitter;

/// Sequence number used to detect retransmissions
pub type PacketId = u16;

/// Outgoing message queue of a keyboard half
pub trait TransmitQueue<M> {
    /// Queue a message for transmission to the other half
    fn push(&mut self, msg: M);
}

/// Incoming message queue of a keyboard half
pub trait ReceiveQueue<M> {
    /// Take the next message received from the other half, if any
    fn get(&mut self) -> Option<M>;
}
