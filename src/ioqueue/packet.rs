use postcard::ser_flavors::{Cobs, Slice};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::checksum::{ChecksumEncoder, ChecksumGen};
use super::PacketId;

/// Message type used as a checksummed packet of the protocol
///
/// On the wire each packet is serialized with postcard, protected by the
/// checksum of [`Self::Checksum`] and COBS-encoded, so that the receiver
/// can re-synchronize on frame (sentinel) boundaries after data loss.
pub trait Packet: Serialize + DeserializeOwned {
    /// Checksum generator used to protect the data packets
    type Checksum: ChecksumGen;

    /// Serialize as a single frame into `buf`, returning the frame bytes
    fn to_slice<'a>(
        &self,
        checksum: &mut Self::Checksum,
        buf: &'a mut [u8],
    ) -> postcard::Result<&'a mut [u8]> {
        postcard::serialize_with_flavor(
            self,
            ChecksumEncoder::new(Cobs::try_new(Slice::new(buf))?, checksum),
        )
    }
}

/// Packet with an ID that allows the receiver to detect retransmissions
#[derive(Serialize, Deserialize)]
pub struct MarkedPacket<P> {
    pub id: PacketId,
    pub packet: P,
}

impl<P: Packet> Packet for MarkedPacket<P> {
    type Checksum = P::Checksum;
}

/// Error while decoding a frame
#[derive(Debug, PartialEq, Eq)]
pub enum DeserError {
    /// No sentinel found and data too long to fit in the internal buffer
    Overflow,
    /// Found a sentinel but COBS decoding of the frame failed
    Cobs,
    /// COBS decoding succeeded but checksum verification failed
    Checksum,
    /// Checksum was correct but the data did not deserialize to a message
    Deser,
}

/// Frame accumulator decoding packets from a stream of data chunks
///
/// The link driver hands over data in arbitrary chunks; the accumulator
/// gathers them until a frame sentinel shows up, then decodes and verifies
/// the frame. Anything that fails to decode is dropped and decoding
/// resumes at the next sentinel.
pub struct Accumulator<const N: usize> {
    buf: [u8; N],
    head: usize,
}

impl<const N: usize> Accumulator<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
        }
    }

    /// Feed a chunk of data, decoding at most one packet
    ///
    /// Returns the decoding result (`None` when all data was consumed
    /// without completing a frame) and the part of `data` that was not
    /// consumed yet. Call repeatedly until the remainder is empty.
    pub fn feed<'d, P: Packet>(
        &mut self,
        checksum: &mut P::Checksum,
        data: &'d [u8],
    ) -> (Option<Result<P, DeserError>>, &'d [u8]) {
        if data.is_empty() {
            return (None, data);
        }

        let sentinel = match data.iter().position(|&b| b == 0) {
            Some(n) => n,
            None => {
                // No full frame yet, keep accumulating if it fits
                if self.head + data.len() <= N {
                    self.extend(data);
                    return (None, &[]);
                }
                self.head = 0;
                return (Some(Err(DeserError::Overflow)), &[]);
            }
        };

        // Take the frame including its sentinel
        let (frame, rest) = data.split_at(sentinel + 1);
        if self.head + frame.len() > N {
            self.head = 0;
            return (Some(Err(DeserError::Overflow)), rest);
        }
        self.extend(frame);

        // Whatever the decoding result, accumulated data is consumed now
        let head = self.head;
        self.head = 0;

        let size = match cobs::decode_in_place(&mut self.buf[..head]) {
            Ok(size) => size,
            Err(_) => return (Some(Err(DeserError::Cobs)), rest),
        };

        let payload = match checksum.verify(&self.buf[..size]) {
            Ok(payload) => payload,
            Err(_) => return (Some(Err(DeserError::Checksum)), rest),
        };

        match postcard::take_from_bytes(payload) {
            Ok((packet, _)) => (Some(Ok(packet)), rest),
            Err(_) => (Some(Err(DeserError::Deser)), rest),
        }
    }

    fn extend(&mut self, data: &[u8]) {
        let new_head = self.head + data.len();
        self.buf[self.head..new_head].copy_from_slice(data);
        self.head = new_head;
    }
}
