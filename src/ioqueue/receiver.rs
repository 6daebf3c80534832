use heapless::Deque;

use super::packet::{Accumulator, MarkedPacket, Packet};
use super::{PacketId, ReceiveQueue};

/// Packet reception queue
///
/// The external link driver pushes raw data chunks in; complete frames
/// are verified, deduplicated and queued until the keyboard logic takes
/// them out. `N` is the packet queue depth, `B` the accumulator size and
/// must fit the largest frame.
pub struct Receiver<P: Packet, const N: usize, const B: usize> {
    queue: Deque<P, N>,
    acc: Accumulator<B>,
    checksum: P::Checksum,
    last_id: Option<PacketId>,
}

impl<P: Packet, const N: usize, const B: usize> Receiver<P, N, B> {
    /// Create new receiver
    pub fn new(checksum: P::Checksum) -> Self {
        Self {
            queue: Deque::new(),
            acc: Accumulator::new(),
            checksum,
            last_id: None,
        }
    }

    /// Process a chunk of data received from the link
    pub fn push(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let (result, rest) = self.acc.feed::<MarkedPacket<P>>(&mut self.checksum, data);
            data = rest;
            match result {
                None => (),
                Some(Ok(marked)) => {
                    // Ignore packets with the ID of the previous packet,
                    // assuming a retransmission.
                    if self.last_id == Some(marked.id) {
                        continue;
                    }
                    self.last_id = Some(marked.id);
                    if self.queue.push_back(marked.packet).is_err() {
                        crate::warn!("RX queue full, dropping packet");
                    }
                }
                Some(Err(_)) => crate::warn!("Dropping invalid frame"),
            }
        }
    }
}

impl<P: Packet, const N: usize, const B: usize> ReceiveQueue<P> for Receiver<P, N, B> {
    fn get(&mut self) -> Option<P> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use bbqueue::BBBuffer;

    use super::*;
    use crate::ioqueue::checksum::Crc16;
    use crate::ioqueue::packet::tests::Message;
    use crate::ioqueue::Transmitter;

    fn transfer<const N: usize>(
        cons: &mut bbqueue::Consumer<'_, N>,
        rx: &mut Receiver<Message, 8, 64>,
        chunk: usize,
    ) {
        while let Ok(grant) = cons.read() {
            let taken = grant.buf().len().min(chunk);
            rx.push(&grant.buf()[..taken]);
            grant.release(taken);
        }
    }

    #[test]
    fn round_trip_through_byte_queue() {
        let rb = BBBuffer::<128>::new();
        let (prod, mut cons) = rb.try_split().unwrap();
        let mut tx = Transmitter::<Message, 128, 64>::new(prod, Crc16::new());
        let mut rx = Receiver::<Message, 8, 64>::new(Crc16::new());

        let sent: std::vec::Vec<Message> = (0..3).map(Message::arbitrary).collect();
        for msg in &sent {
            assert!(tx.send(msg.clone()));
        }
        transfer(&mut cons, &mut rx, usize::MAX);

        for msg in &sent {
            assert_eq!(rx.get().as_ref(), Some(msg));
        }
        assert_eq!(rx.get(), None);
    }

    #[test]
    fn round_trip_with_small_link_chunks() {
        let rb = BBBuffer::<128>::new();
        let (prod, mut cons) = rb.try_split().unwrap();
        let mut tx = Transmitter::<Message, 128, 64>::new(prod, Crc16::new());
        let mut rx = Receiver::<Message, 8, 64>::new(Crc16::new());

        assert!(tx.send(Message::arbitrary(42)));
        // The link may deliver any chunking it likes
        transfer(&mut cons, &mut rx, 3);

        assert_eq!(rx.get(), Some(Message::arbitrary(42)));
        assert_eq!(rx.get(), None);
    }

    #[test]
    fn retransmissions_are_dropped() {
        let mut rx = Receiver::<Message, 8, 64>::new(Crc16::new());

        let mut crc = Crc16::new();
        let mut buf = [0; 64];
        let marked = MarkedPacket {
            id: 7,
            packet: Message::arbitrary(1),
        };
        let frame: &[u8] = marked.to_slice(&mut crc, &mut buf).unwrap();

        rx.push(frame);
        rx.push(frame);

        assert_eq!(rx.get(), Some(Message::arbitrary(1)));
        assert_eq!(rx.get(), None);
    }

    #[test]
    fn corrupt_frames_do_not_reach_the_queue() {
        let mut rx = Receiver::<Message, 8, 64>::new(Crc16::new());

        let mut crc = Crc16::new();
        let mut buf = [0; 64];
        let marked = MarkedPacket {
            id: 1,
            packet: Message::arbitrary(9),
        };
        let frame = marked.to_slice(&mut crc, &mut buf).unwrap();
        let mut corrupted = std::vec::Vec::from(&frame[..]);
        corrupted[2] ^= 0x40;

        rx.push(&corrupted);
        assert_eq!(rx.get(), None);
    }
}
