use keyberon::layout::Event;
use serde::{Deserialize, Serialize};

use super::sync::UserState;
use crate::ioqueue;

/// Messages used in communication between keyboard halves
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub enum Message {
    /// Raw key event transmitted from the slave half to the master
    #[serde(with = "EventDef")]
    Key(Event),
    /// User state update relayed from the master half to the slave
    State(UserState),
}

// Work around Event not implementing Serialize: https://serde.rs/remote-derive.html
#[derive(Serialize, Deserialize)]
#[serde(remote = "Event")]
enum EventDef {
    Press(u8, u8),
    Release(u8, u8),
}

impl ioqueue::Packet for Message {
    type Checksum = ioqueue::Crc16;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ioqueue::checksum::Crc16;
    use crate::ioqueue::packet::{Accumulator, Packet};
    use crate::keyboard::sync::UserState;
    use crate::layers::Layer;

    fn round_trip(msg: Message) {
        let mut crc = Crc16::new();
        let mut buf = [0; 32];
        let frame = msg.to_slice(&mut crc, &mut buf).unwrap();
        let frame = std::vec::Vec::from(&frame[..]);

        let mut acc = Accumulator::<32>::new();
        let (result, rest) = acc.feed::<Message>(&mut crc, &frame);
        assert_eq!(result, Some(Ok(msg)));
        assert!(rest.is_empty());
    }

    #[test]
    fn message_key_press_round_trip() {
        round_trip(Message::Key(Event::Press(2, 7)));
    }

    #[test]
    fn message_key_release_round_trip() {
        round_trip(Message::Key(Event::Release(3, 12)));
    }

    #[test]
    fn message_state_round_trip() {
        for layer in [Layer::Qwerty, Layer::Mac, Layer::MacWin] {
            round_trip(Message::State(UserState::new(layer)));
        }
    }
}
