//! Cross-half synchronization of user state
//!
//! The master half owns the authoritative [`UserState`] and pushes a copy
//! into its [`UserBuffer`] whenever the state changes. The serial link
//! (external to this crate) carries the update to the other half, where
//! the message handler stores it into the slave's mirror buffer. The
//! slave only ever reads its mirror, once per render tick.
//!
//! The link is much slower than the keyboard tick, so a read is only
//! guaranteed to observe *some* previously completed write, not the most
//! recent one. Readers must treat stale values as ordinary behavior; the
//! zero-initialized buffer decodes to the default state so a half that
//! never received an update renders a defined default.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::layers::Layer;

/// Capacity in bytes of [`UserBuffer`]
///
/// This is the only wire-format contract between the halves: every write
/// and read transfers exactly this many bytes and both halves must be
/// built with the same value.
pub const USER_BUFFER_SIZE: usize = 1;

/// User state owned by the master half and mirrored on the slave
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserState {
    /// Highest-priority active keymap layer
    pub layer: Layer,
}

impl UserState {
    /// Number of buffer bytes used by the encoded state
    pub const ENCODED_SIZE: usize = 1;

    pub const fn new(layer: Layer) -> Self {
        Self { layer }
    }

    /// Encode into a full-capacity frame, zero-padding unused bytes
    pub fn encode(&self) -> [u8; USER_BUFFER_SIZE] {
        let mut frame = [0; USER_BUFFER_SIZE];
        frame[0] = self.layer.id();
        frame
    }

    /// Decode from a full-capacity frame
    ///
    /// Unknown layer identifiers decode to the default state: a half fed
    /// garbage (or nothing at all) falls back to rendering the base layer
    /// instead of failing.
    pub fn decode(frame: &[u8; USER_BUFFER_SIZE]) -> Self {
        match Layer::from_id(frame[0]) {
            Some(layer) => Self { layer },
            None => Self::default(),
        }
    }
}

// Both halves compile this very module, so checking that the encoded state
// fits the buffer is enough to keep the wire contract consistent.
const_assert!(USER_BUFFER_SIZE > 0);
const_assert!(UserState::ENCODED_SIZE <= USER_BUFFER_SIZE);

/// Fixed-size cell holding the last user state handed over between halves
///
/// A single mutable cell with overwrite semantics: allocated once per
/// firmware lifetime, zero-initialized, each update replaces the whole
/// contents. Exactly one writer exists per buffer by construction (the
/// master for its own buffer, the transport delivery path for the slave's
/// mirror), and reads never block or fail.
pub struct UserBuffer {
    buf: [u8; USER_BUFFER_SIZE],
}

impl UserBuffer {
    /// Create a zero-initialized buffer (the contents before any write)
    pub const fn new() -> Self {
        Self {
            buf: [0; USER_BUFFER_SIZE],
        }
    }

    /// Overwrite the whole buffer with a new frame
    ///
    /// All bytes are replaced in one go, so a subsequent read can never
    /// observe a mix of two frames.
    pub fn write(&mut self, frame: &[u8; USER_BUFFER_SIZE]) {
        self.buf.copy_from_slice(frame);
    }

    /// Copy out the current buffer contents
    pub fn read(&self) -> [u8; USER_BUFFER_SIZE] {
        self.buf
    }
}

impl Default for UserBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// User-state synchronization capability of a keyboard half
///
/// Resolved at construction time instead of conditional compilation: a
/// keyboard built without the capability behaves as if the buffer
/// permanently held the zero value, and writes have no effect anywhere.
pub enum StateSync {
    Enabled(UserBuffer),
    Disabled,
}

impl StateSync {
    pub fn new(enabled: bool) -> Self {
        match enabled {
            true => Self::Enabled(UserBuffer::new()),
            false => Self::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    /// Store a new state, overwriting the previous one
    pub fn write(&mut self, state: &UserState) {
        match self {
            Self::Enabled(buf) => buf.write(&state.encode()),
            Self::Disabled => (),
        }
    }

    /// Load the most recently stored state
    ///
    /// Never blocks and never fails; without the capability (or before the
    /// first write) this is the default state.
    pub fn read(&self) -> UserState {
        match self {
            Self::Enabled(buf) => UserState::decode(&buf.read()),
            Self::Disabled => UserState::default(),
        }
    }
}
