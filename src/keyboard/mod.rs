//! Main keyboard logic
//!
//! Implementation of split-keyboard logic based on the [`keyberon`] crate.
//! One [`Keyboard`] instance runs on each half with a role fixed at boot:
//! the master resolves key events against the keymap and owns the user
//! state, the slave forwards its key events over the serial link and
//! renders feedback from the state the master relays back.

/// Special keyboard actions
pub mod actions;
/// Rotary encoder key functions
pub mod encoder;
/// Keyboard lightning control and configuration
pub mod leds;
/// Messages sent between keyboard halves
mod msg;
/// OLED screen contents
pub mod oled;
/// Role of a keyboard half
mod role;
/// Cross-half synchronization of user state
pub mod sync;

use keyberon::key_code::KeyCode;
use keyberon::layout::{CustomEvent, Event};

use crate::ioqueue::{ReceiveQueue, TransmitQueue};
use crate::layers::{self, Layer};

pub use actions::Action;
pub use leds::{KeyboardState, Underglow};
pub use msg::Message;
pub use role::Role;
pub use sync::{StateSync, UserState};

use actions::{LedAction, MouseMovement};

/// Keyboard configuration
pub struct KeyboardConfig {
    /// Keyboard layers configuration
    pub layers: &'static layers::Layers,
    /// Configurations of RGB underglow lightning
    pub leds: leds::LedConfigurations,
    /// Whether to relay user state to the other half
    pub sync: bool,
}

/// The default personality: periodic keymap with its layer colors
pub static CONFIG: KeyboardConfig = KeyboardConfig {
    layers: &layers::LAYERS,
    leds: leds::CONFIGS,
    sync: true,
};

/// Split keyboard logic of one half
pub struct Keyboard {
    role: Role,
    layout: layers::Layout,
    sync: StateSync,
    mac: bool,
    base: Layer,
    prev_layer: Layer,
    host_leds: leds::KeyboardLedsState,
}

/// Deferred update of the feedback devices returned from [`Keyboard::tick`]
#[derive(Clone, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub struct ViewUpdate {
    /// Keyboard state snapshot driving all rendering decisions
    pub state: KeyboardState,
    /// LED control action released this tick, if any
    pub led: Option<LedAction>,
    /// Mouse movement key state change, forwarded to the HID glue
    pub mouse: Option<(MouseMovement, bool)>,
}

impl ViewUpdate {
    /// Perform the underglow update, returning the color to show
    pub fn apply(&self, glow: &mut Underglow) -> Option<rgb::RGB8> {
        if let Some(action) = self.led {
            glow.handle_action(action);
        }
        glow.color(&self.state)
    }
}

impl Keyboard {
    /// Create a keyboard half with the given fixed role
    pub fn new(role: Role, config: &KeyboardConfig) -> (Self, Underglow) {
        let keyboard = Self {
            role,
            layout: layers::Layout::new(config.layers),
            sync: StateSync::new(config.sync),
            mac: false,
            base: Layer::default(),
            prev_layer: Layer::default(),
            host_leds: Default::default(),
        };
        (keyboard, Underglow::new(config.leds))
    }

    /// Get the fixed role of this half
    pub fn role(&self) -> Role {
        self.role
    }

    /// User state as known by this half
    ///
    /// On the master this is the last state written out, on the slave the
    /// last state delivered by the link - possibly stale or, before the
    /// first delivery, the default state.
    pub fn user_state(&self) -> UserState {
        self.sync.read()
    }

    /// Periodic keyboard events processing
    ///
    /// Called at a fixed rate with the key events scanned since the last
    /// call. Handles messages from the other half, resolves key events and
    /// returns the feedback update for this half. The master additionally
    /// relays its user state whenever the active layer changes.
    pub fn tick<TX, RX>(
        &mut self,
        events: impl IntoIterator<Item = Event>,
        (tx, rx): (&mut TX, &mut RX),
    ) -> ViewUpdate
    where
        TX: TransmitQueue<Message>,
        RX: ReceiveQueue<Message>,
    {
        // Process messages from the other half
        while let Some(msg) = rx.get() {
            match msg {
                Message::Key(event) => match self.role {
                    Role::Master => self.layout.event(event),
                    // Only the master resolves key events
                    Role::Slave => crate::warn!("Ignoring remote key event"),
                },
                Message::State(state) => match self.role {
                    // This is the link delivering into the mirror buffer
                    Role::Slave => self.sync.write(&state),
                    Role::Master => crate::warn!("Ignoring remote state update"),
                },
            }
        }

        // Route local key events
        for event in events {
            match self.role {
                Role::Master => self.layout.event(event),
                Role::Slave => tx.push(Message::Key(event)),
            }
        }

        match self.role {
            Role::Master => self.master_tick(tx),
            Role::Slave => self.slave_update(),
        }
    }

    fn master_tick<TX: TransmitQueue<Message>>(&mut self, tx: &mut TX) -> ViewUpdate {
        let mut led = None;
        let mut mouse = None;
        if let Some((action, pressed)) = self.layout.tick().transposed() {
            match action {
                Action::ToggleMac => {
                    // Like other mode switches, toggle on key release
                    if !pressed {
                        self.mac = !self.mac;
                        crate::info!("Mac mode {}", self.mac);
                    }
                }
                Action::Led(action) => {
                    if !pressed {
                        led = Some(*action);
                    }
                }
                Action::Mouse(movement) => mouse = Some((*movement, pressed)),
            }
        }

        let layer = self.active_layer();
        if layer != self.prev_layer {
            self.prev_layer = layer;
            let state = UserState::new(layer);
            // The write happens synchronously on the change; the other half
            // observes it whenever the link gets around to delivering.
            self.sync.write(&state);
            if self.sync.is_enabled() {
                tx.push(Message::State(state));
            }
        }

        ViewUpdate {
            state: self.view_state(),
            led,
            mouse,
        }
    }

    fn slave_update(&mut self) -> ViewUpdate {
        ViewUpdate {
            state: self.view_state(),
            led: None,
            mouse: None,
        }
    }

    /// Highest-priority active layer with Mac mode folded in
    fn active_layer(&mut self) -> Layer {
        let current = Layer::from_id(self.layout.current_layer() as u8).unwrap_or_default();
        if current.is_base() {
            self.base = current;
            match self.mac {
                true => Layer::Mac,
                false => current,
            }
        } else if current == Layer::Win && self.mac {
            // In Mac mode the GUI thumb key means the macOS variant
            Layer::MacWin
        } else {
            current
        }
    }

    fn view_state(&self) -> KeyboardState {
        match self.role {
            Role::Master => KeyboardState {
                layer: self.prev_layer,
                base: self.base,
                leds: self.host_leds,
            },
            Role::Slave => {
                // Possibly stale, or the zero value before the first
                // delivery; both render a well-defined default.
                let state = self.sync.read();
                KeyboardState {
                    layer: state.layer,
                    base: match state.layer.is_base() {
                        true => state.layer,
                        false => Layer::default(),
                    },
                    leds: Default::default(),
                }
            }
        }
    }

    /// Update the host LED state reported over USB
    pub fn set_host_leds(&mut self, leds: leds::KeyboardLedsState) {
        self.host_leds = leds;
    }

    /// Iterate over key codes to be reported to the host
    pub fn keycodes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.layout.keycodes()
    }

    /// Decide what this half's OLED should show
    pub fn screen(&self) -> oled::Screen {
        oled::Screen::choose(self.role, &self.view_state())
    }
}

/// Extension trait for [`CustomEvent`]
pub trait CustomEventExt<T: 'static> {
    /// Convert NoEvent into None, else return Some(T, pressed)
    fn transposed(self) -> Option<(&'static T, bool)>;
}

impl<T> CustomEventExt<T> for CustomEvent<T> {
    fn transposed(self) -> Option<(&'static T, bool)> {
        match self {
            CustomEvent::NoEvent => None,
            CustomEvent::Press(act) => Some((act, true)),
            CustomEvent::Release(act) => Some((act, false)),
        }
    }
}
