//! OLED screen contents
//!
//! Decides *what* each half shows; pushing pixels is the display driver's
//! job. The master half renders a textual status screen, the slave half
//! shows a full-screen logo picked from the state relayed by the master.

use ufmt::{uwrite, uWrite};

use super::leds::{KeyboardLedsState, KeyboardState};
use super::role::Role;
use crate::layers::Layer;

/// Content to be rendered on the OLED of one keyboard half
#[derive(Clone, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub enum Screen {
    Status(Status),
    Logo(Logo),
}

/// Status summary shown on the master half
#[derive(Clone, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub struct Status {
    pub layer: Layer,
    pub base: Layer,
    pub leds: KeyboardLedsState,
}

/// Full-screen image shown on the slave half
///
/// The bitmaps themselves live next to the display driver; firmware logic
/// only picks the image.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Logo {
    /// Default Kyria logo
    Kyria,
    /// Shown while Mac mode is active
    Asana,
}

impl Screen {
    /// Decide what a half with the given role should render
    pub fn choose(role: Role, state: &KeyboardState) -> Self {
        match role {
            Role::Master => Self::Status(Status {
                layer: state.layer,
                base: state.base,
                leds: state.leds,
            }),
            Role::Slave => Self::Logo(Logo::choose(state)),
        }
    }
}

impl Logo {
    fn choose(state: &KeyboardState) -> Self {
        match state.layer {
            Layer::Mac | Layer::MacWin => Self::Asana,
            _ => Self::Kyria,
        }
    }
}

impl Status {
    /// Render the status text for a 21x4 character display area
    pub fn render<W: uWrite>(&self, w: &mut W) -> Result<(), W::Error> {
        uwrite!(w, "Kyria rev1.0\n\n")?;

        match self.layer {
            // On the Mac layer the base layer is still what types
            Layer::Mac => uwrite!(w, "Layer: {} + Mac\n", self.base.name())?,
            layer => uwrite!(w, "Layer: {}\n", layer.name())?,
        }

        let led = |on: bool, name: &'static str| if on { name } else { "      " };
        uwrite!(
            w,
            "{} {} {}",
            led(self.leds.num_lock(), "NUMLCK"),
            led(self.leds.caps_lock(), "CAPLCK"),
            led(self.leds.scroll_lock(), "SCRLCK")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn state(layer: Layer, base: Layer) -> KeyboardState {
        KeyboardState {
            layer,
            base,
            leds: Default::default(),
        }
    }

    fn rendered(status: &Status) -> String<128> {
        let mut out = String::new();
        status.render(&mut out).unwrap();
        out
    }

    fn status_for(state: &KeyboardState) -> Status {
        match Screen::choose(Role::Master, state) {
            Screen::Status(status) => status,
            screen => panic!("Unexpected screen: {:?}", screen),
        }
    }

    #[test]
    fn master_status_shows_layer_name() {
        let status = status_for(&state(Layer::Symb, Layer::Qwerty));
        let text = rendered(&status);
        assert!(text.as_str().starts_with("Kyria rev1.0\n\nLayer: Symbols\n"));
        // The lock LED row is fixed width regardless of the LED states
        let header = "Kyria rev1.0\n\nLayer: Symbols\n";
        assert_eq!(text.len() - header.len(), 3 * 6 + 2);
    }

    #[test]
    fn mac_mode_shows_base_layer_too() {
        let status = status_for(&state(Layer::Mac, Layer::Dvorak));
        assert!(rendered(&status).as_str().contains("Layer: Dvorak + Mac"));
    }

    #[test]
    fn lock_leds_render_by_name() {
        let mut state = state(Layer::Qwerty, Layer::Qwerty);
        state.leds.set_caps_lock(true);
        state.leds.set_num_lock(true);
        let text = rendered(&status_for(&state));
        assert!(text.as_str().contains("NUMLCK"));
        assert!(text.as_str().contains("CAPLCK"));
        assert!(!text.as_str().contains("SCRLCK"));
    }

    #[test]
    fn slave_renders_logos() {
        for (layer, logo) in [
            (Layer::Qwerty, Logo::Kyria),
            (Layer::Symb, Logo::Kyria),
            (Layer::Mac, Logo::Asana),
            (Layer::MacWin, Logo::Asana),
        ] {
            let screen = Screen::choose(Role::Slave, &state(layer, Layer::Qwerty));
            assert_eq!(screen, Screen::Logo(logo));
        }
    }
}
