//! Keyboard underglow control
//!
//! The underglow is a strip of RGB LEDs driven by an external driver; this
//! module only decides the color. Colors come from a list of rules scanned
//! top to bottom against the current keyboard state, with optional user
//! adjustments (on/off, configuration cycling, HSV offsets) applied on top.

use bitfield::bitfield;
use rgb::RGB8;

use super::actions::LedAction;
use crate::layers::Layer;
use crate::utils::Inc;

/// List of keyboard LED lightning configurations
///
/// Configurations that can be cycled through, but only one is active at a time.
pub type LedConfigurations = &'static [LedConfig];

/// Configuration of keyboard LED lightning consisting of a rules list
pub type LedConfig = &'static [LedRule];

/// Rule defining the underglow color when a condition applies
///
/// The first rule whose condition applies wins.
pub struct LedRule {
    /// Condition required for the rule to be active
    pub condition: Condition,
    /// Color used when the rule applies; `None` turns the underglow off
    pub color: Option<Hsv>,
}

/// Condition for the rule to be used
pub enum Condition {
    /// Always applies
    Always,
    /// Apply when the given layer is the highest-priority active one
    Layer(Layer),
    /// Apply when the host PC reports the given LED as lit
    Led(KeyboardLed),
    /// Applies when the internal condition does not
    Not(&'static Condition),
    /// Applies when any of the internal conditions apply
    Any(&'static [Condition]),
}

/// Standard keyboard LED
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardLed {
    NumLock,
    CapsLock,
    ScrollLock,
    Compose,
    Kana,
}

bitfield! {
    /// State of host keyboard LEDs as reported over USB
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyboardLedsState(u8);
    impl Debug;
    pub num_lock, set_num_lock: 0;
    pub caps_lock, set_caps_lock: 1;
    pub scroll_lock, set_scroll_lock: 2;
    pub compose, set_compose: 3;
    pub kana, set_kana: 4;
}

/// Collection of keyboard state variables that drive feedback rendering
#[derive(Clone, PartialEq)]
#[cfg_attr(test, derive(Debug))]
pub struct KeyboardState {
    /// Highest-priority active layer, with Mac mode folded in
    pub layer: Layer,
    /// Current default (base) layer
    pub base: Layer,
    /// Host LED state; zero on the half not connected to USB
    pub leds: KeyboardLedsState,
}

impl Condition {
    pub fn applies(&self, state: &KeyboardState) -> bool {
        match self {
            Condition::Always => true,
            Condition::Layer(layer) => layer == &state.layer,
            Condition::Led(led) => match led {
                KeyboardLed::NumLock => state.leds.num_lock(),
                KeyboardLed::CapsLock => state.leds.caps_lock(),
                KeyboardLed::ScrollLock => state.leds.scroll_lock(),
                KeyboardLed::Compose => state.leds.compose(),
                KeyboardLed::Kana => state.leds.kana(),
            },
            Condition::Not(inner) => !inner.applies(state),
            Condition::Any(inner) => inner.iter().any(|c| c.applies(state)),
        }
    }
}

/// Color in HSV space with all components in 0-255 (hue included)
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const RED: Hsv = Hsv::new(0, 255, 255);
    pub const CORAL: Hsv = Hsv::new(11, 176, 255);
    pub const GREEN: Hsv = Hsv::new(85, 255, 255);
    pub const SPRINGGREEN: Hsv = Hsv::new(106, 255, 255);
    pub const TURQUOISE: Hsv = Hsv::new(123, 90, 112);
    pub const CYAN: Hsv = Hsv::new(128, 255, 255);
    pub const PURPLE: Hsv = Hsv::new(191, 255, 255);
    pub const MAGENTA: Hsv = Hsv::new(213, 255, 255);
    pub const WHITE: Hsv = Hsv::new(0, 0, 255);

    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Convert to RGB using integer math
    pub fn to_rgb(self) -> RGB8 {
        let Hsv { h, s, v } = self;
        if s == 0 {
            return RGB8::new(v, v, v);
        }

        // Hue sextant and position within it scaled back to 0-255
        let region = h / 43;
        let remainder = (h as u16 - region as u16 * 43) * 6;

        let s = s as u16;
        let v = v as u16;
        let p = ((v * (255 - s)) >> 8) as u8;
        let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
        let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
        let v = self.v;

        match region {
            0 => RGB8::new(v, t, p),
            1 => RGB8::new(q, v, p),
            2 => RGB8::new(p, v, t),
            3 => RGB8::new(p, q, v),
            4 => RGB8::new(t, p, v),
            _ => RGB8::new(v, p, q),
        }
    }
}

/// Underglow configuration with the keymap's per-layer colors
pub static LAYER_COLORS: LedConfig = &[
    LedRule {
        condition: Condition::Layer(Layer::Qwerty),
        color: None,
    },
    LedRule {
        condition: Condition::Layer(Layer::Colemak),
        color: Some(Hsv::CYAN),
    },
    LedRule {
        condition: Condition::Layer(Layer::Dvorak),
        color: Some(Hsv::TURQUOISE),
    },
    LedRule {
        condition: Condition::Layer(Layer::Mac),
        color: Some(Hsv::CORAL),
    },
    LedRule {
        condition: Condition::Layer(Layer::Symb),
        color: Some(Hsv::PURPLE),
    },
    LedRule {
        condition: Condition::Layer(Layer::Move),
        color: Some(Hsv::GREEN),
    },
    LedRule {
        condition: Condition::Layer(Layer::Util),
        color: Some(Hsv::MAGENTA),
    },
    LedRule {
        condition: Condition::Any(&[
            Condition::Layer(Layer::Win),
            Condition::Layer(Layer::MacWin),
        ]),
        color: Some(Hsv::SPRINGGREEN),
    },
    LedRule {
        condition: Condition::Always,
        color: Some(Hsv::WHITE),
    },
];

/// Alternative configuration that only signals lock keys
pub static LOCK_INDICATORS: LedConfig = &[
    LedRule {
        condition: Condition::Led(KeyboardLed::CapsLock),
        color: Some(Hsv::RED),
    },
    LedRule {
        condition: Condition::Led(KeyboardLed::ScrollLock),
        color: Some(Hsv::MAGENTA),
    },
    LedRule {
        condition: Condition::Always,
        color: None,
    },
];

/// Configurations cycled with the RGB mode keys
pub static CONFIGS: LedConfigurations = &[LAYER_COLORS, LOCK_INDICATORS];

const HUE_STEP: u8 = 8;
const SAT_STEP: i16 = 16;
const VAL_STEP: i16 = 16;

/// Keyboard underglow controller
///
/// Holds the user-adjustable part of the underglow state; the per-tick
/// color is resolved from the active configuration's rules with the
/// adjustments applied on top. Layer colors keep winning over manual
/// adjustments, like in the original per-layer lightning.
pub struct Underglow {
    configs: LedConfigurations,
    index: usize,
    enabled: bool,
    hue_offset: u8,
    sat_offset: i16,
    val_offset: i16,
}

impl Underglow {
    pub fn new(configs: LedConfigurations) -> Self {
        debug_assert!(!configs.is_empty());
        Self {
            configs,
            index: 0,
            enabled: true,
            hue_offset: 0,
            sat_offset: 0,
            val_offset: 0,
        }
    }

    /// Apply a LED control key action
    pub fn handle_action(&mut self, action: LedAction) {
        match action {
            LedAction::Toggle => self.enabled = !self.enabled,
            LedAction::Cycle(inc) => {
                self.index = inc.cycle(self.index, self.configs.len());
                crate::info!("Underglow config {}", self.index as u8);
            }
            LedAction::Hue(inc) => self.hue_offset = inc.wrapping(self.hue_offset, HUE_STEP),
            LedAction::Saturation(inc) => {
                self.sat_offset = Self::offset(inc, self.sat_offset, SAT_STEP)
            }
            LedAction::Brightness(inc) => {
                self.val_offset = Self::offset(inc, self.val_offset, VAL_STEP)
            }
        }
    }

    fn offset(inc: Inc, offset: i16, step: i16) -> i16 {
        match inc {
            Inc::Up => offset + step,
            Inc::Down => offset - step,
        }
        .clamp(-255, 255)
    }

    /// Resolve the underglow color for the given state
    pub fn color(&self, state: &KeyboardState) -> Option<RGB8> {
        if !self.enabled {
            return None;
        }
        let rules = self.configs[self.index];
        let rule = rules.iter().find(|rule| rule.condition.applies(state))?;
        let base = rule.color?;

        let clamp = |value: i16, offset: i16| value.saturating_add(offset).clamp(0, 255) as u8;
        let hsv = Hsv::new(
            base.h.wrapping_add(self.hue_offset),
            clamp(base.s as i16, self.sat_offset),
            clamp(base.v as i16, self.val_offset),
        );
        Some(hsv.to_rgb())
    }
}
