//! Layout and functions of keys on the keyboard
//!
//! The keymap follows the "periodic" Kyria layout: three alpha base layers
//! (QWERTY, Colemak, Dvorak) switched with the center-column keys, overlay
//! layers for symbols, movement and utilities on the thumb cluster, and
//! GUI chord layers for window management. Layer identifiers are part of
//! the contract shared with the other keyboard half, so variants must
//! never be reordered.

use keyberon::{
    action::{self, d, k, l, m, Action::*, HoldTapAction, HoldTapConfig},
    key_code::KeyCode::*,
    layout::{self, layout},
};

use serde::{Deserialize, Serialize};

use crate::keyboard::actions::{Action as CustomAction, LedAction, MouseMovement};
use crate::utils::Inc;

/// Number of key matrix rows on one half
pub const NROWS: usize = 4;
/// Number of key matrix columns on one half
pub const NCOLS: usize = 8;
/// Number of keymap layers
pub const NLAYERS: usize = 9;

pub type Layout = layout::Layout<{ 2 * NCOLS }, NROWS, NLAYERS, CustomAction>;
pub type Layers = layout::Layers<{ 2 * NCOLS }, NROWS, NLAYERS, CustomAction>;
type Action = action::Action<CustomAction>;

/// Keymap layer identifiers
///
/// The discriminants double as indices into [`LAYERS`] and as the on-wire
/// representation synchronized to the other half, identical on both halves
/// by construction (both run the same firmware image built from this file).
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Layer {
    #[default]
    Qwerty = 0,
    Colemak,
    Dvorak,
    Mac,
    Symb,
    Move,
    Util,
    Win,
    MacWin,
}

impl Layer {
    /// Decode a layer identifier received from the other half
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Qwerty),
            1 => Some(Self::Colemak),
            2 => Some(Self::Dvorak),
            3 => Some(Self::Mac),
            4 => Some(Self::Symb),
            5 => Some(Self::Move),
            6 => Some(Self::Util),
            7 => Some(Self::Win),
            8 => Some(Self::MacWin),
            _ => None,
        }
    }

    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Alpha layers that can act as the default layer
    pub const fn is_base(self) -> bool {
        matches!(self, Self::Qwerty | Self::Colemak | Self::Dvorak)
    }

    /// Name as displayed on the OLED
    pub const fn name(self) -> &'static str {
        match self {
            Self::Qwerty => "Qwerty",
            Self::Colemak => "Colemak",
            Self::Dvorak => "Dvorak",
            Self::Mac => "Mac",
            Self::Symb => "Symbols",
            Self::Move => "Movement",
            Self::Util => "Util",
            Self::Win => "GUI",
            Self::MacWin => "Mac GUI",
        }
    }
}

const QWERTY: usize = Layer::Qwerty as usize;
const COLEMAK: usize = Layer::Colemak as usize;
const DVORAK: usize = Layer::Dvorak as usize;
const SYMB: usize = Layer::Symb as usize;
const MOVE: usize = Layer::Move as usize;
const UTIL: usize = Layer::Util as usize;
const WIN: usize = Layer::Win as usize;
const MACWIN: usize = Layer::MacWin as usize;

const HOLDTAP_TIMEOUT: u16 = 180;

macro_rules! ht {
    ($hold:expr, $tap:expr) => {
        HoldTap(&HoldTapAction {
            timeout: HOLDTAP_TIMEOUT,
            hold: $hold,
            tap: $tap,
            config: HoldTapConfig::Default,
            tap_hold_interval: 0,
        })
    };
}

// Chords in the style of QMK's G()/LCA()/LSA() wrappers
macro_rules! gui {
    ($kc:ident) => { m(&[LGui, $kc].as_slice()) };
}
macro_rules! lca {
    ($kc:ident) => { m(&[LCtrl, LAlt, $kc].as_slice()) };
}
macro_rules! lsa {
    ($kc:ident) => { m(&[LShift, LAlt, $kc].as_slice()) };
}

const LCTRL_ESC: Action = ht!(k(LCtrl), k(Escape));
const LGUI_ESC: Action = ht!(k(LGui), k(Escape));
const SYMB_TAB: Action = ht!(l(SYMB), k(Tab));
const SYMB_ENTER: Action = ht!(l(SYMB), k(Enter));

const TO_QWERTY: Action = d(QWERTY);
const TO_COLEMAK: Action = d(COLEMAK);
const TO_DVORAK: Action = d(DVORAK);

const MAC: Action = Custom(CustomAction::ToggleMac);

const RGB_TOG: Action = Custom(CustomAction::Led(LedAction::Toggle));
const RGB_MOD: Action = Custom(CustomAction::Led(LedAction::Cycle(Inc::Up)));
const RGB_RMOD: Action = Custom(CustomAction::Led(LedAction::Cycle(Inc::Down)));
const RGB_HUI: Action = Custom(CustomAction::Led(LedAction::Hue(Inc::Up)));
const RGB_HUD: Action = Custom(CustomAction::Led(LedAction::Hue(Inc::Down)));
const RGB_SAI: Action = Custom(CustomAction::Led(LedAction::Saturation(Inc::Up)));
const RGB_SAD: Action = Custom(CustomAction::Led(LedAction::Saturation(Inc::Down)));
const RGB_VAI: Action = Custom(CustomAction::Led(LedAction::Brightness(Inc::Up)));
const RGB_VAD: Action = Custom(CustomAction::Led(LedAction::Brightness(Inc::Down)));

const MS_L: Action = Custom(CustomAction::Mouse(MouseMovement::Left));
const MS_D: Action = Custom(CustomAction::Mouse(MouseMovement::Down));
const MS_U: Action = Custom(CustomAction::Mouse(MouseMovement::Up));
const MS_R: Action = Custom(CustomAction::Mouse(MouseMovement::Right));

// Shifted symbol keys
const LCBR: Action = m(&[LShift, LBracket].as_slice());
const RCBR: Action = m(&[LShift, RBracket].as_slice());
const PIPE: Action = m(&[LShift, Bslash].as_slice());
const TILD: Action = m(&[LShift, Grave].as_slice());
const LPRN: Action = m(&[LShift, Kb9].as_slice());
const RPRN: Action = m(&[LShift, Kb0].as_slice());
const ASTR: Action = m(&[LShift, Kb8].as_slice());
const COLN: Action = m(&[LShift, SColon].as_slice());

// macOS window management one-offs
const ALT_EJECT: Action = m(&[LAlt, MediaEjectCD].as_slice());
const SCREENSHOT: Action = m(&[LCtrl, LGui, S].as_slice());
const LAUNCHER: Action = m(&[LGui, Space].as_slice());
const FULLSCREEN: Action = m(&[LCtrl, LShift, LAlt, F].as_slice());

/// Keymap of the whole keyboard in global coordinates
///
/// Rows 0-1 have no keys in the center columns, row 2 includes the two
/// extra center-column keys of each half and row 3 is the thumb cluster.
/// Alpha layers are expanded (no transparency towards the previous base
/// layer) because the default layer is replaced, not stacked.
pub static LAYERS: Layers = layout! {
    { // Qwerty
        [ Tab         Q W E R T   n n n n   Y U I O P Minus ]
        [ {LCTRL_ESC} A S D F G   n n n n   H J K L ; Quote ]
        [ LShift Z X C V B t {TO_DVORAK}    {TO_COLEMAK} {MAC} N M , . / RShift ]
        [ n n n   LGui {l(UTIL)} {l(MOVE)} BSpace {SYMB_TAB}   {SYMB_ENTER} Space {l(WIN)} {l(UTIL)} RAlt   n n n ]
    }
    { // Colemak
        [ Tab         Q W F P G   n n n n   J L U Y ; Minus ]
        [ {LCTRL_ESC} A R S T D   n n n n   H N E I O Quote ]
        [ LShift Z X C V B t {TO_QWERTY}    {TO_DVORAK} {MAC} K M , . / RShift ]
        [ n n n   LGui {l(UTIL)} {l(MOVE)} BSpace {SYMB_TAB}   {SYMB_ENTER} Space {l(WIN)} {l(UTIL)} RAlt   n n n ]
    }
    { // Dvorak
        [ Tab         Quote , . P Y   n n n n   F G C R L Slash ]
        [ {LCTRL_ESC} A O E U I       n n n n   D H T N S Minus ]
        [ LShift ; Q J K X t {TO_COLEMAK}    {TO_QWERTY} {MAC} B M W V Z RShift ]
        [ n n n   LGui {l(UTIL)} {l(MOVE)} BSpace {SYMB_TAB}   {SYMB_ENTER} Space {l(WIN)} {l(UTIL)} RAlt   n n n ]
    }
    { // Mac: overlay adjusting modifiers for macOS
        [ t          t t t t t   n n n n   t t t t t t ]
        [ {LGUI_ESC} t t t t t   n n n n   t t t t t t ]
        [ t t t t t t t t   t t t t t t t t ]
        [ n n n   LCtrl t t t t   t t {l(MACWIN)} t t   n n n ]
    }
    { // Symbols: numbers on the left, symbols on the right
        [ t KpAsterisk 1 2 3 KpPlus    n n n n   Grave  {LCBR} {RCBR} {PIPE} Bslash t ]
        [ t KpMinus    4 5 6 0         n n n n   t      {LPRN} {RPRN} {ASTR} {COLN} t ]
        [ t KpDot 7 8 9 KpEqual t t   t t {TILD} LBracket RBracket . / t ]
        [ n n n   t t t t t   t t t t t   n n n ]
    }
    { // Movement: media, navigation, mouse
        [ t t t t t t                                          n n n n   Home PgDown PgUp End 0 t ]
        [ t t MediaPreviousSong MediaPlayPause MediaNextSong t n n n n   Left Down Up Right t t ]
        [ t t MediaMute MediaVolDown MediaVolUp t t t   t t {MS_L} {MS_D} {MS_U} {MS_R} t t ]
        [ n n n   t t t t t   t t t t t   n n n ]
    }
    { // Utility: function keys, RGB control
        [ t F1 F2 F3 F4 F5                                     n n n n   F6 F7 F8 F9 F10 F11 ]
        [ t {RGB_TOG} {RGB_SAI} {RGB_HUI} {RGB_VAI} {RGB_MOD}  n n n n   t t t t t F12 ]
        [ t t {RGB_SAD} {RGB_HUD} {RGB_VAD} {RGB_RMOD} t t   t t t t t t t t ]
        [ n n n   CapsLock t t t t   t t t t t   n n n ]
    }
    { // GUI: i3 window management
        [ t {gui!(Q)} {gui!(W)} {gui!(E)} {gui!(R)} {gui!(T)}       n n n n   {gui!(Kb6)} {gui!(Kb7)} {gui!(Kb8)} {gui!(Kb9)} t t ]
        [ t {gui!(A)} {gui!(T)} {gui!(D)} {gui!(F)} {gui!(Space)}   n n n n   {gui!(H)} {gui!(J)} {gui!(K)} {gui!(L)} t t ]
        [ t t t {gui!(C)} {gui!(V)} {gui!(B)} t t   t t {gui!(Kb1)} {gui!(Kb2)} {gui!(Kb3)} {gui!(Kb4)} {gui!(Kb5)} t ]
        [ n n n   t t t t t   t t t t t   n n n ]
    }
    { // Mac GUI: macOS window management
        [ {gui!(Tab)} {ALT_EJECT} t t t t                          n n n n   {lca!(Kb6)} {lca!(Kb7)} {lca!(Kb8)} {lca!(Kb9)} t t ]
        [ t t {SCREENSHOT} {LAUNCHER} {FULLSCREEN} t               n n n n   {lca!(H)} {lca!(J)} {lca!(K)} {lca!(L)} t t ]
        [ t t t t t t t t   t t {lca!(Kb1)} {lca!(Kb2)} {lca!(Kb3)} {lca!(Kb4)} {lca!(Kb5)} t ]
        [ n n n   t t t {lsa!(Enter)} {lsa!(Space)}   t t t t t   n n n ]
    }
};

#[cfg(test)]
mod tests {
    use super::*;
    use keyberon::action::Action as KAction;
    use keyberon::key_code::KeyCode;

    #[test]
    fn layer_count_matches_tables() {
        assert_eq!(LAYERS.len(), NLAYERS);
    }

    #[test]
    fn layer_id_round_trip() {
        for id in 0..NLAYERS as u8 {
            let layer = Layer::from_id(id).unwrap();
            assert_eq!(layer.id(), id);
        }
        assert_eq!(Layer::from_id(NLAYERS as u8), None);
        assert_eq!(Layer::from_id(0xff), None);
    }

    #[test]
    fn default_layer_is_zero() {
        assert_eq!(Layer::default(), Layer::Qwerty);
        assert_eq!(Layer::default().id(), 0);
    }

    #[test]
    fn base_layer_classification() {
        assert!(Layer::Qwerty.is_base());
        assert!(Layer::Colemak.is_base());
        assert!(Layer::Dvorak.is_base());
        assert!(!Layer::Mac.is_base());
        assert!(!Layer::Symb.is_base());
        assert!(!Layer::MacWin.is_base());
    }

    #[test]
    fn base_switch_keys_target_declared_layers() {
        // Center-column keys rotate the default layer: prev on the left, next on the right
        assert!(matches!(LAYERS[QWERTY][2][7], KAction::DefaultLayer(DVORAK)));
        assert!(matches!(LAYERS[QWERTY][2][8], KAction::DefaultLayer(COLEMAK)));
        assert!(matches!(LAYERS[COLEMAK][2][7], KAction::DefaultLayer(QWERTY)));
        assert!(matches!(LAYERS[COLEMAK][2][8], KAction::DefaultLayer(DVORAK)));
        assert!(matches!(LAYERS[DVORAK][2][7], KAction::DefaultLayer(COLEMAK)));
        assert!(matches!(LAYERS[DVORAK][2][8], KAction::DefaultLayer(QWERTY)));
    }

    #[test]
    fn mac_toggle_on_every_base_layer() {
        for base in [QWERTY, COLEMAK, DVORAK] {
            assert!(matches!(
                LAYERS[base][2][9],
                KAction::Custom(CustomAction::ToggleMac)
            ));
        }
    }

    #[test]
    fn thumb_cluster_overlays() {
        assert!(matches!(LAYERS[QWERTY][3][5], KAction::Layer(MOVE)));
        assert!(matches!(LAYERS[QWERTY][3][10], KAction::Layer(WIN)));
        assert!(matches!(LAYERS[MAC_L][3][10], KAction::Layer(MACWIN)));
    }

    #[test]
    fn alpha_spot_checks() {
        assert!(matches!(LAYERS[QWERTY][0][1], KAction::KeyCode(KeyCode::Q)));
        assert!(matches!(LAYERS[COLEMAK][0][3], KAction::KeyCode(KeyCode::F)));
        assert!(matches!(LAYERS[DVORAK][1][1], KAction::KeyCode(KeyCode::A)));
        assert!(matches!(LAYERS[DVORAK][0][10], KAction::KeyCode(KeyCode::F)));
    }

    const MAC_L: usize = Layer::Mac as usize;

    #[test]
    fn mac_overlay_is_sparse() {
        // Everything the Mac overlay does not redefine stays transparent
        assert!(matches!(LAYERS[MAC_L][0][0], KAction::Trans));
        assert!(matches!(LAYERS[MAC_L][2][9], KAction::Trans));
        assert!(matches!(LAYERS[MAC_L][1][0], KAction::HoldTap(_)));
    }
}
