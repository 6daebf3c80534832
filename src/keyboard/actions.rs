use crate::utils::Inc;

/// Additional key actions resolved outside of the keymap
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Toggle macOS mode
    ToggleMac,
    /// Modify LED lightning
    Led(LedAction),
    /// Mouse movement key, forwarded to the HID glue
    Mouse(MouseMovement),
}

/// Actions for LED lightning control
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedAction {
    /// Turn the underglow on or off
    Toggle,
    /// Cycle through available LED configurations
    Cycle(Inc),
    /// Shift the hue of the current color
    Hue(Inc),
    /// Adjust color saturation
    Saturation(Inc),
    /// Modify global brightness
    Brightness(Inc),
}

/// Mouse movement direction
///
/// Mouse emulation happens in the host-side HID glue; the keymap only
/// reports which direction key is being held.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseMovement {
    Up,
    Down,
    Left,
    Right,
}
