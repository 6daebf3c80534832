/// Describes the role of a keyboard half
///
/// The role is fixed when the firmware boots: the half wired to USB is
/// flashed/configured as master, the other one as slave. There is no
/// runtime negotiation, so both halves agree on who owns the shared
/// user state for as long as they are powered.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Board acts as master: resolves the keymap, sends USB HID reports
    /// and owns the authoritative user state.
    Master,
    /// Board acts as slave: transmits key events to the master and renders
    /// feedback from the state relayed by the master.
    Slave,
}

impl Role {
    pub const fn is_master(self) -> bool {
        matches!(self, Role::Master)
    }
}
