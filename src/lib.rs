#![no_std]

// Use std when running tests, see: https://stackoverflow.com/a/28186509
// Make sure to use different target when testing, e.g.
//   cargo test --target x86_64-unknown-linux-gnu
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod macros;

/// Packet-based communication between keyboard halves
pub mod ioqueue;
/// Split keyboard logic
pub mod keyboard;
/// Layout and functions of keys on the keyboard
pub mod layers;
/// Small helper types
pub mod utils;
