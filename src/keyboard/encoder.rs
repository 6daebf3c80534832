use keyberon::key_code::KeyCode;

/// Resolve the key tapped by one rotary encoder detent
///
/// The left-half encoder (index 0) controls volume, the right-half one
/// (index 1) scrolls by pages. Unknown encoders resolve to nothing so
/// builds without encoders soldered in stay silent.
pub fn tap(index: u8, clockwise: bool) -> Option<KeyCode> {
    match index {
        0 => Some(match clockwise {
            true => KeyCode::MediaVolUp,
            false => KeyCode::MediaVolDown,
        }),
        1 => Some(match clockwise {
            true => KeyCode::PgDown,
            false => KeyCode::PgUp,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_on_first_encoder() {
        assert_eq!(tap(0, true), Some(KeyCode::MediaVolUp));
        assert_eq!(tap(0, false), Some(KeyCode::MediaVolDown));
    }

    #[test]
    fn paging_on_second_encoder() {
        assert_eq!(tap(1, true), Some(KeyCode::PgDown));
        assert_eq!(tap(1, false), Some(KeyCode::PgUp));
    }

    #[test]
    fn unknown_encoders_do_nothing() {
        assert_eq!(tap(2, true), None);
        assert_eq!(tap(0xff, false), None);
    }
}
