//! Logging macros that work with or without `defmt`
//!
//! With the `defmt` feature enabled these forward to the corresponding
//! `defmt` macros. Without it they compile to nothing, except in host
//! tests where messages go to stderr. Only formatting syntax valid for
//! both `defmt` and `core::fmt` may be used in call sites.

#[cfg(all(feature = "defmt", not(test)))]
mod defmt_impl {
    #[macro_export]
    macro_rules! debug {
        ($($arg:expr),*) => { defmt::debug!($($arg),*) };
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:expr),*) => { defmt::info!($($arg),*) };
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:expr),*) => { defmt::warn!($($arg),*) };
    }
}

#[cfg(test)]
mod test_impl {
    #[macro_export]
    macro_rules! debug {
        ($($arg:expr),*) => {{
            extern crate std;
            std::eprintln!("DEBUG: {}", std::format!($($arg),*));
        }};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:expr),*) => {{
            extern crate std;
            std::eprintln!("INFO: {}", std::format!($($arg),*));
        }};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:expr),*) => {{
            extern crate std;
            std::eprintln!("WARN: {}", std::format!($($arg),*));
        }};
    }
}

#[cfg(all(not(feature = "defmt"), not(test)))]
mod noop_impl {
    #[macro_export]
    macro_rules! debug {
        ($($arg:expr),*) => {{ let _ = ($(&$arg),*); }};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:expr),*) => {{ let _ = ($(&$arg),*); }};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:expr),*) => {{ let _ = ($(&$arg),*); }};
    }
}
