//! Logging shims.
//!
//! With the `log` cargo feature enabled, these forward to the `log` crate's macros. Without it,
//! they expand to a bare `format_args!`, which type-checks every message and argument and then
//! discards them.

macro_rules! error {
    ($($t:tt)*) => {{
        #[cfg(feature = "log")]
        log::error!($($t)*);
        #[cfg(not(feature = "log"))]
        {
            format_args!($($t)*);
        }
    }};
}

macro_rules! warn {
    ($($t:tt)*) => {{
        #[cfg(feature = "log")]
        log::warn!($($t)*);
        #[cfg(not(feature = "log"))]
        {
            format_args!($($t)*);
        }
    }};
}

macro_rules! info {
    ($($t:tt)*) => {{
        #[cfg(feature = "log")]
        log::info!($($t)*);
        #[cfg(not(feature = "log"))]
        {
            format_args!($($t)*);
        }
    }};
}

macro_rules! debug {
    ($($t:tt)*) => {{
        #[cfg(feature = "log")]
        log::debug!($($t)*);
        #[cfg(not(feature = "log"))]
        {
            format_args!($($t)*);
        }
    }};
}

macro_rules! trace {
    ($($t:tt)*) => {{
        #[cfg(feature = "log")]
        log::trace!($($t)*);
        #[cfg(not(feature = "log"))]
        {
            format_args!($($t)*);
        }
    }};
}
