use core::fmt;

/// Errors returned by the bridge core.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Unexpectedly reached the end of a buffer while decoding data.
    Eof,

    /// Invalid value supplied for field.
    InvalidValue,

    /// An E1.31 start channel outside of `1..=512` was requested.
    InvalidChannel,

    /// All point-to-point session slots are occupied.
    NoFreeSlot,

    /// The target device already has a session bound to it.
    AlreadyBound,

    /// The firmware image yielded no usable HEX records.
    BadImage,

    /// A session expired its retry budget without an acknowledgement.
    Timeout,

    /// The device answered, but rejected the request.
    Refused,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::Eof => "end of buffer",
            Error::InvalidValue => "invalid value for field",
            Error::InvalidChannel => "start channel out of range",
            Error::NoFreeSlot => "no free session slot",
            Error::AlreadyBound => "device already bound",
            Error::BadImage => "unreadable firmware image",
            Error::Timeout => "device did not acknowledge",
            Error::Refused => "device refused the request",
        })
    }
}
