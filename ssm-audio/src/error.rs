//! Error types shared by every component.

use core::convert::Infallible;

/// Result alias. `E` is the bus transport error; pure validators leave it at
/// [`Infallible`].
pub type Result<T, E = Infallible> = core::result::Result<T, Error<E>>;

/// Everything that can go wrong while driving a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = Infallible> {
    /// Input frequency or computed coefficient exceeds what the hardware can
    /// represent.
    #[error("value outside the hardware-representable range")]
    OutOfRange,

    /// Register address is not in the chip's map, or not readable.
    #[error("register {0:#06x} is not accessible in this register map")]
    InvalidAddress(u16),

    /// Power state request is malformed or not permitted right now.
    #[error("power state does not permit this request")]
    InvalidState,

    /// Requested format, slot or rate cannot be encoded by the chip.
    #[error("audio format cannot be encoded by this chip")]
    UnsupportedFormat,

    /// Underlying bus I/O failed.
    #[error("bus transport failed: {0:?}")]
    Transport(E),
}

impl Error<Infallible> {
    /// Lift a validation error into the error type of a particular bus.
    pub fn widen<E>(self) -> Error<E> {
        match self {
            Error::OutOfRange => Error::OutOfRange,
            Error::InvalidAddress(address) => Error::InvalidAddress(address),
            Error::InvalidState => Error::InvalidState,
            Error::UnsupportedFormat => Error::UnsupportedFormat,
            Error::Transport(never) => match never {},
        }
    }
}

impl<E> Error<E> {
    /// True when the failure came from the bus rather than from validation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
