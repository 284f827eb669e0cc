//! Driver errors

use core::fmt;

use cfa779_protocol::{CommandError, ReplyError};

/// Errors returned by driver operations
///
/// `Transport` and `Reply` are soft failures: the exchange is abandoned and
/// the caller carries on. `InvalidArgument` is raised before anything is
/// sent and leaves the shadow state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Bus error from the block transport
    Transport(E),
    /// Reply missing, corrupted, or rejected by strict validation
    Reply(ReplyError),
    /// Value outside the documented range or malformed input
    InvalidArgument,
    /// Operation not enabled in the driver configuration
    Disabled,
    /// Attribute does not support the requested direction
    NotSupported,
    /// Output buffer too small while formatting
    Format,
}

impl<E> Error<E> {
    /// Whether this failure comes from the exchange with the panel
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Reply(_))
    }
}

impl<E> From<ReplyError> for Error<E> {
    fn from(e: ReplyError) -> Self {
        Error::Reply(e)
    }
}

impl<E> From<CommandError> for Error<E> {
    fn from(_: CommandError) -> Self {
        Error::InvalidArgument
    }
}

impl<E> From<fmt::Error> for Error<E> {
    fn from(_: fmt::Error) -> Self {
        Error::Format
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::Reply(e) => write!(f, "{}", e),
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::Disabled => write!(f, "operation disabled"),
            Error::NotSupported => write!(f, "operation not supported"),
            Error::Format => write!(f, "formatting error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Transport(_e) => defmt::write!(fmt, "Transport error"),
            Error::Reply(e) => defmt::write!(fmt, "Reply error: {}", e),
            Error::InvalidArgument => defmt::write!(fmt, "Invalid argument"),
            Error::Disabled => defmt::write!(fmt, "Disabled"),
            Error::NotSupported => defmt::write!(fmt, "Not supported"),
            Error::Format => defmt::write!(fmt, "Formatting error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_failures() {
        assert!(Error::<()>::Transport(()).is_soft());
        assert!(Error::<()>::Reply(ReplyError::NoReply { len: 0 }).is_soft());
        assert!(!Error::<()>::InvalidArgument.is_soft());
        assert!(!Error::<()>::Disabled.is_soft());
    }

    #[test]
    fn test_command_error_maps_to_invalid_argument() {
        let err: Error<()> = CommandError::OutOfRange.into();
        assert_eq!(err, Error::InvalidArgument);
    }
}
