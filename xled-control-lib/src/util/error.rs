use reqwest::StatusCode;
use thiserror::Error;

use crate::led::pixel::LedProfile;
use crate::util::traits::ResponseCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the authenticator, the control interface and the transport.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid caller input, detected before anything is sent.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("request to the device failed")]
    Transport(#[source] reqwest::Error),

    #[error("device answered with HTTP status {status}")]
    TransportStatus { status: StatusCode },

    /// The device no longer accepts the session token; log in again.
    #[error("the device rejected the session token")]
    Unauthorized,

    /// The request reached the device but the answer signals a failure or
    /// does not have the expected shape.
    #[error("{operation} failed: {reason}")]
    Protocol {
        operation: &'static str,
        reason: String,
    },

    #[error("a movie with unique id `{unique_id}` already exists on the device")]
    DuplicateIdentifier { unique_id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("the call was cancelled")]
    Cancelled,

    #[error("the call did not finish before its deadline")]
    DeadlineExceeded,
}

impl Error {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn protocol(operation: &'static str, reason: impl Into<String>) -> Self {
        Error::Protocol {
            operation,
            reason: reason.into(),
        }
    }

    /// Maps a non-success HTTP status of a device reply.
    pub(crate) fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Error::Unauthorized
        } else {
            Error::TransportStatus { status }
        }
    }

    pub(crate) fn unexpected_code(operation: &'static str, code: ResponseCode) -> Self {
        Error::protocol(
            operation,
            format!("device returned code {} ({})", code.code, code.message),
        )
    }
}

/// Defects of a logical movie, found before any byte is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("movie must have at least one frame")]
    EmptyMovie,

    #[error("frame {frame} has no LEDs")]
    EmptyFrame { frame: usize },

    #[error("frame {frame} has {found} LEDs, expected {expected}")]
    InconsistentFrameSize {
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("LED {pixel} of frame {frame} is {found:?}, but the movie uses {expected:?}")]
    MixedPixelFormat {
        frame: usize,
        pixel: usize,
        expected: LedProfile,
        found: LedProfile,
    },
}
