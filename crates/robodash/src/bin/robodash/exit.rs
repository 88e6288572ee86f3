//! Process exit codes.

use robodash::{ConfigError, TransportError};

/// Exit code: invalid configuration file, flag, or environment value.
pub const EXIT_INVALID_CONFIG: u8 = 10;
/// Exit code: robot could not be reached.
pub const EXIT_UNREACHABLE: u8 = 11;
/// Exit code: robot answered with a non-success status.
pub const EXIT_REJECTED: u8 = 12;
/// Exit code: robot answered with an unreadable payload.
pub const EXIT_MALFORMED: u8 = 13;
/// Exit code: unexpected/internal failure.
pub const EXIT_INTERNAL: u8 = 20;

/// Map a command failure to a stable exit code.
#[must_use]
pub fn classify(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_INVALID_CONFIG;
        }
        if let Some(transport) = cause.downcast_ref::<TransportError>() {
            return match transport {
                TransportError::Network(_) => EXIT_UNREACHABLE,
                TransportError::Status(_) => EXIT_REJECTED,
                TransportError::Malformed(_) => EXIT_MALFORMED,
            };
        }
    }
    EXIT_INTERNAL
}
