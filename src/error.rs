use core::fmt;

/// Possible errors from a single read attempt.
///
/// Every variant is recoverable by retrying on the next poll cycle; none of
/// them invalidate the reader or the last retained reading.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never acknowledged the trigger handshake.
    AckTimeout,
    /// The line stopped transitioning mid-frame during timing capture.
    BitTimeout,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// The frame passed its checksum but decoded to a physically implausible
    /// value. Treated as sensor noise rather than corruption.
    OutOfRange,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::AckTimeout => f.write_str("sensor did not acknowledge the read trigger"),
            DhtError::BitTimeout => f.write_str("timed out waiting for a level change mid-frame"),
            DhtError::ChecksumMismatch => f.write_str("checksum did not match the received data"),
            DhtError::OutOfRange => f.write_str("decoded value is out of the sensor's range"),
            DhtError::PinError(e) => write!(f, "pin error: {e:?}"),
        }
    }
}
