use rfid_hal::BusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError
{
    /// REQA got no or a malformed ATQA
    #[error("no card detected")]
    NoCardDetected,
    /// Anticollision answer had the wrong length or a bad BCC
    #[error("anti-collision failed")]
    CollisionOrChecksumFailure,
    /// The completion poll ran out of iterations
    #[error("timeout waiting for the chip")]
    Timeout,
    /// Error register bits, the timer IRQ or an unexpected answer length
    #[error("chip protocol error")]
    ChipProtocolError,
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("write failed, card did not acknowledge")]
    WriteAcknowledgeFailed,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    #[error("MFRC522 not found or not responding (version 0x{0:02x})")]
    ChipNotResponding(u8),
    #[error("reader task is not running")]
    ReaderGone
}
