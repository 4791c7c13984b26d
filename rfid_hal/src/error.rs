use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BusError
{
    #[error("SPI transfer failed: {0}")]
    Transfer(String),
    #[error("short SPI response, expected {expected} bytes, got {actual}")]
    ShortResponse { expected: usize, actual: usize },
    #[error("GPIO unavailable: {0}")]
    Pin(String)
}
