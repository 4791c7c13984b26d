use crate::error::BusError;

/// A full duplex SPI link to a single slave.
///
/// Every call is exactly one transaction: slave select goes
/// active, `data.len()` bytes are shifted out while the same
/// number of bytes is shifted in, slave select goes inactive.
pub trait SpiInterface
{
    fn send_receive(&mut self, data: &[u8]) -> Result<Vec<u8>, BusError>;
}
