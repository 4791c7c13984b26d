use rfid_hal::{spi::SpiInterface, BusError};

use crate::{error::ReaderError, registers::*};

/// Address byte for reading `reg`: `(reg << 1) | 0x80`
pub fn read_address(reg: ChipRegister) -> u8
{
    ((reg as u8) << 1) & ADDRESS_MASK | READ_FLAG
}

/// Address byte for writing `reg`: `reg << 1`
pub fn write_address(reg: ChipRegister) -> u8
{
    ((reg as u8) << 1) & ADDRESS_MASK
}

/// Single register access over SPI.
///
/// Every access is exactly one two byte full duplex transaction,
/// see section 8.1.2 of the data sheet. The read-modify-write helpers
/// are not atomic, the transport must have a single user.
pub struct RegisterTransport<Spi>
    where Spi: SpiInterface
{
    spi_interface: Spi
}

impl<Spi: SpiInterface> RegisterTransport<Spi>
{
    pub fn new(spi: Spi) -> Self
    {
        Self
        {
            spi_interface: spi
        }
    }

    pub fn read_register(&mut self, reg: ChipRegister) -> Result<u8, ReaderError>
    {
        // The zero byte clocks the value out, the answer
        // to the address byte itself is garbage.
        let frame = [read_address(reg), 0x00];
        let received = self.spi_interface.send_receive(&frame)?;
        match received.get(1)
        {
            Some(value) => Ok(*value),
            None => Err(BusError::ShortResponse { expected: frame.len(), actual: received.len() }.into())
        }
    }

    pub fn write_register(&mut self, reg: ChipRegister, value: u8) -> Result<(), ReaderError>
    {
        let frame = [write_address(reg), value];
        let _ = self.spi_interface.send_receive(&frame)?;
        Ok(())
    }

    fn modify(&mut self, reg: ChipRegister, func: impl FnOnce(u8) -> u8) -> Result<(), ReaderError>
    {
        let current_value = self.read_register(reg)?;
        self.write_register(reg, func(current_value))
    }

    pub fn set_bits(&mut self, reg: ChipRegister, mask: u8) -> Result<(), ReaderError>
    {
        self.modify(reg, |value| value | mask)
    }

    pub fn clear_bits(&mut self, reg: ChipRegister, mask: u8) -> Result<(), ReaderError>
    {
        self.modify(reg, |value| value & !mask)
    }

    #[cfg(test)]
    pub fn bus(&self) -> &Spi
    {
        &self.spi_interface
    }

    #[cfg(test)]
    pub fn bus_mut(&mut self) -> &mut Spi
    {
        &mut self.spi_interface
    }
}
