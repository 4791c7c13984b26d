/*
    # The MFRC522 command engine

    The MFRC522 is little more than a PHY for ISO 14443A, every
    exchange with a card goes through its command unit:

    * program the IRQ enable register, clear pending IRQs
    * flush the FIFO, put the command unit to idle
    * push the outbound bytes into the FIFO
    * start the command (and, for Transceive, set StartSend)
    * wait for the command specific IRQ bits
    * check the error register, drain the FIFO

    The IRQ line is not used. Completion is detected by polling
    ComIrqReg a bounded number of times, which is also the only
    timeout there is: the bound is an iteration count, not a
    wall clock time.
*/

use rfid_hal::{gpio::OutputPin, spi::SpiInterface};
use std::{time, thread};

use crate::{error::ReaderError, registers::*, rfchip::RFChip, transport::RegisterTransport};

/// Result of a finished command: the FIFO content and the number
/// of valid bits in it.
#[derive(Debug, PartialEq, Default)]
pub struct Exchange
{
    pub data: Vec<u8>,
    pub bit_len: usize
}

/// Drive the reset line: low for 10 ms, then high and give the
/// oscillator 50 ms to settle.
pub fn hard_reset<P: OutputPin>(reset_pin: &mut P) -> Result<(), ReaderError>
{
    reset_pin.set_low()?;
    thread::sleep(time::Duration::from_millis(10));
    reset_pin.set_high()?;
    thread::sleep(time::Duration::from_millis(50));
    Ok(())
}

pub struct Mfrc522<Spi>
    where Spi: SpiInterface
{
    transport: RegisterTransport<Spi>,
    poll_iterations: u32
}

impl<Spi> Mfrc522<Spi>
where Spi: SpiInterface
{
    pub fn new(spi: Spi, poll_iterations: u32) -> Self
    {
        Self
        {
            transport: RegisterTransport::new(spi),
            poll_iterations
        }
    }

    /// Soft reset and basic setup, returns the chip version.
    ///
    /// Timer: TAuto, prescaler 0xD3E (~2 kHz tick), reload 30, i.e. the
    /// chip gives up on a card after ~15 ms and raises TimerIRq.
    pub fn init(&mut self) -> Result<u8, ReaderError>
    {
        self.do_command(ChipCommand::SoftReset)?;
        thread::sleep(time::Duration::from_millis(50));

        self.transport.write_register(ChipRegister::TModeReg, 0x8D)?;
        self.transport.write_register(ChipRegister::TPrescalerReg, 0x3E)?;
        self.transport.write_register(ChipRegister::TReloadRegL, 30)?;
        self.transport.write_register(ChipRegister::TReloadRegH, 0)?;

        // 100% ASK, CRC preset 0x6363
        self.transport.write_register(ChipRegister::TxAutoReg, 0x40)?;
        self.transport.write_register(ChipRegister::ModeReg, 0x3D)?;

        self.transport.set_bits(ChipRegister::TxControlReg, ANTENNA_ON)?;

        let version = self.version()?;
        if version == 0x00 || version == 0xFF
        {
            return Err(ReaderError::ChipNotResponding(version));
        }
        Ok(version)
    }

    pub fn version(&mut self) -> Result<u8, ReaderError>
    {
        self.transport.read_register(ChipRegister::VersionReg)
    }

    pub fn toggle_antenna(&mut self, enable_antenna: bool) -> Result<(), ReaderError>
    {
        let tx_ctrl = self.transport.read_register(ChipRegister::TxControlReg)?;
        if enable_antenna
        {
            if (tx_ctrl & ANTENNA_ON) != ANTENNA_ON
            {
                self.transport.set_bits(ChipRegister::TxControlReg, ANTENNA_ON)?;
                // cards need at least 5 ms of field before they answer
                thread::sleep(time::Duration::from_millis(5));
            }
        }
        else
        {
            self.transport.clear_bits(ChipRegister::TxControlReg, ANTENNA_ON)?;
        }
        Ok(())
    }

    fn do_command(&mut self, command: ChipCommand) -> Result<(), ReaderError>
    {
        self.transport.write_register(ChipRegister::CommandReg, command.into())
    }

    /// Run `command` with `data` as FIFO payload and wait for it to finish.
    /// There are no retries in here.
    pub fn execute(&mut self, command: ChipCommand, data: &[u8]) -> Result<Exchange, ReaderError>
    {
        let (irq_en, wait_irq) = match command
        {
            ChipCommand::Authent => (IRQ_EN_AUTHENT, WAIT_IRQ_AUTHENT),
            ChipCommand::Transceive => (IRQ_EN_TRANSCEIVE, WAIT_IRQ_TRANSCEIVE),
            _ => (0x00, 0x00)
        };

        self.transport.write_register(ChipRegister::ComIEnReg, irq_en | IRQ_INV)?;
        self.transport.clear_bits(ChipRegister::ComIrqReg, SET1)?;
        self.transport.set_bits(ChipRegister::FIFOLevelReg, FLUSH_BUFFER)?;
        self.do_command(ChipCommand::Idle)?;

        for d in data
        {
            self.transport.write_register(ChipRegister::FIFODataReg, *d)?;
        }

        self.do_command(command)?;

        if wait_irq == 0x00
        {
            // idle & friends have nothing to wait for
            return Ok(Exchange::default());
        }

        if command == ChipCommand::Transceive
        {
            self.transport.set_bits(ChipRegister::BitFramingReg, START_SEND)?;
        }

        let completion = self.wait_for_completion(wait_irq);

        self.transport.clear_bits(ChipRegister::BitFramingReg, START_SEND)?;
        completion?;

        // We saw the wait bits, now check if the command
        // actually succeeded:
        let error = self.transport.read_register(ChipRegister::ErrorReg)?;
        if (error & ERROR_MASK) != 0x00
        {
            return Err(ReaderError::ChipProtocolError);
        }

        if command != ChipCommand::Transceive
        {
            return Ok(Exchange::default());
        }

        self.retrieve_fifo()
    }

    fn wait_for_completion(&mut self, wait_irq: u8) -> Result<(), ReaderError>
    {
        for _ in 0..self.poll_iterations
        {
            let irq = self.transport.read_register(ChipRegister::ComIrqReg)?;
            if irq & TIMER_IRQ != 0
            {
                // the chip timer ran out, i.e. nobody answered
                return Err(ReaderError::ChipProtocolError);
            }
            if irq & wait_irq != 0
            {
                return Ok(());
            }
        }
        Err(ReaderError::Timeout)
    }

    fn retrieve_fifo(&mut self) -> Result<Exchange, ReaderError>
    {
        let num_bytes_received = self.transport.read_register(ChipRegister::FIFOLevelReg)? as usize;
        let last_bits = (self.transport.read_register(ChipRegister::ControlReg)? & RX_LAST_BITS_MASK) as usize;

        let bit_len = if last_bits != 0
        {
            num_bytes_received.saturating_sub(1) * 8 + last_bits
        }
        else
        {
            num_bytes_received * 8
        };

        let to_read = num_bytes_received.max(1).min(FIFO_CAPACITY);
        let mut data = Vec::with_capacity(to_read);
        for _ in 0..to_read
        {
            data.push(self.transport.read_register(ChipRegister::FIFODataReg)?);
        }

        Ok(Exchange { data, bit_len })
    }

    #[cfg(test)]
    pub fn transport(&mut self) -> &mut RegisterTransport<Spi>
    {
        &mut self.transport
    }
}

impl<Spi> RFChip for Mfrc522<Spi>
where Spi: SpiInterface
{
    fn set_tx_last_bits(&mut self, bits: u8) -> Result<(), ReaderError>
    {
        self.transport.write_register(ChipRegister::BitFramingReg, bits & TX_LAST_BITS_MASK)
    }

    fn transceive(&mut self, data: Vec<u8>) -> Result<Vec<u8>, ReaderError>
    {
        Ok(self.execute(ChipCommand::Transceive, &data)?.data)
    }

    fn authent(&mut self, data: Vec<u8>) -> Result<(), ReaderError>
    {
        self.execute(ChipCommand::Authent, &data)?;
        Ok(())
    }

    fn crypto1_active(&mut self) -> Result<bool, ReaderError>
    {
        Ok(self.transport.read_register(ChipRegister::Status2Reg)? & MF_CRYPTO1_ON != 0)
    }

    fn stop_crypto(&mut self) -> Result<(), ReaderError>
    {
        self.transport.clear_bits(ChipRegister::Status2Reg, MF_CRYPTO1_ON)
    }
}
