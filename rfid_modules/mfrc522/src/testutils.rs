//! A scripted stand-in for the MFRC522 on the other end of the SPI bus.
//!
//! It keeps a register file and a FIFO, decodes the address byte of
//! every frame the same way the chip does, and answers each
//! Transceive/Authent command with the next scripted `Reply`.

use rfid_hal::{spi::SpiInterface, BusError};
use std::collections::VecDeque;

use crate::registers::{ChipCommand, ChipRegister};

#[derive(Clone, Default)]
pub struct Reply
{
    pub irq: u8,
    pub error: u8,
    pub data: Vec<u8>,
    pub last_bits: u8,
    pub status2: u8,
}

impl Reply
{
    /// Command completed (RxIRq | IdleIRq) with the given answer.
    pub fn ok(data: Vec<u8>) -> Self
    {
        Reply { irq: 0x30, data, ..Default::default() }
    }

    /// Command completed and the Crypto1 bit is set afterwards.
    pub fn acked(data: Vec<u8>) -> Self
    {
        Reply { irq: 0x30, data, status2: 0x08, ..Default::default() }
    }

    /// The wait bits never show up.
    pub fn silent() -> Self
    {
        Reply::default()
    }
}

pub struct FakeSpi
{
    pub registers: [u8; 64],
    pub frames: Vec<Vec<u8>>,
    /// (command, FIFO content at the time the command was started)
    pub commands: Vec<(u8, Vec<u8>)>,
    pub replies: VecDeque<Reply>,
    pub fail: bool,
    fifo_in: Vec<u8>,
    fifo_out: VecDeque<u8>,
}

impl FakeSpi
{
    pub fn new() -> Self
    {
        let mut registers = [0u8; 64];
        registers[ChipRegister::VersionReg as usize] = 0x92;
        FakeSpi
        {
            registers,
            frames: Vec::new(),
            commands: Vec::new(),
            replies: VecDeque::new(),
            fail: false,
            fifo_in: Vec::new(),
            fifo_out: VecDeque::new(),
        }
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self
    {
        let mut fake = FakeSpi::new();
        fake.replies = replies.into_iter().collect();
        fake
    }

    pub fn register(&self, reg: ChipRegister) -> u8
    {
        self.registers[reg as usize]
    }

    pub fn set_register(&mut self, reg: ChipRegister, value: u8)
    {
        self.registers[reg as usize] = value;
    }

    fn start_command(&mut self, command: u8)
    {
        let payload: Vec<u8> = self.fifo_in.drain(..).collect();
        self.commands.push((command, payload));

        let reply = self.replies.pop_front().unwrap_or_default();
        self.registers[ChipRegister::ComIrqReg as usize] = reply.irq;
        self.registers[ChipRegister::ErrorReg as usize] = reply.error;
        self.registers[ChipRegister::ControlReg as usize] = reply.last_bits;
        self.registers[ChipRegister::Status2Reg as usize] = reply.status2;
        self.registers[ChipRegister::FIFOLevelReg as usize] = reply.data.len() as u8;
        self.fifo_out = reply.data.into_iter().collect();
    }

    fn write(&mut self, address: u8, value: u8)
    {
        match address
        {
            a if a == ChipRegister::FIFODataReg as u8 => self.fifo_in.push(value),
            a if a == ChipRegister::FIFOLevelReg as u8 =>
            {
                if value & 0x80 != 0
                {
                    self.fifo_in.clear();
                    self.fifo_out.clear();
                    self.registers[address as usize] = 0;
                }
            }
            a if a == ChipRegister::ComIrqReg as u8 =>
            {
                // Set1 = 0 clears the marked flags
                if value & 0x80 == 0
                {
                    self.registers[address as usize] &= !value;
                }
            }
            a if a == ChipRegister::CommandReg as u8 =>
            {
                self.registers[address as usize] = value;
                if value == ChipCommand::Transceive as u8 || value == ChipCommand::Authent as u8
                {
                    self.start_command(value);
                }
            }
            _ => self.registers[address as usize] = value,
        }
    }

    fn read(&mut self, address: u8) -> u8
    {
        if address == ChipRegister::FIFODataReg as u8
        {
            return self.fifo_out.pop_front().unwrap_or(0);
        }
        self.registers[address as usize]
    }
}

impl SpiInterface for FakeSpi
{
    fn send_receive(&mut self, data: &[u8]) -> Result<Vec<u8>, BusError>
    {
        if self.fail
        {
            return Err(BusError::Transfer("bus unplugged".to_string()));
        }

        self.frames.push(data.to_vec());
        let address = (data[0] >> 1) & 0x3F;
        let mut received = vec![0u8; data.len()];
        if data[0] & 0x80 != 0
        {
            received[1] = self.read(address);
        }
        else
        {
            self.write(address, data[1]);
        }
        Ok(received)
    }
}
