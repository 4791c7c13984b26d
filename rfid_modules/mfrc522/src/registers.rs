/*
    # MFRC522 constant table

    Register indices, PCD commands, PICC commands and the bit
    masks used by the driver, all as listed in the MFRC522
    data sheet (rev. 3.9) and ISO/IEC 14443-3. Nothing in here
    is computed, the values must match the chip exactly.
*/

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Register map, page 0 to 3. Reserved addresses are left out.
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ChipRegister
{
    // Page 0: command and status

    /// R/W: starts and stops command execution (bits 0..3)
    CommandReg          = 0x01,
    /// R/W: interrupt request enable, bit 7 inverts the IRQ pin
    ComIEnReg           = 0x02,
    DivIEnReg           = 0x03,
    /// R/W: interrupt request flags. Writing with bit 7 cleared
    /// clears the flags that are set in the written value
    ComIrqReg           = 0x04,
    DivIrqReg           = 0x05,
    /// R: error flags of the last executed command
    ErrorReg            = 0x06,
    Status1Reg          = 0x07,
    /// R/W: receiver/transmitter state, bit 3 is MFCrypto1On
    Status2Reg          = 0x08,
    /// R/W: input and output of the 64 byte FIFO
    FIFODataReg         = 0x09,
    /// R: number of bytes in the FIFO, W: bit 7 flushes it
    FIFOLevelReg        = 0x0A,
    WaterLevelReg       = 0x0B,
    /// R: bits 0..2 hold the number of valid bits of the last received byte
    ControlReg          = 0x0C,
    /// R/W: bit 7 StartSend, bits 0..2 TxLastBits
    BitFramingReg       = 0x0D,
    CollReg             = 0x0E,

    // Page 1: command

    ModeReg             = 0x11,
    TxModeReg           = 0x12,
    RxModeReg           = 0x13,
    /// R/W: bits 0 and 1 switch the antenna drivers TX1/TX2
    TxControlReg        = 0x14,
    TxAutoReg           = 0x15,
    TxSelReg            = 0x16,
    RxSelReg            = 0x17,
    RxThresholdReg      = 0x18,
    DemodReg            = 0x19,
    MfTxReg             = 0x1C,
    MfRxReg             = 0x1D,
    SerialSpeedReg      = 0x1F,

    // Page 2: configuration

    CRCResultRegH       = 0x21,
    CRCResultRegL       = 0x22,
    ModWidthReg         = 0x24,
    RFCfgReg            = 0x26,
    GsNReg              = 0x27,
    CWGsPReg            = 0x28,
    ModGsPReg           = 0x29,
    TModeReg            = 0x2A,
    TPrescalerReg       = 0x2B,
    TReloadRegH         = 0x2C,
    TReloadRegL         = 0x2D,
    TCounterValueRegH   = 0x2E,
    TCounterValueRegL   = 0x2F,

    // Page 3: test

    TestSel1Reg         = 0x31,
    TestSel2Reg         = 0x32,
    TestPinEnReg        = 0x33,
    TestPinValueReg     = 0x34,
    TestBusReg          = 0x35,
    AutoTestReg         = 0x36,
    /// R: chip type and firmware version, 0x91/0x92 for genuine parts
    VersionReg          = 0x37,
    AnalogTestReg       = 0x38,
    TestDAC1Reg         = 0x39,
    TestDAC2Reg         = 0x3A,
    TestADCReg          = 0x3B,
}

/// Commands of the chip's command unit (CommandReg bits 0..3)
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ChipCommand
{
    Idle             = 0x00,
    Mem              = 0x01,
    GenerateRandomId = 0x02,
    CalcCrc          = 0x03,
    Transmit         = 0x04,
    NoCmdChange      = 0x07,
    Receive          = 0x08,
    Transceive       = 0x0C,        // Send OTA data to txp
    Authent          = 0x0E,
    SoftReset        = 0x0F,
}

/// Commands sent over the air to the card
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive)]
#[repr(u8)]
pub enum PiccCommand
{
    ReqIdl           = 0x26,     // AKA REQA
    ReqAll           = 0x52,
    AnticollCasc1    = 0x93,     // is also select_tag
    Authent1A        = 0x60,
    Authent1B        = 0x61,
    Read             = 0x30,
    Write            = 0xA0,
    Decrement        = 0xC0,
    Increment        = 0xC1,
    Restore          = 0xC2,
    Transfer         = 0xB0,
    Halt             = 0x50
}

/// NVB for the first anticollision round: 2 valid bytes (SEL + NVB)
pub const ANTICOLL_NVB: u8 = 0x20;

// SPI address byte
pub const ADDRESS_MASK: u8 = 0x7E;
pub const READ_FLAG: u8 = 0x80;

// ComIEnReg / ComIrqReg
pub const IRQ_INV: u8 = 0x80;
pub const SET1: u8 = 0x80;
pub const TIMER_IRQ: u8 = 0x01;
pub const IRQ_EN_AUTHENT: u8 = 0x12;   // ErrIEn | IdleIEn
pub const WAIT_IRQ_AUTHENT: u8 = 0x10; // IdleIRq
pub const IRQ_EN_TRANSCEIVE: u8 = 0x77;
pub const WAIT_IRQ_TRANSCEIVE: u8 = 0x30; // RxIRq | IdleIRq

// ErrorReg: BufferOvfl | CollErr | ParityErr | ProtocolErr
pub const ERROR_MASK: u8 = 0x1B;

// FIFOLevelReg
pub const FLUSH_BUFFER: u8 = 0x80;
pub const FIFO_CAPACITY: usize = 16;

// BitFramingReg
pub const START_SEND: u8 = 0x80;
pub const TX_LAST_BITS_MASK: u8 = 0x07;

// ControlReg
pub const RX_LAST_BITS_MASK: u8 = 0x07;

// Status2Reg
pub const MF_CRYPTO1_ON: u8 = 0x08;

// TxControlReg
pub const ANTENNA_ON: u8 = 0x03;

/// Default bound of the completion poll, in register reads
pub const DEFAULT_POLL_ITERATIONS: u32 = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn protocol_bytes_match_datasheet()
    {
        assert_eq!(0x26, u8::from(PiccCommand::ReqIdl));
        assert_eq!(0x93, u8::from(PiccCommand::AnticollCasc1));
        assert_eq!(0x60, u8::from(PiccCommand::Authent1A));
        assert_eq!(0x30, u8::from(PiccCommand::Read));
        assert_eq!(0xA0, u8::from(PiccCommand::Write));
        assert_eq!(0x00, u8::from(ChipCommand::Idle));
        assert_eq!(0x0E, u8::from(ChipCommand::Authent));
        assert_eq!(0x0C, u8::from(ChipCommand::Transceive));
    }

    #[test]
    fn register_indices_match_datasheet()
    {
        assert_eq!(0x01, u8::from(ChipRegister::CommandReg));
        assert_eq!(0x02, u8::from(ChipRegister::ComIEnReg));
        assert_eq!(0x04, u8::from(ChipRegister::ComIrqReg));
        assert_eq!(0x06, u8::from(ChipRegister::ErrorReg));
        assert_eq!(0x08, u8::from(ChipRegister::Status2Reg));
        assert_eq!(0x09, u8::from(ChipRegister::FIFODataReg));
        assert_eq!(0x0A, u8::from(ChipRegister::FIFOLevelReg));
        assert_eq!(0x0C, u8::from(ChipRegister::ControlReg));
        assert_eq!(0x0D, u8::from(ChipRegister::BitFramingReg));
        assert_eq!(0x37, u8::from(ChipRegister::VersionReg));
    }

    #[test]
    fn reserved_addresses_are_not_registers()
    {
        assert!(ChipRegister::try_from(0x00u8).is_err());
        assert!(ChipRegister::try_from(0x10u8).is_err());
        assert_eq!(ChipRegister::try_from(0x0Du8).unwrap(), ChipRegister::BitFramingReg);
    }
}
