use crate::error::ReaderError;

#[cfg(test)]
use mockall::automock;

/// What the ISO 14443A and MIFARE layers need from the reader chip.
#[cfg_attr(test, automock)]
pub trait RFChip
{
    /// Number of bits of the last transmitted byte, 0 sends whole bytes.
    fn set_tx_last_bits(&mut self, bits: u8) -> Result<(), ReaderError>;
    /// Send `data` to the card, return what came back.
    fn transceive(&mut self, data: Vec<u8>) -> Result<Vec<u8>, ReaderError>;
    /// Run the MFAuthent command with the given payload.
    fn authent(&mut self, data: Vec<u8>) -> Result<(), ReaderError>;
    /// State of the MFCrypto1On status bit.
    fn crypto1_active(&mut self) -> Result<bool, ReaderError>;
    fn stop_crypto(&mut self) -> Result<(), ReaderError>;
}
