/*
    # MIFARE Classic block access

    Every block operation is preceded by its own authentication,
    nothing is cached between operations. Writes are two phase:
    the WRITE command and then the 16 data bytes, each of which
    has to be acknowledged by the card.
*/

use crate::{card::BLOCK_SIZE, error::ReaderError, registers::*, rfchip::RFChip};

const BLOCKS_PER_SECTOR: u8 = 4;

/// The last block of every sector holds the keys and access bits.
pub fn is_sector_trailer(block: u8) -> bool
{
    (block as u16 + 1) % BLOCKS_PER_SECTOR as u16 == 0
}

/// All blocks below `blocks` that carry user data.
pub fn data_blocks(blocks: u8) -> impl Iterator<Item = u8>
{
    (0..blocks).filter(|block| !is_sector_trailer(*block))
}

pub struct MifareClassic<'a, T> where T: RFChip
{
    rf_chip: &'a mut T
}

impl<'a, T: RFChip> MifareClassic<'a, T>
{
    pub fn new(chip: &'a mut T) -> Self
    {
        Self {
            rf_chip: chip
        }
    }

    pub fn authenticate(&mut self, mode: PiccCommand, block: u8, sector_key: &[u8; 6], uid: &[u8]) -> Result<(), ReaderError>
    {
        let mut payload: Vec<u8> = vec![mode.into(), block];
        payload.extend_from_slice(sector_key);
        payload.extend_from_slice(uid);

        match self.rf_chip.authent(payload)
        {
            Ok(()) => {},
            Err(ReaderError::ChipProtocolError) => return Err(ReaderError::AuthenticationFailed),
            Err(e) => return Err(e)
        }

        if !self.rf_chip.crypto1_active()?
        {
            return Err(ReaderError::AuthenticationFailed);
        }
        Ok(())
    }

    pub fn read_block(&mut self, block: u8, sector_key: &[u8; 6], uid: &[u8]) -> Result<[u8; BLOCK_SIZE], ReaderError>
    {
        self.authenticate(PiccCommand::Authent1A, block, sector_key, uid)?;

        let answer = self.rf_chip.transceive(vec![PiccCommand::Read.into(), block])?;
        if answer.len() != BLOCK_SIZE
        {
            return Err(ReaderError::ChipProtocolError);
        }

        let mut data = [0u8; BLOCK_SIZE];
        data.copy_from_slice(&answer);
        Ok(data)
    }

    pub fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE], sector_key: &[u8; 6], uid: &[u8]) -> Result<(), ReaderError>
    {
        self.authenticate(PiccCommand::Authent1A, block, sector_key, uid)?;

        let phase1 = self.rf_chip.transceive(vec![PiccCommand::Write.into(), block]);
        self.expect_ack(phase1)?;

        let phase2 = self.rf_chip.transceive(data.to_vec());
        self.expect_ack(phase2)
    }

    fn expect_ack(&mut self, phase: Result<Vec<u8>, ReaderError>) -> Result<(), ReaderError>
    {
        match phase
        {
            Ok(_) => {},
            Err(ReaderError::ChipProtocolError) => return Err(ReaderError::WriteAcknowledgeFailed),
            Err(e) => return Err(e)
        }

        if !self.rf_chip.crypto1_active()?
        {
            return Err(ReaderError::WriteAcknowledgeFailed);
        }
        Ok(())
    }
}
