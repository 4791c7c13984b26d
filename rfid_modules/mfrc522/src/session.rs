/*
    # Reader session

    Ties the chip to the card that was seen last. Block access
    always targets that card, a failed discovery does not forget
    it. Nothing in here is synchronized, the owner task in lib.rs
    serializes access when more than one party needs the reader.
*/
use std::collections::BTreeMap;

use rfid_hal::spi::SpiInterface;

use crate::{
    card::{Card, BLOCK_SIZE},
    config::ReaderConfig,
    error::ReaderError,
    iso14443a::Iso14443A,
    mfrc522::Mfrc522,
    mifare::{data_blocks, MifareClassic},
    rfchip::RFChip,
    trace_helper::TraceHelper
};

pub struct Reader<C> where C: RFChip
{
    chip: C,
    config: ReaderConfig,
    last_card: Option<Card>,
    tracer: TraceHelper
}

impl<Spi: SpiInterface> Reader<Mfrc522<Spi>>
{
    /// Brings up an MFRC522 on `spi` with the poll bound from
    /// `config` and wraps it into a reader.
    pub fn init(spi: Spi, config: ReaderConfig) -> Result<Self, ReaderError>
    {
        let mut chip = Mfrc522::new(spi, config.poll_iterations);
        let version = chip.init()?;

        let reader = Reader::new(chip, config);
        reader.tracer.trace(format!("MFRC522 version 0x{:02x}", version));
        Ok(reader)
    }
}

impl<C: RFChip> Reader<C>
{
    /// Takes the chip as it is, `config.poll_iterations` is not
    /// applied to it. Use `Reader::init` for an MFRC522.
    pub fn new(chip: C, config: ReaderConfig) -> Self
    {
        Reader
        {
            chip,
            config,
            last_card: None,
            tracer: TraceHelper::new("RFID/Session".to_string())
        }
    }

    pub fn config(&self) -> &ReaderConfig
    {
        &self.config
    }

    /// REQA and anticollision. On success the card becomes the
    /// last card, on failure the previous one is kept.
    pub fn discover(&mut self) -> Result<Card, ReaderError>
    {
        let uid = Iso14443A::new(&mut self.chip).search_card()?;
        let card = Card::from_uid(uid);
        self.tracer.debug(format!("Card detected: {}", card));
        self.last_card = Some(card.clone());
        Ok(card)
    }

    /// `discover`, repeated up to `retry_count` more times.
    pub fn discover_with_retries(&mut self) -> Result<Card, ReaderError>
    {
        let attempts = self.config.retry_count.saturating_add(1);
        let mut attempt = 1;
        loop
        {
            match self.discover()
            {
                Ok(card) => return Ok(card),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    self.tracer.debug(format!("Discovery attempt {}/{} failed: {}", attempt, attempts, e));
                }
            }
            attempt += 1;
        }
    }

    pub fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE], ReaderError>
    {
        let card = self.selected_card()?;
        MifareClassic::new(&mut self.chip).read_block(block, &card.sector_key, &card.uid)
    }

    pub fn write_block(&mut self, block: u8, data: &[u8]) -> Result<(), ReaderError>
    {
        if data.len() != BLOCK_SIZE
        {
            return Err(ReaderError::InvalidArgument(
                format!("data must be exactly {} bytes, got {}", BLOCK_SIZE, data.len())));
        }
        let mut payload = [0u8; BLOCK_SIZE];
        payload.copy_from_slice(data);

        let card = self.selected_card()?;
        MifareClassic::new(&mut self.chip).write_block(block, &payload, &card.sector_key, &card.uid)
    }

    /// Every data block of the last card. Sector trailers are
    /// skipped, blocks that cannot be read are left out.
    pub fn read_all_blocks(&mut self) -> Result<BTreeMap<u8, [u8; BLOCK_SIZE]>, ReaderError>
    {
        let card = self.selected_card()?;
        let mut blocks = BTreeMap::new();

        for block in data_blocks(card.blocks)
        {
            match MifareClassic::new(&mut self.chip).read_block(block, &card.sector_key, &card.uid)
            {
                Ok(data) => {
                    blocks.insert(block, data);
                },
                Err(e) => self.tracer.warn(format!("Failed to read block {}: {}", block, e))
            }
        }
        Ok(blocks)
    }

    pub fn last_card(&self) -> Option<&Card>
    {
        self.last_card.as_ref()
    }

    /// Runs a discovery, true if a card answered.
    pub fn presence(&mut self) -> bool
    {
        match self.discover()
        {
            Ok(_) => true,
            Err(ReaderError::Bus(e)) => {
                self.tracer.warn(format!("Bus failure while polling: {}", e));
                false
            },
            Err(_) => false
        }
    }

    pub fn stop_crypto(&mut self) -> Result<(), ReaderError>
    {
        self.chip.stop_crypto()
    }

    // The card is cloned so the chip can be borrowed mutably next to it.
    fn selected_card(&self) -> Result<Card, ReaderError>
    {
        match self.last_card
        {
            Some(ref card) => Ok(card.clone()),
            None => Err(ReaderError::InvalidArgument("no card selected".to_string()))
        }
    }
}
