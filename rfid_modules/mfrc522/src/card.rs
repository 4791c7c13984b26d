use serde::Serialize;
use std::fmt;
use strum_macros::Display;

/// Key A as shipped on blank MIFARE Classic cards.
pub const DEFAULT_SECTOR_KEY: [u8; 6] = [0xFF; 6];

pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Display, Serialize)]
pub enum CardType
{
    #[strum(serialize = "MIFARE 1K")]
    #[serde(rename = "MIFARE 1K")]
    Mifare1K,
    #[strum(serialize = "MIFARE 4K")]
    #[serde(rename = "MIFARE 4K")]
    Mifare4K,
    #[strum(serialize = "MIFARE Ultralight")]
    #[serde(rename = "MIFARE Ultralight")]
    MifareUltralight,
    Unknown
}

/// A discovered card. The type is derived from the UID length only,
/// the sector key is always the default key.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Card
{
    pub uid: Vec<u8>,
    pub card_type: CardType,
    /// nominal capacity in bytes
    pub size: usize,
    pub blocks: u8,
    pub sector_key: [u8; 6]
}

impl Card
{
    pub fn from_uid(uid: Vec<u8>) -> Self
    {
        let (card_type, size, blocks) = match uid.len()
        {
            4 => (CardType::Mifare1K, 1024, 64),
            7 => (CardType::MifareUltralight, 512, 16),
            _ => (CardType::Unknown, 0, 0)
        };

        Card
        {
            uid,
            card_type,
            size,
            blocks,
            sector_key: DEFAULT_SECTOR_KEY
        }
    }

    pub fn uid_hex(&self) -> String
    {
        self.uid.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Card
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "UID: {}, Type: {}, Size: {} bytes", self.uid_hex(), self.card_type, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_renders_uid_type_and_size()
    {
        let card = Card::from_uid(vec![0x12, 0x34, 0x56, 0x78]);
        assert_eq!(card.to_string(), "UID: 12345678, Type: MIFARE 1K, Size: 1024 bytes");
    }

    #[test]
    fn uid_is_rendered_lowercase_and_zero_padded()
    {
        let card = Card::from_uid(vec![0x0A, 0xBC, 0x01, 0xFF]);
        assert_eq!(card.uid_hex(), "0abc01ff");
    }

    #[test]
    fn four_byte_uids_are_1k()
    {
        for uid in &[[0u8; 4], [0xFF; 4], [0xDE, 0xAD, 0xBE, 0xEF]]
        {
            let card = Card::from_uid(uid.to_vec());
            assert_eq!(card.card_type, CardType::Mifare1K);
            assert_eq!(card.size, 1024);
            assert_eq!(card.blocks, 64);
        }
    }

    #[test]
    fn seven_byte_uids_are_ultralight()
    {
        let card = Card::from_uid(vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE]);
        assert_eq!(card.card_type, CardType::MifareUltralight);
        assert_eq!(card.size, 512);
        assert_eq!(card.blocks, 16);
        assert_eq!(card.to_string(), "UID: 123456789abcde, Type: MIFARE Ultralight, Size: 512 bytes");
    }

    #[test]
    fn other_lengths_are_unknown()
    {
        for len in &[0usize, 1, 2, 3, 5, 6, 8, 10]
        {
            let card = Card::from_uid(vec![0x11; *len]);
            assert_eq!(card.card_type, CardType::Unknown);
            assert_eq!(card.size, 0);
            assert_eq!(card.blocks, 0);
        }
    }

    #[test]
    fn sector_key_is_always_default()
    {
        assert_eq!(Card::from_uid(vec![1, 2, 3, 4]).sector_key, [0xFF; 6]);
        assert_eq!(Card::from_uid(vec![1, 2]).sector_key, DEFAULT_SECTOR_KEY);
    }

    #[test]
    fn card_serializes_type_name()
    {
        let json = serde_json::to_value(Card::from_uid(vec![1, 2, 3, 4])).unwrap();
        assert_eq!(json["card_type"], "MIFARE 1K");
        assert_eq!(json["blocks"], 64);
    }
}
