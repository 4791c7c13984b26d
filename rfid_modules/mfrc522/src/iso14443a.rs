use crate::{error::ReaderError, registers::*, rfchip::RFChip};

const ATQA_LEN: usize = 2;
const ANTICOLL_ANSWER_LEN: usize = 5;

/// Validate the XOR block check character at the end of an
/// anticollision answer.
pub fn check_bcc(data: &[u8]) -> Result<(), ReaderError>
{
    let (bcc, uid) = match data.split_last()
    {
        Some(split) => split,
        None => return Err(ReaderError::CollisionOrChecksumFailure)
    };

    let expected = uid.iter().fold(0u8, |acc, b| acc ^ b);
    if expected != *bcc
    {
        return Err(ReaderError::CollisionOrChecksumFailure);
    }
    Ok(())
}

/// Card activation for ISO 14443A, cascade level 1 only.
pub struct Iso14443A<'a, T> where T: RFChip
{
    rf_chip: &'a mut T
}

impl<'a, T: RFChip> Iso14443A<'a, T>
{
    pub fn new(chip: &'a mut T) -> Self
    {
        Self {
            rf_chip: chip
        }
    }

    fn do_picc_command(&mut self, cmd: PiccCommand, data: Option<Vec<u8>>) -> Result<Vec<u8>, ReaderError>
    {
        let mut frame: Vec<u8> = vec![cmd.into()];
        if let Some(mut payload) = data
        {
            frame.append(&mut payload);
        }
        self.rf_chip.transceive(frame)
    }

    /// Wake idle cards, returns the ATQA.
    pub fn request(&mut self) -> Result<Vec<u8>, ReaderError>
    {
        // REQA is a short frame, only 7 bits of the byte go out
        self.rf_chip.set_tx_last_bits(7)?;

        match self.do_picc_command(PiccCommand::ReqIdl, None)
        {
            Ok(atqa) if atqa.len() == ATQA_LEN => Ok(atqa),
            Err(ReaderError::Bus(e)) => Err(ReaderError::Bus(e)),
            _ => Err(ReaderError::NoCardDetected)
        }
    }

    /// Single anticollision round, returns the 4 UID bytes.
    pub fn anticollision(&mut self) -> Result<Vec<u8>, ReaderError>
    {
        self.rf_chip.set_tx_last_bits(0)?;

        let res = self.do_picc_command(PiccCommand::AnticollCasc1, Some(vec![ANTICOLL_NVB]))?;

        // There is no real anticollision loop here, we only
        // support cards that answer in a single round.
        if res.len() != ANTICOLL_ANSWER_LEN
        {
            return Err(ReaderError::CollisionOrChecksumFailure);
        }

        // Catches answers that were cut short or garbled
        check_bcc(&res)?;

        Ok(res[0..4].to_vec())
    }

    /// REQA followed by anticollision.
    pub fn search_card(&mut self) -> Result<Vec<u8>, ReaderError>
    {
        let _atqa = self.request()?;
        self.anticollision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfchip::MockRFChip;
    use mockall::predicate::*;

    fn bcc(uid: &[u8]) -> u8
    {
        uid.iter().fold(0, |acc, b| acc ^ b)
    }

    #[test]
    fn bcc_accepts_matching_checksum()
    {
        assert!(check_bcc(&[0x12, 0x34, 0x56, 0x78, 0x08]).is_ok());
        assert!(check_bcc(&[0x00, 0x00, 0x00, 0x00, 0x00]).is_ok());
    }

    #[test]
    fn bcc_rejects_any_wrong_checksum()
    {
        let uid = [0xDE, 0xAD, 0xBE, 0xEF];
        let good = bcc(&uid);
        for candidate in 0..=255u8
        {
            let mut answer = uid.to_vec();
            answer.push(candidate);
            assert_eq!(check_bcc(&answer).is_ok(), candidate == good);
        }
    }

    #[test]
    fn bcc_rejects_empty_answer()
    {
        assert!(check_bcc(&[]).is_err());
    }

    #[test]
    fn request_sends_reqa_as_short_frame()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_transceive()
            .with(eq(vec![0x26]))
            .times(1)
            .returning(|_| Ok(vec![0x04, 0x00]));

        let mut iso = Iso14443A::new(&mut mock);
        assert_eq!(iso.request().unwrap(), vec![0x04, 0x00]);
    }

    #[test]
    fn request_without_answer_is_no_card()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits().returning(|_| Ok(()));
        mock.expect_transceive().returning(|_| Err(ReaderError::ChipProtocolError));

        let mut iso = Iso14443A::new(&mut mock);
        assert!(matches!(iso.request(), Err(ReaderError::NoCardDetected)));
    }

    #[test]
    fn request_with_wrong_atqa_length_is_no_card()
    {
        for answer in vec![vec![], vec![0x04], vec![0x04, 0x00, 0x00]]
        {
            let mut mock = MockRFChip::new();
            mock.expect_set_tx_last_bits().returning(|_| Ok(()));
            mock.expect_transceive().returning(move |_| Ok(answer.clone()));

            let mut iso = Iso14443A::new(&mut mock);
            assert!(matches!(iso.request(), Err(ReaderError::NoCardDetected)));
        }
    }

    #[test]
    fn anticollision_returns_uid_without_bcc()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits()
            .with(eq(0))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_transceive()
            .with(eq(vec![0x93, 0x20]))
            .times(1)
            .returning(|_| Ok(vec![0x12, 0x34, 0x56, 0x78, 0x08]));

        let mut iso = Iso14443A::new(&mut mock);
        assert_eq!(iso.anticollision().unwrap(), vec![0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn anticollision_rejects_bad_bcc()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits().returning(|_| Ok(()));
        mock.expect_transceive().returning(|_| Ok(vec![0x12, 0x34, 0x56, 0x78, 0x09]));

        let mut iso = Iso14443A::new(&mut mock);
        assert!(matches!(iso.anticollision(), Err(ReaderError::CollisionOrChecksumFailure)));
    }

    #[test]
    fn anticollision_rejects_wrong_length()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits().returning(|_| Ok(()));
        mock.expect_transceive().returning(|_| Ok(vec![0x12, 0x34, 0x26]));

        let mut iso = Iso14443A::new(&mut mock);
        assert!(matches!(iso.anticollision(), Err(ReaderError::CollisionOrChecksumFailure)));
    }

    #[test]
    fn anticollision_passes_engine_errors_through()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits().returning(|_| Ok(()));
        mock.expect_transceive().returning(|_| Err(ReaderError::Timeout));

        let mut iso = Iso14443A::new(&mut mock);
        assert!(matches!(iso.anticollision(), Err(ReaderError::Timeout)));
    }

    #[test]
    fn search_card_stops_after_failed_request()
    {
        let mut mock = MockRFChip::new();
        mock.expect_set_tx_last_bits()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(()));
        // only the REQA goes out, no anticollision
        mock.expect_transceive()
            .with(eq(vec![0x26]))
            .times(1)
            .returning(|_| Ok(vec![]));

        let mut iso = Iso14443A::new(&mut mock);
        assert!(matches!(iso.search_card(), Err(ReaderError::NoCardDetected)));
    }
}
