use crate::error::BusError;

/// A digital output, used for the reset line of the reader chip.
pub trait OutputPin
{
    fn set_high(&mut self) -> Result<(), BusError>;
    fn set_low(&mut self) -> Result<(), BusError>;
}
