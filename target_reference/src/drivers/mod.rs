use rfid_hal::{gpio::OutputPin, spi::SpiInterface, BusError};
use mfrc522::ReaderConfig;

use rppal::gpio::{Gpio, OutputPin as GpioPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

pub struct RfidSpi
{
    spi: Spi
}

impl RfidSpi
{
    pub fn new(cfg: &ReaderConfig) -> Result<Self, BusError>
    {
        let bus = match cfg.spi_bus
        {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            2 => Bus::Spi2,
            n => return Err(BusError::Transfer(format!("no such SPI bus: {}", n)))
        };
        let slave = match cfg.spi_device
        {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            n => return Err(BusError::Transfer(format!("no such SPI device: {}", n)))
        };

        let spi_interface = Spi::new(bus, slave, cfg.spi_speed, Mode::Mode0)
            .map_err(|e| BusError::Transfer(e.to_string()))?;

        Ok(Self
        {
            spi: spi_interface
        })
    }
}

impl SpiInterface for RfidSpi
{
    // Full duplex, the answer is as long as the request.
    fn send_receive(&mut self, data: &[u8]) -> Result<Vec<u8>, BusError>
    {
        let mut receive_buf = vec![0u8; data.len()];
        let transferred = self.spi.transfer(&mut receive_buf, data)
            .map_err(|e| BusError::Transfer(e.to_string()))?;

        if transferred < data.len()
        {
            return Err(BusError::ShortResponse { expected: data.len(), actual: transferred });
        }
        Ok(receive_buf)
    }
}

pub struct ResetPin
{
    pin: GpioPin
}

impl ResetPin
{
    pub fn new(bcm_pin: u8) -> Result<Self, BusError>
    {
        let gpio = Gpio::new().map_err(|e| BusError::Pin(e.to_string()))?;
        let mut pin = gpio.get(bcm_pin)
            .map_err(|e| BusError::Pin(e.to_string()))?
            .into_output();
        // keep the chip out of reset after we exit
        pin.set_reset_on_drop(false);

        Ok(ResetPin { pin })
    }
}

impl OutputPin for ResetPin
{
    fn set_high(&mut self) -> Result<(), BusError>
    {
        self.pin.set_high();
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), BusError>
    {
        self.pin.set_low();
        Ok(())
    }
}
