/*
    # Reader configuration

    Stored as JSON. Every field is optional in the file, missing
    ones take their default. Values are sanity checked against the
    limits of the Raspberry Pi after loading.
*/
use crate::registers::DEFAULT_POLL_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

const DEFAULT_RESET_PIN: u8 = 22;
const DEFAULT_IRQ_PIN: u8 = 18;
const GPIO_MAX: u8 = 53;
const MIN_SPI_SPEED: u32 = 100_000;
const MAX_RETRY_COUNT: u32 = 10;
const MIN_POLLING_INTERVAL_MS: u64 = 10;
const MAX_POLLING_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("cannot access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig
{
    pub spi_bus: u8,
    pub spi_device: u8,
    pub reset_pin: u8,
    /// Kept for wiring documentation, completion is polled
    pub irq_pin: u8,
    /// Hz
    pub spi_speed: u32,
    pub spi_max_speed: u32,
    /// Extra discovery attempts after the first one
    pub retry_count: u32,
    /// Upper bound of the completion poll per chip command
    pub poll_iterations: u32
}

impl Default for ReaderConfig
{
    fn default() -> Self
    {
        ReaderConfig
        {
            spi_bus: 0,
            spi_device: 0,
            reset_pin: DEFAULT_RESET_PIN,
            irq_pin: DEFAULT_IRQ_PIN,
            spi_speed: 500_000,
            spi_max_speed: 32_000_000,
            retry_count: 3,
            poll_iterations: DEFAULT_POLL_ITERATIONS
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig
{
    pub polling_interval_ms: u64
}

impl Default for PerformanceConfig
{
    fn default() -> Self
    {
        PerformanceConfig
        {
            polling_interval_ms: 100
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    pub rfid: ReaderConfig,
    pub performance: PerformanceConfig
}

impl Config
{
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError>
    {
        let file = File::open(path)?;
        let mut config: Config = serde_json::from_reader(file)?;
        config.validate_and_adjust();
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError>
    {
        let writer = File::create(path)?;
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn validate_and_adjust(&mut self)
    {
        let rfid = &mut self.rfid;

        if rfid.spi_speed > rfid.spi_max_speed
        {
            rfid.spi_speed = rfid.spi_max_speed;
        }
        if rfid.spi_speed < MIN_SPI_SPEED
        {
            rfid.spi_speed = MIN_SPI_SPEED;
        }

        if rfid.reset_pin > GPIO_MAX
        {
            rfid.reset_pin = DEFAULT_RESET_PIN;
        }
        if rfid.irq_pin > GPIO_MAX
        {
            rfid.irq_pin = DEFAULT_IRQ_PIN;
        }

        if rfid.retry_count > MAX_RETRY_COUNT
        {
            rfid.retry_count = MAX_RETRY_COUNT;
        }

        if rfid.poll_iterations == 0
        {
            rfid.poll_iterations = DEFAULT_POLL_ITERATIONS;
        }

        let perf = &mut self.performance;
        perf.polling_interval_ms = perf.polling_interval_ms
            .max(MIN_POLLING_INTERVAL_MS)
            .min(MAX_POLLING_INTERVAL_MS);
    }
}
