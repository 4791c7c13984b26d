extern crate mfrc522;
extern crate rfid_hal;
extern crate rppal;

use std::{env, error::Error, time::Duration};

use mfrc522::{Config, Reader};

mod console;
mod drivers;
mod trace;

use drivers::*;

const DEFAULT_CONFIG: &str = "config.json";

fn main() -> Result<(), Box<dyn Error>>
{
    trace::launch();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = match Config::load(&config_path)
    {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("Could not load {}, using defaults: {}", config_path, e);
            Config::default()
        }
    };

    let spi = RfidSpi::new(&cfg.rfid)?;
    let mut reset_pin = ResetPin::new(cfg.rfid.reset_pin)?;
    mfrc522::hard_reset(&mut reset_pin)?;

    let reader = Reader::init(spi, cfg.rfid.clone())?;
    let polling_interval = Duration::from_millis(cfg.performance.polling_interval_ms);
    let handle = mfrc522::launch(reader, Some(polling_interval))?;

    console::run(handle);
    Ok(())
}
