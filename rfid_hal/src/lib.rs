/*
*   # Board abstraction for the RFID reader
*   The driver crates only talk to the hardware through the
*   traits in here, the concrete board (e.g. the RasPi target)
*   provides the implementations.
*/

extern crate thiserror;

pub mod error;
pub mod gpio;
pub mod spi;

pub use error::BusError;
