/*
*   # The MFRC522 Module
*   This module implements reading and writing MIFARE Classic
*   media (ISO 14443A) using the NXP MFRC522 reader chip.
*
*   The MFRC522 is little more than a PHY for ISO 14443x
*   communication, as it only does the physical bits. Everything
*   above that, i.e. REQA, anticollision, authentication and
*   block access is implemented here, layered as follows:
*
*   transport  -> register reads and writes over SPI
*   mfrc522    -> the chip's command unit, FIFO and completion polling
*   iso14443a  -> card activation, cascade level 1 only
*   mifare     -> authentication and 16 byte block access
*   session    -> the reader, remembering the last card
*
*   ## Usage
*   The module expects to be provided with a completely configured
*   SPI instance. Either use the `Reader` directly from a single
*   thread, or `launch` it into its own thread and talk to it
*   through the returned `ReaderHandle`.
*
*   ### Behavior
*   When launched with a polling interval, the reader searches
*   for media whenever no request arrived within that interval
*   and traces every new card it sees.
*
*   ### Notes
*   The chip's IRQ line is not used, command completion is polled
*   with an upper bound on the number of register reads.
*/
extern crate num_enum;
extern crate rfid_hal;

use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::{thread, time::Duration};

pub mod card;
pub mod config;
pub mod error;
pub mod iso14443a;
pub mod mfrc522;
pub mod mifare;
pub mod registers;
pub mod rfchip;
pub mod session;
pub mod trace_helper;
pub mod transport;

#[cfg(test)]
mod testutils;

pub use card::{Card, CardType, BLOCK_SIZE};
pub use config::{Config, ConfigError, PerformanceConfig, ReaderConfig};
pub use error::ReaderError;
pub use crate::mfrc522::{hard_reset, Mfrc522};
pub use rfchip::RFChip;
pub use session::Reader;

use trace_helper::TraceHelper;

type Reply<T> = Sender<Result<T, ReaderError>>;

/// Everything the reader thread can be asked to do. Each request
/// carries the channel its answer goes to.
pub enum ReaderRequest
{
    Scan(Reply<Card>),
    ReadBlock(u8, Reply<[u8; BLOCK_SIZE]>),
    WriteBlock(u8, Vec<u8>, Reply<()>),
    ReadAllBlocks(Reply<BTreeMap<u8, [u8; BLOCK_SIZE]>>),
    LastCard(Sender<Option<Card>>),
    Presence(Sender<bool>),
    Shutdown
}

/// Moves the reader into its own thread. With a polling interval
/// the thread looks for new cards while it is idle.
pub fn launch<C>(reader: Reader<C>, polling_interval: Option<Duration>) -> std::io::Result<ReaderHandle>
    where C: RFChip + Send + 'static
{
    let (tx, rx) = channel();
    let mut rm = ReaderModule::new(reader, rx, polling_interval);

    thread::Builder::new().name("RFID/Reader".to_string()).spawn(move || {
        rm.run();
    })?;

    Ok(ReaderHandle { requests: tx })
}

struct ReaderModule<C> where C: RFChip
{
    reader: Reader<C>,
    requests: Receiver<ReaderRequest>,
    polling_interval: Option<Duration>,
    tracer: TraceHelper,
    last_uid: Option<Vec<u8>>
}

impl<C: RFChip> ReaderModule<C>
{
    fn new(reader: Reader<C>, requests: Receiver<ReaderRequest>, polling_interval: Option<Duration>) -> Self
    {
        ReaderModule
        {
            reader,
            requests,
            polling_interval,
            tracer: TraceHelper::new("RFID/Reader".to_string()),
            last_uid: None
        }
    }

    fn run(&mut self)
    {
        self.tracer.trace_str("Reader running");
        loop
        {
            let next = match self.polling_interval
            {
                Some(interval) => match self.requests.recv_timeout(interval)
                {
                    Ok(req) => Some(req),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break
                },
                None => match self.requests.recv()
                {
                    Ok(req) => Some(req),
                    Err(_) => break
                }
            };

            match next
            {
                Some(ReaderRequest::Shutdown) => break,
                Some(req) => self.serve(req),
                None => self.search_media()
            }
        }
        self.tracer.trace_str("Reader stopped");
    }

    // A requester that gave up waiting is not an error.
    fn serve(&mut self, req: ReaderRequest)
    {
        match req
        {
            ReaderRequest::Scan(reply) => {
                let res = self.reader.discover_with_retries();
                if let Ok(ref card) = res
                {
                    self.is_new_card(card);
                }
                let _ = reply.send(res);
            },
            ReaderRequest::ReadBlock(block, reply) => {
                let _ = reply.send(self.reader.read_block(block));
            },
            ReaderRequest::WriteBlock(block, data, reply) => {
                let _ = reply.send(self.reader.write_block(block, &data));
            },
            ReaderRequest::ReadAllBlocks(reply) => {
                let _ = reply.send(self.reader.read_all_blocks());
            },
            ReaderRequest::LastCard(reply) => {
                let _ = reply.send(self.reader.last_card().cloned());
            },
            ReaderRequest::Presence(reply) => {
                let _ = reply.send(self.reader.presence());
            },
            ReaderRequest::Shutdown => {}
        }
    }

    /// Records the UID, true if it differs from the one seen before.
    fn is_new_card(&mut self, card: &Card) -> bool
    {
        if self.last_uid.as_ref() == Some(&card.uid)
        {
            return false;
        }
        self.last_uid = Some(card.uid.clone());
        return true;
    }

    fn search_media(&mut self)
    {
        if !self.reader.presence()
        {
            self.last_uid = None;
            return;
        }

        let card = match self.reader.last_card()
        {
            Some(card) => card.clone(),
            None => return
        };

        if self.is_new_card(&card)
        {
            self.tracer.trace(format!("Found new card: {}", card));
        }
    }
}

/// Cheap to clone, every clone talks to the same reader thread.
#[derive(Clone)]
pub struct ReaderHandle
{
    requests: Sender<ReaderRequest>
}

impl ReaderHandle
{
    fn call<T>(&self, make_request: impl FnOnce(Sender<T>) -> ReaderRequest) -> Result<T, ReaderError>
    {
        let (tx, rx) = channel();
        self.requests.send(make_request(tx)).map_err(|_| ReaderError::ReaderGone)?;
        rx.recv().map_err(|_| ReaderError::ReaderGone)
    }

    pub fn scan(&self) -> Result<Card, ReaderError>
    {
        self.call(ReaderRequest::Scan)?
    }

    pub fn read_block(&self, block: u8) -> Result<[u8; BLOCK_SIZE], ReaderError>
    {
        self.call(|reply| ReaderRequest::ReadBlock(block, reply))?
    }

    pub fn write_block(&self, block: u8, data: &[u8]) -> Result<(), ReaderError>
    {
        let data = data.to_vec();
        self.call(|reply| ReaderRequest::WriteBlock(block, data, reply))?
    }

    pub fn read_all_blocks(&self) -> Result<BTreeMap<u8, [u8; BLOCK_SIZE]>, ReaderError>
    {
        self.call(ReaderRequest::ReadAllBlocks)?
    }

    pub fn last_card(&self) -> Result<Option<Card>, ReaderError>
    {
        self.call(ReaderRequest::LastCard)
    }

    pub fn presence(&self) -> Result<bool, ReaderError>
    {
        self.call(ReaderRequest::Presence)
    }

    /// Stops the reader thread. Requests sent afterwards fail
    /// with `ReaderGone`.
    pub fn shutdown(&self)
    {
        let _ = self.requests.send(ReaderRequest::Shutdown);
    }
}
