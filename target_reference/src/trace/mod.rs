use std::io::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Prints every trace line to stdout, prefixed with the local time.
struct ConsoleTrace
{
    level: Level
}

impl Log for ConsoleTrace
{
    fn enabled(&self, metadata: &Metadata) -> bool
    {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record)
    {
        if !self.enabled(record.metadata())
        {
            return;
        }
        let now = chrono::Local::now();
        println!("{} {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), record.args());
        let _ = io::stdout().flush();
    }

    fn flush(&self)
    {
        let _ = io::stdout().flush();
    }
}

static TRACE: ConsoleTrace = ConsoleTrace { level: Level::Info };

pub fn launch()
{
    if log::set_logger(&TRACE).is_ok()
    {
        log::set_max_level(LevelFilter::Info);
    }
    println!("Trace active");
}
