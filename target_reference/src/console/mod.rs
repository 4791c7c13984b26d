use mfrc522::{ReaderHandle, BLOCK_SIZE};
use std::io::{self, BufRead};

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand
{
    Scan,
    Card,
    Read(u8),
    Write(u8, Vec<u8>),
    Dump,
    Quit
}

const USAGE: &str = "commands: scan | card | read <block> | write <block> <32 hex chars> | dump | quit";

pub fn parse_hex(text: &str) -> Result<Vec<u8>, String>
{
    if text.len() % 2 != 0 || !text.is_ascii()
    {
        return Err(format!("not a hex string: {}", text));
    }

    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| format!("not a hex string: {}", text)))
        .collect()
}

fn parse_block(arg: Option<&str>) -> Result<u8, String>
{
    match arg
    {
        Some(text) => text.parse::<u8>().map_err(|_| format!("invalid block number: {}", text)),
        None => Err("block number missing".to_string())
    }
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String>
{
    let mut words = line.split_whitespace();
    let cmd = match words.next()
    {
        Some(cmd) => cmd,
        None => return Err(USAGE.to_string())
    };

    let res = match cmd
    {
        "scan" => ConsoleCommand::Scan,
        "card" => ConsoleCommand::Card,
        "dump" => ConsoleCommand::Dump,
        "quit" | "exit" => ConsoleCommand::Quit,
        "read" => ConsoleCommand::Read(parse_block(words.next())?),
        "write" => {
            let block = parse_block(words.next())?;
            let data = parse_hex(words.next().unwrap_or(""))?;
            if data.len() != BLOCK_SIZE
            {
                return Err(format!("expected {} bytes of data, got {}", BLOCK_SIZE, data.len()));
            }
            ConsoleCommand::Write(block, data)
        },
        _ => return Err(USAGE.to_string())
    };

    if words.next().is_some()
    {
        return Err(USAGE.to_string());
    }
    Ok(res)
}

fn to_hex(data: &[u8]) -> String
{
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Handles one command, false once the user asked to leave.
fn execute(handle: &ReaderHandle, cmd: ConsoleCommand) -> bool
{
    match cmd
    {
        ConsoleCommand::Scan => match handle.scan()
        {
            Ok(card) => println!("{}", card),
            Err(e) => println!("scan failed: {}", e)
        },
        ConsoleCommand::Card => match handle.last_card()
        {
            Ok(Some(card)) => println!("{}", card),
            Ok(None) => println!("no card seen yet"),
            Err(e) => println!("error: {}", e)
        },
        ConsoleCommand::Read(block) => match handle.read_block(block)
        {
            Ok(data) => println!("{:3}: {}", block, to_hex(&data)),
            Err(e) => println!("read of block {} failed: {}", block, e)
        },
        ConsoleCommand::Write(block, data) => match handle.write_block(block, &data)
        {
            Ok(()) => println!("block {} written", block),
            Err(e) => println!("write of block {} failed: {}", block, e)
        },
        ConsoleCommand::Dump => match handle.read_all_blocks()
        {
            Ok(blocks) => {
                for (block, data) in blocks.iter()
                {
                    println!("{:3}: {}", block, to_hex(data));
                }
            },
            Err(e) => println!("dump failed: {}", e)
        },
        ConsoleCommand::Quit => return false
    }
    true
}

pub fn run(handle: ReaderHandle)
{
    println!("{}", USAGE);
    let stdin = io::stdin();
    for line in stdin.lock().lines()
    {
        let line = match line
        {
            Ok(line) => line,
            Err(error) => {
                println!("error: {}", error);
                break;
            }
        };

        if line.trim().is_empty()
        {
            continue;
        }

        match parse_command(&line)
        {
            Ok(cmd) => {
                if !execute(&handle, cmd)
                {
                    break;
                }
            },
            Err(msg) => println!("{}", msg)
        }
    }
    handle.shutdown();
}
