//! Memory and invocation commands: read, write, peek, poke, call, exec.

use std::path::PathBuf;

use anyhow::{Context, Result};
use nxdbg::Client;

/// Parses a `u32` given in decimal or `0x`-prefixed hex.
pub(crate) fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid number `{s}`: {e}"))
}

/// Bytes given on the command line as a hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HexBytes(Vec<u8>);

/// Parses a hex byte string, ignoring whitespace.
fn parse_bytes(s: &str) -> Result<HexBytes, String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact)
        .map(HexBytes)
        .map_err(|e| format!("invalid hex `{s}`: {e}"))
}

/// Arguments for `nxdbg read`.
#[derive(clap::Args)]
pub(crate) struct ReadArgs {
    /// Start address.
    #[arg(value_parser = parse_u32)]
    pub address: u32,

    /// Number of bytes.
    #[arg(value_parser = parse_u32)]
    pub size: u32,

    /// Print raw hex without addresses.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for `nxdbg write`.
#[derive(clap::Args)]
pub(crate) struct WriteArgs {
    /// Start address.
    #[arg(value_parser = parse_u32)]
    pub address: u32,

    /// Bytes to write, hex-encoded (e.g. `deadbeef`).
    #[arg(value_parser = parse_bytes)]
    pub data: HexBytes,
}

/// Integer width for `peek` and `poke`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub(crate) enum Width {
    /// One byte.
    #[value(name = "8")]
    U8,
    /// Two bytes.
    #[value(name = "16")]
    U16,
    /// Four bytes.
    #[value(name = "32")]
    U32,
}

/// Arguments for `nxdbg peek`.
#[derive(clap::Args)]
pub(crate) struct PeekArgs {
    /// Address to read.
    #[arg(value_parser = parse_u32)]
    pub address: u32,

    /// Integer width in bits.
    #[arg(short = 'w', long, default_value = "32")]
    pub width: Width,
}

/// Arguments for `nxdbg poke`.
#[derive(clap::Args)]
pub(crate) struct PokeArgs {
    /// Address to write.
    #[arg(value_parser = parse_u32)]
    pub address: u32,

    /// Value to store.
    #[arg(value_parser = parse_u32)]
    pub value: u32,

    /// Integer width in bits.
    #[arg(short = 'w', long, default_value = "32")]
    pub width: Width,
}

/// Arguments for `nxdbg call`.
#[derive(clap::Args)]
pub(crate) struct CallArgs {
    /// Entry address.
    #[arg(value_parser = parse_u32)]
    pub address: u32,

    /// Stack image, hex-encoded.
    #[arg(short = 's', long, value_parser = parse_bytes)]
    pub stack: Option<HexBytes>,

    /// Print the whole register dump instead of the result register.
    #[arg(long)]
    pub dump: bool,
}

/// Arguments for `nxdbg exec`.
#[derive(clap::Args)]
pub(crate) struct ExecArgs {
    /// File containing raw machine code.
    pub code: PathBuf,

    /// Stack image, hex-encoded.
    #[arg(short = 's', long, value_parser = parse_bytes)]
    pub stack: Option<HexBytes>,
}

pub(crate) fn read(xbox: &mut Client, args: &ReadArgs) -> Result<()> {
    let data = xbox
        .read(args.address, args.size as usize)
        .with_context(|| format!("read {:#010x}+{:#x}", args.address, args.size))?;
    if args.raw {
        println!("{}", hex::encode(&data));
        return Ok(());
    }
    for (row, line) in (0u64..).zip(data.chunks(16)) {
        let offset = u64::from(args.address) + row * 16;
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() { char::from(b) } else { '.' })
            .collect();
        println!("{offset:08x}  {:<47}  {ascii}", spaced_hex(line));
    }
    Ok(())
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn write(xbox: &mut Client, args: &WriteArgs) -> Result<()> {
    let data = &args.data.0;
    xbox.write(args.address, data)
        .with_context(|| format!("write {} bytes at {:#010x}", data.len(), args.address))
}

pub(crate) fn peek(xbox: &mut Client, args: &PeekArgs) -> Result<()> {
    let value = match args.width {
        Width::U8 => u32::from(xbox.read_u8(args.address)?),
        Width::U16 => u32::from(xbox.read_u16(args.address)?),
        Width::U32 => xbox.read_u32(args.address)?,
    };
    println!("{value:#x}");
    Ok(())
}

pub(crate) fn poke(xbox: &mut Client, args: &PokeArgs) -> Result<()> {
    match args.width {
        Width::U8 => {
            let value = u8::try_from(args.value).context("value does not fit in 8 bits")?;
            xbox.write_u8(args.address, value)?;
        }
        Width::U16 => {
            let value = u16::try_from(args.value).context("value does not fit in 16 bits")?;
            xbox.write_u16(args.address, value)?;
        }
        Width::U32 => xbox.write_u32(args.address, args.value)?,
    }
    Ok(())
}

pub(crate) fn call(xbox: &mut Client, args: &CallArgs) -> Result<()> {
    let stack = args.stack.as_ref().map(|s| s.0.as_slice());
    if args.dump {
        let dump = xbox.call_raw(args.address, stack)?;
        for (slot, word) in dump.as_bytes().chunks(4).enumerate() {
            println!("[{:2}] {}", slot, spaced_hex(word));
        }
    } else {
        println!("{:#010x}", xbox.call(args.address, stack)?);
    }
    Ok(())
}

pub(crate) fn exec(xbox: &mut Client, args: &ExecArgs) -> Result<()> {
    let code = std::fs::read(&args.code)
        .with_context(|| format!("failed to read {}", args.code.display()))?;
    let stack = args.stack.as_ref().map(|s| s.0.as_slice());
    let result = xbox.execute(&code, stack)?;
    println!("{result:#010x}");
    Ok(())
}
