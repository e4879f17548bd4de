//! CLI for the nxdbg remote debug stub.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod config;
mod mem;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nxdbg::Client;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nxdbg", version, about = "Remote debug client for the nxdk debug stub")]
struct Cli {
    /// Target host name or address.
    #[arg(short = 't', long, env = "NXDBG_TARGET", global = true)]
    target: Option<String>,

    /// Stub TCP port.
    #[arg(short = 'p', long, global = true)]
    port: Option<u16>,

    /// Override the bytes per MEM_READ exchange.
    #[arg(long, global = true)]
    read_chunk: Option<usize>,

    /// Override the bytes per MEM_WRITE exchange.
    #[arg(long, global = true)]
    write_chunk: Option<usize>,

    /// Client configuration file (TOML).
    #[arg(short = 'c', long, global = true, default_value = "nxdbg.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display target system information.
    Info,

    /// Print a line on the target's debug screen.
    Print {
        /// Text to print.
        text: String,
    },

    /// Switch the target display.
    Screen {
        /// Screen to show.
        which: Screen,
    },

    /// Allocate target memory and print its address.
    Malloc {
        /// Size in bytes.
        #[arg(value_parser = mem::parse_u32)]
        size: u32,
    },

    /// Free target memory.
    Free {
        /// Address returned by `malloc`.
        #[arg(value_parser = mem::parse_u32)]
        address: u32,
    },

    /// Hex-dump a range of target memory.
    Read(mem::ReadArgs),

    /// Write hex-encoded bytes into target memory.
    Write(mem::WriteArgs),

    /// Read one little-endian integer.
    Peek(mem::PeekArgs),

    /// Write one little-endian integer.
    Poke(mem::PokeArgs),

    /// Call code at a target address and print the result register.
    Call(mem::CallArgs),

    /// Inject a raw code file, call it, and free it again.
    Exec(mem::ExecArgs),

    /// Reboot the target.
    Reboot,

    /// Run the connectivity smoke test.
    Demo,

    /// Print the default client configuration.
    GenConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Screen {
    /// The text debug screen.
    Debug,
    /// The graphical front screen.
    Front,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = cli.dispatch() {
        eprintln!("nxdbg: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        if matches!(self.command, Command::GenConfig) {
            print!("{}", config::render_default()?);
            return Ok(());
        }

        let mut cfg = config::load(&self.config)?;
        if let Some(bytes) = self.read_chunk {
            cfg.client.read_chunk = bytes;
        }
        if let Some(bytes) = self.write_chunk {
            cfg.client.write_chunk = bytes;
        }
        let target = self
            .target
            .context("no target given (use --target or NXDBG_TARGET)")?;
        let port = self.port.unwrap_or(cfg.port);
        let mut xbox = Client::connect((target.as_str(), port), cfg.client)
            .with_context(|| format!("failed to connect to {target}:{port}"))?;

        match self.command {
            Command::Info => println!("{}", xbox.sysinfo()?),
            Command::Print { text } => xbox.debug_print(&text)?,
            Command::Screen { which: Screen::Debug } => xbox.show_debug_screen()?,
            Command::Screen { which: Screen::Front } => xbox.show_front_screen()?,
            Command::Malloc { size } => println!("{:#010x}", xbox.malloc(size)?.address),
            Command::Free { address } => xbox.free(address)?,
            Command::Read(args) => mem::read(&mut xbox, &args)?,
            Command::Write(args) => mem::write(&mut xbox, &args)?,
            Command::Peek(args) => mem::peek(&mut xbox, &args)?,
            Command::Poke(args) => mem::poke(&mut xbox, &args)?,
            Command::Call(args) => mem::call(&mut xbox, &args)?,
            Command::Exec(args) => mem::exec(&mut xbox, &args)?,
            Command::Reboot => {
                xbox.reboot()?;
                // The target is gone; nothing left to close cleanly.
                return Ok(());
            }
            Command::Demo => demo(&mut xbox)?,
            Command::GenConfig => {}
        }

        xbox.disconnect()?;
        Ok(())
    }
}

/// Prints system info, greets on screen, and checks a write/read-back.
fn demo(xbox: &mut Client) -> Result<()> {
    println!("{}", xbox.sysinfo().context("sysinfo")?);
    xbox.debug_print("Hello!").context("debug print")?;

    let block = xbox.malloc(1024).context("malloc")?;
    println!("Allocated memory at {:#x}", block.address);

    let val = 0x5a;
    xbox.write_u8(block.address, val)?;
    let back = xbox.read_u8(block.address)?;
    xbox.free(block.address).context("free")?;
    anyhow::ensure!(back == val, "read back {back:#04x}, wrote {val:#04x}");
    println!("Read back {back:#04x}");
    Ok(())
}
