//! RGB LED Control Tool
//!
//! Console front end for serial RGB LED controllers: list devices, send a
//! single color, or run the interactive prompt.

mod console;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rgbled_hw::{command, devices, Error, LinkSettings, Rgb, Session};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rgbledctl")]
#[command(about = "Send RGB colors to a serial LED controller")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory scanned for serial devices
    #[arg(long, global = true, default_value = rgbled_hw::DEVICE_DIR)]
    dir: String,

    /// Device name prefix
    #[arg(long, global = true, default_value = rgbled_hw::DEVICE_PREFIX)]
    prefix: String,

    /// Delay after opening the port, in milliseconds
    #[arg(long, global = true, default_value_t = rgbled_hw::SETTLE_DELAY_MS)]
    settle_ms: u64,

    /// Defaults to the interactive console
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate serial devices
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,

        /// Ask the serial backend instead of scanning the device directory
        #[arg(long)]
        ports: bool,
    },
    /// Send one color and exit
    Send {
        /// Device path (default: first device found)
        #[arg(short, long)]
        device: Option<String>,

        /// Color: #rrggbb, rrggbb or r,g,b
        color: String,
    },
    /// Pick a device and send lines interactively
    Console {
        /// Device path (skips the selection prompt)
        #[arg(short, long)]
        device: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = LinkSettings {
        settle_delay: Duration::from_millis(cli.settle_ms),
        ..LinkSettings::default()
    };

    match cli.command {
        Some(Commands::List { json, ports }) => handle_list(&cli.dir, &cli.prefix, json, ports),
        Some(Commands::Send { device, color }) => {
            handle_send(&cli.dir, &cli.prefix, device, &color, settings).await
        }
        Some(Commands::Console { device }) => {
            handle_console(&cli.dir, &cli.prefix, device, settings).await
        }
        None => handle_console(&cli.dir, &cli.prefix, None, settings).await,
    }
}

fn handle_list(dir: &str, prefix: &str, json: bool, ports: bool) -> Result<()> {
    let found = if ports {
        devices::list_serial_ports(prefix)
    } else {
        devices::list_devices_in(dir, prefix)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if found.is_empty() {
        println!("No devices found!");
    } else {
        for (index, device) in found.iter().enumerate() {
            println!("[{}] {}", index + 1, device);
        }
    }

    Ok(())
}

async fn handle_send(
    dir: &str,
    prefix: &str,
    device: Option<String>,
    color: &str,
    settings: LinkSettings,
) -> Result<()> {
    // Validate before touching the hardware
    let color: Rgb = color.parse()?;

    let device = match device {
        Some(device) => device,
        None => devices::list_devices_in(dir, prefix)
            .into_iter()
            .next()
            .ok_or(Error::NoDeviceFound)?,
    };

    let mut session = Session::serial(settings);
    session
        .connect(&device)
        .await
        .with_context(|| format!("Could not open port '{}'", device))?;
    session
        .set_color(color)
        .await
        .context("Failed to send color")?;
    session.disconnect();

    println!("Sent {} to {}", command::encode(color).trim_end(), device);
    Ok(())
}

async fn handle_console(
    dir: &str,
    prefix: &str,
    device: Option<String>,
    settings: LinkSettings,
) -> Result<()> {
    let candidates = match device {
        Some(device) => vec![device],
        None => devices::list_devices_in(dir, prefix),
    };
    let mut session = Session::serial(settings);
    console::run(&mut session, &candidates).await
}
