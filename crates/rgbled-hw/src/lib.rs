//! RGB LED Hardware Library
//!
//! Provides the serial link, color codec and device discovery used to drive
//! an RGB LED attached to a microcontroller (Arduino and compatibles).

pub mod color;
pub mod command;
pub mod devices;
pub mod error;
pub mod link;
pub mod session;

pub use color::{hex_to_rgb, rgb_to_hex, Rgb, TextTone};
pub use error::{Error, Result};
pub use link::{Connection, LinkSettings, PortOpener, SerialOpener};
pub use session::{LinkState, SendOutcome, Session, SessionEvent};

/// Serial baud rate expected by the LED firmware.
pub const BAUD_RATE: u32 = 9600;

/// Delay after opening the port while the microcontroller resets (ms).
pub const SETTLE_DELAY_MS: u64 = 2000;

/// Serial read timeout (ms).
pub const READ_TIMEOUT_MS: u64 = 1000;

/// Directory scanned for serial devices.
pub const DEVICE_DIR: &str = "/dev";

/// File name prefix of candidate serial devices (USB CDC ACM).
pub const DEVICE_PREFIX: &str = "ttyACM";
