//! Error types for the RGB LED hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the LED controller.
#[derive(Error, Debug)]
pub enum Error {
    /// No candidate serial device was found.
    #[error("No serial devices found")]
    NoDeviceFound,

    /// The serial port could not be opened (busy, permission denied, missing).
    #[error("Failed to connect to {device}: {source}")]
    ConnectionOpen {
        device: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// A connection is already open.
    #[error("Already connected to {0}")]
    AlreadyConnected(String),

    /// No connection is open.
    #[error("Not connected to a device")]
    NotConnected,

    /// Writing to an open connection failed.
    #[error("Failed to send data: {0}")]
    Transmission(#[source] std::io::Error),

    /// Color string is not a valid hex or decimal triplet.
    #[error("Invalid color: {0:?}")]
    MalformedColor(String),

    /// Device selection is not a number.
    #[error("Invalid selection: {0:?}")]
    InvalidSelection(String),
}
