//! Wire commands for the LED firmware.
//!
//! The firmware reads one ASCII line per color, `R,G,B\n`, with each
//! channel in decimal and no padding.

use crate::link::Connection;
use crate::{Error, Rgb, Result};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Encodes a color as the firmware's `R,G,B\n` command.
pub fn encode(color: Rgb) -> String {
    format!("{},{},{}\n", color.r, color.g, color.b)
}

/// Sends one color command.
///
/// Returns [`Error::Transmission`] on any write failure. The connection is
/// left as-is; closing it is up to the caller.
pub async fn send(connection: &mut Connection, color: Rgb) -> Result<()> {
    write_line(connection, &encode(color)).await
}

/// Sends a free-form text line, trimmed and newline-terminated.
pub async fn send_text(connection: &mut Connection, text: &str) -> Result<()> {
    write_line(connection, &format!("{}\n", text.trim())).await
}

async fn write_line(connection: &mut Connection, line: &str) -> Result<()> {
    debug!("Sending to {}: {:?}", connection.device(), line);

    let port = connection.port_mut();
    port.write_all(line.as_bytes())
        .await
        .map_err(Error::Transmission)?;
    port.flush().await.map_err(Error::Transmission)?;
    Ok(())
}
