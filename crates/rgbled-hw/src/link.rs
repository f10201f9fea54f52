//! Serial link to the LED controller.

use crate::{Error, Result, BAUD_RATE, READ_TIMEOUT_MS, SETTLE_DELAY_MS};
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, StopBits};
use tracing::debug;

/// Byte sink behind an open connection.
pub type PortStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Fixed serial parameters for the LED controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    /// Pause after opening, while the microcontroller resets.
    pub settle_delay: Duration,
    pub timeout: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
            timeout: Duration::from_millis(READ_TIMEOUT_MS),
        }
    }
}

/// Opens serial endpoints by device identifier.
pub trait PortOpener: Send + Sync {
    /// Opens `device`. Failures are reported as [`Error::ConnectionOpen`].
    fn open(&self, device: &str, settings: &LinkSettings) -> Result<PortStream>;
}

/// Opens real serial ports through tokio-serial.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    fn open(&self, device: &str, settings: &LinkSettings) -> Result<PortStream> {
        let port = tokio_serial::new(device, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.timeout)
            .open_native_async()
            .map_err(|source| Error::ConnectionOpen {
                device: device.to_string(),
                source,
            })?;

        debug!("Opened {} at {} baud", device, settings.baud_rate);
        Ok(Box::new(port))
    }
}

/// An open connection to one device.
pub struct Connection {
    device: String,
    port: PortStream,
}

impl Connection {
    /// Wraps an already opened port.
    pub fn new(device: &str, port: PortStream) -> Self {
        Self {
            device: device.to_string(),
            port,
        }
    }

    /// Returns the device identifier this connection was opened on.
    pub fn device(&self) -> &str {
        &self.device
    }

    pub(crate) fn port_mut(&mut self) -> &mut PortStream {
        &mut self.port
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Closing {}", self.device);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LinkSettings::default();
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.settle_delay, Duration::from_secs(2));
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_open_missing_port_fails() {
        match SerialOpener.open("/dev/rgbled-does-not-exist", &LinkSettings::default()) {
            Err(Error::ConnectionOpen { device, .. }) => {
                assert_eq!(device, "/dev/rgbled-does-not-exist")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a nonexistent port"),
        }
    }
}
