//! Connection session.
//!
//! A [`Session`] owns at most one open connection and remembers the last
//! color that reached the device, so repeated colors are not re-sent. Every
//! state transition is broadcast as a [`SessionEvent`] to subscribers.

use crate::command;
use crate::link::{Connection, LinkSettings, PortOpener, SerialOpener};
use crate::{Error, Result, Rgb};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Capacity of the event channel.
const EVENT_CAPACITY: usize = 16;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connected => write!(f, "connected"),
        }
    }
}

/// Result of a color update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The color was written to the device.
    Sent,
    /// The device already shows this color; nothing was written.
    Unchanged,
}

/// State change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A connection was opened and the device has settled.
    Connected { device: String },
    /// The connection was closed on request.
    Disconnected { device: String },
    /// A color reached the device.
    ColorSent { device: String, color: Rgb },
    /// A write failed and the connection was torn down.
    TransmissionFailed { device: String, reason: String },
}

/// Single-connection session with the LED controller.
pub struct Session {
    opener: Box<dyn PortOpener>,
    settings: LinkSettings,
    connection: Option<Connection>,
    last_sent: Option<Rgb>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Creates a disconnected session using `opener` to reach devices.
    pub fn new<O: PortOpener + 'static>(opener: O, settings: LinkSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            opener: Box::new(opener),
            settings,
            connection: None,
            last_sent: None,
            events,
        }
    }

    /// Creates a disconnected session on real serial ports.
    pub fn serial(settings: LinkSettings) -> Self {
        Self::new(SerialOpener, settings)
    }

    /// Subscribes to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns the current connection state.
    pub fn state(&self) -> LinkState {
        if self.connection.is_some() {
            LinkState::Connected
        } else {
            LinkState::Disconnected
        }
    }

    /// Returns the live connection, if any.
    pub fn current_connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Returns the last color that reached the device on this connection.
    pub fn last_sent(&self) -> Option<Rgb> {
        self.last_sent
    }

    /// Opens `device` and waits for the controller to settle.
    ///
    /// Only valid while disconnected. On failure the session stays
    /// disconnected.
    pub async fn connect(&mut self, device: &str) -> Result<()> {
        if let Some(connection) = &self.connection {
            return Err(Error::AlreadyConnected(connection.device().to_string()));
        }

        let port = self.opener.open(device, &self.settings)?;

        // The board resets when the port opens.
        if !self.settings.settle_delay.is_zero() {
            debug!(
                "Waiting {:?} for {} to settle",
                self.settings.settle_delay, device
            );
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        self.connection = Some(Connection::new(device, port));
        self.last_sent = None;
        info!("Connected to {}", device);
        self.notify(SessionEvent::Connected {
            device: device.to_string(),
        });
        Ok(())
    }

    /// Closes the connection and forgets the last sent color.
    ///
    /// Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        self.last_sent = None;
        let device = connection.device().to_string();
        drop(connection);

        info!("Disconnected from {}", device);
        self.notify(SessionEvent::Disconnected { device });
    }

    /// Shows `color` on the device unless it is already showing it.
    ///
    /// A failed write closes the connection before the error is returned.
    pub async fn set_color(&mut self, color: Rgb) -> Result<SendOutcome> {
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        if self.last_sent == Some(color) {
            debug!("Color {} already sent, skipping", color);
            return Ok(SendOutcome::Unchanged);
        }

        let device = connection.device().to_string();
        match command::send(connection, color).await {
            Ok(()) => {
                self.last_sent = Some(color);
                debug!("Sent {} to {}", color, device);
                self.notify(SessionEvent::ColorSent { device, color });
                Ok(SendOutcome::Sent)
            }
            Err(e) => {
                self.tear_down(device, &e);
                Err(e)
            }
        }
    }

    /// Sends a raw text line. The last sent color is left untouched.
    ///
    /// A failed write closes the connection before the error is returned.
    pub async fn send_line(&mut self, text: &str) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        let device = connection.device().to_string();
        if let Err(e) = command::send_text(connection, text).await {
            self.tear_down(device, &e);
            return Err(e);
        }
        Ok(())
    }

    fn tear_down(&mut self, device: String, reason: &Error) {
        self.connection = None;
        self.last_sent = None;
        warn!("Lost connection to {}: {}", device, reason);
        self.notify(SessionEvent::TransmissionFailed {
            device,
            reason: reason.to_string(),
        });
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("connection", &self.connection)
            .field("last_sent", &self.last_sent)
            .finish_non_exhaustive()
    }
}
