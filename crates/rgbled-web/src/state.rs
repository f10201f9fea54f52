//! Application state management.

use rgbled_hw::{devices, LinkState, Rgb, SendOutcome, Session, SessionEvent};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info};

use crate::config::Config;

/// Point-in-time view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Device of the open connection, if any.
    pub device: Option<String>,
    /// Last color that reached the device.
    pub last_sent: Option<Rgb>,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }
}

/// Shared application state.
pub struct AppState {
    /// Configuration
    config: Config,

    /// The one serial session; handlers take turns through the lock
    session: Mutex<Session>,

    /// Color currently selected in the UI
    color: RwLock<Rgb>,
}

impl AppState {
    /// Creates a new application state on real serial ports.
    pub fn new(config: Config) -> Self {
        let session = Session::serial(config.serial.link_settings());
        Self::with_session(config, session)
    }

    /// Creates a new application state around an existing session.
    pub fn with_session(config: Config, session: Session) -> Self {
        Self {
            config,
            session: Mutex::new(session),
            color: RwLock::new(Rgb::BLACK),
        }
    }

    /// Scans for candidate devices.
    pub fn devices(&self) -> Vec<String> {
        devices::list_devices_in(&self.config.serial.device_dir, &self.config.serial.prefix)
    }

    /// Subscribes to session events.
    pub async fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.lock().await.subscribe()
    }

    /// Returns the current session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            device: session.current_connection().map(|c| c.device().to_string()),
            last_sent: session.last_sent(),
        }
    }

    /// Opens a connection to `device` and pushes the selected color.
    ///
    /// If that first write fails the session is torn down again and the
    /// error is returned.
    pub async fn connect(&self, device: &str) -> rgbled_hw::Result<()> {
        let mut session = self.session.lock().await;
        session.connect(device).await?;
        let color = *self.color.read().await;
        session.set_color(color).await?;
        debug!("Synced {} to {}", color, device);
        Ok(())
    }

    /// Closes the connection, if any.
    pub async fn disconnect(&self) {
        self.session.lock().await.disconnect();
    }

    /// Gets the color currently selected in the UI.
    pub async fn color(&self) -> Rgb {
        *self.color.read().await
    }

    /// Selects `color` and pushes it to the device.
    pub async fn apply_color(&self, color: Rgb) -> rgbled_hw::Result<SendOutcome> {
        *self.color.write().await = color;
        let mut session = self.session.lock().await;
        if session.state() == LinkState::Disconnected {
            return Err(rgbled_hw::Error::NotConnected);
        }
        let outcome = session.set_color(color).await?;
        if outcome == SendOutcome::Sent {
            debug!("Color set to {}", color);
        }
        Ok(outcome)
    }

    /// Closes the connection on shutdown.
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        if session.state() == LinkState::Connected {
            info!("Closing serial connection");
            session.disconnect();
        }
    }
}
