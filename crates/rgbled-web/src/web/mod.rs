//! HTMX web UI module.

use askama::Template;
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Router,
};
use rgbled_hw::{hex_to_rgb, Error, Rgb, SendOutcome, SessionEvent, TextTone};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::state::AppState;

/// Main index page template.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

/// One entry of the device selector.
struct DeviceOption {
    path: String,
    selected: bool,
}

/// Connection sidebar partial template.
#[derive(Template)]
#[template(path = "partials/devices.html")]
struct DevicesTemplate {
    devices: Vec<DeviceOption>,
    connected: bool,
    device: String,
    last_sent: Option<String>,
    error: Option<String>,
}

/// Status badge partial template.
#[derive(Template)]
#[template(path = "partials/status.html")]
struct StatusTemplate {
    connected: bool,
    device: String,
}

/// Color controls partial template.
#[derive(Template)]
#[template(path = "partials/color.html")]
struct ColorTemplate {
    connected: bool,
    hex: String,
    label: String,
    text_color: &'static str,
    r: u8,
    g: u8,
    b: u8,
    error: Option<String>,
}

/// Creates the web router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Main page
        .route("/", get(index))
        // Partials for HTMX
        .route("/devices", get(devices))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/status", get(status))
        .route("/color", get(color_get).post(color_set))
        // Session events
        .route("/events", get(events))
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Renders a template, turning failures into a 500.
fn render<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!("Template error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render page: {}", e),
            )
                .into_response()
        }
    }
}

/// GET / - Main page
async fn index() -> Response {
    render(IndexTemplate)
}

/// Builds the connection sidebar.
async fn devices_view(state: &AppState, error: Option<String>) -> Response {
    let snapshot = state.snapshot().await;
    let connected_device = snapshot.device.clone().unwrap_or_default();
    let devices = state
        .devices()
        .into_iter()
        .map(|path| DeviceOption {
            selected: path == connected_device,
            path,
        })
        .collect();

    render(DevicesTemplate {
        devices,
        connected: snapshot.is_connected(),
        device: connected_device,
        last_sent: snapshot
            .last_sent
            .map(|c| format!("({}, {}, {})", c.r, c.g, c.b)),
        error,
    })
}

/// GET /devices - Connection sidebar partial (rescans devices)
async fn devices(State(state): State<Arc<AppState>>) -> Response {
    devices_view(&state, None).await
}

/// Form data for connecting.
#[derive(Deserialize)]
struct ConnectForm {
    device: String,
}

/// POST /connect - Open the selected device
async fn connect(State(state): State<Arc<AppState>>, Form(form): Form<ConnectForm>) -> Response {
    // Only enumerated devices may be opened.
    let error = if !state.devices().contains(&form.device) {
        Some(format!("Unknown device: {}", form.device))
    } else {
        state.connect(&form.device).await.err().map(|e| e.to_string())
    };
    devices_view(&state, error).await
}

/// POST /disconnect - Close the connection
async fn disconnect(State(state): State<Arc<AppState>>) -> Response {
    state.disconnect().await;
    devices_view(&state, None).await
}

/// GET /status - Connection status partial
async fn status(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.snapshot().await;
    render(StatusTemplate {
        connected: snapshot.is_connected(),
        device: snapshot.device.unwrap_or_default(),
    })
}

/// Builds the color controls for `color`.
async fn color_view(state: &AppState, color: Rgb, error: Option<String>) -> Response {
    let connected = state.snapshot().await.is_connected();
    let hex = color.to_hex();
    render(ColorTemplate {
        connected,
        label: hex.to_uppercase(),
        hex,
        text_color: TextTone::for_background(color).css(),
        r: color.r,
        g: color.g,
        b: color.b,
        error,
    })
}

/// GET /color - Color controls partial
async fn color_get(State(state): State<Arc<AppState>>) -> Response {
    let color = state.color().await;
    color_view(&state, color, None).await
}

/// Form data for colors, from either the picker or the sliders.
#[derive(Deserialize)]
struct ColorForm {
    hex: Option<String>,
    r: Option<u8>,
    g: Option<u8>,
    b: Option<u8>,
}

impl ColorForm {
    /// Slider values win over the picker when both are present.
    fn color(&self) -> rgbled_hw::Result<Rgb> {
        match (self.r, self.g, self.b, self.hex.as_deref()) {
            (Some(r), Some(g), Some(b), _) => Ok(Rgb::new(r, g, b)),
            (_, _, _, Some(hex)) => hex_to_rgb(hex),
            _ => Err(Error::MalformedColor(String::new())),
        }
    }
}

/// POST /color - Select a color and send it to the device
async fn color_set(State(state): State<Arc<AppState>>, Form(form): Form<ColorForm>) -> Response {
    let color = match form.color() {
        Ok(color) => color,
        Err(e) => {
            let current = state.color().await;
            return color_view(&state, current, Some(e.to_string())).await;
        }
    };

    let error = match state.apply_color(color).await {
        Ok(SendOutcome::Sent) | Ok(SendOutcome::Unchanged) => None,
        Err(e) => Some(e.to_string()),
    };
    color_view(&state, color, error).await
}

/// Session event as pushed to the browser.
#[derive(Debug, Serialize)]
struct EventPayload {
    kind: &'static str,
    device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl EventPayload {
    /// SSE event name: `color` for sends, `link` for connection changes.
    fn channel(&self) -> &'static str {
        if self.kind == "color_sent" {
            "color"
        } else {
            "link"
        }
    }
}

impl From<&SessionEvent> for EventPayload {
    fn from(event: &SessionEvent) -> Self {
        let (kind, device, color, reason) = match event {
            SessionEvent::Connected { device } => ("connected", device, None, None),
            SessionEvent::Disconnected { device } => ("disconnected", device, None, None),
            SessionEvent::ColorSent { device, color } => {
                ("color_sent", device, Some(color.to_hex()), None)
            }
            SessionEvent::TransmissionFailed { device, reason } => {
                ("transmission_failed", device, None, Some(reason.clone()))
            }
        };
        Self {
            kind,
            device: device.clone(),
            color,
            reason,
        }
    }
}

/// GET /events - Server-sent session events
async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    debug!("Event stream opened");
    let stream = BroadcastStream::new(state.subscribe().await).map(|message| match message {
        Ok(event) => {
            let payload = EventPayload::from(&event);
            Event::default().event(payload.channel()).json_data(&payload)
        }
        // Missed events: ask the page to resync everything.
        Err(e) => Ok(Event::default().event("link").data(e.to_string())),
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
