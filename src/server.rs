// Control server: HTTP (and optionally zenoh) commands -> serial link
//
// Open loop: a command is written to the robot once, nothing comes back.
// Serial writes block, so they run on tokio's blocking pool.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_TARGET;
use crate::controller::Controller;
use crate::drive::{ArcDrive, Chassis, DriveCommand, Point2D};
use crate::link::{CommandSink, LinkError, SerialLink};
use crate::messages::{ActiveCommand, CommandRequest, InputEvent, RequestError};
use crate::render::render_page;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for applying one request
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("Shared state lock poisoned")]
    Poisoned,

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Failed to render page")]
    Render(#[from] std::fmt::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Request(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Writes every command transition of the page's controller to the serial link
pub struct LinkSink {
    link: Arc<Mutex<SerialLink>>,
}

impl CommandSink for LinkSink {
    fn send(&mut self, command: DriveCommand) {
        let result = match self.link.lock() {
            Ok(mut link) => link.write_command(command).map_err(ServerError::from),
            Err(_) => Err(ServerError::Poisoned),
        };
        match result {
            Ok(()) => info!("Forwarded command {} from control page", command),
            Err(e) => error!("Failed to forward command {}: {}", command, e),
        }
    }
}

/// Shared by every handler and the zenoh bridge
///
/// Lock order: controller, then link.
#[derive(Clone)]
pub struct AppState {
    link: Arc<Mutex<SerialLink>>,
    controller: Arc<Mutex<Controller<LinkSink>>>,
    chassis: Chassis,
}

impl AppState {
    pub fn new(link: SerialLink, chassis: Chassis) -> Self {
        let link = Arc::new(Mutex::new(link));
        let sink = LinkSink { link: link.clone() };
        let controller = Controller::new(chassis, DEFAULT_TARGET.into(), sink);
        Self {
            link,
            controller: Arc::new(Mutex::new(controller)),
            chassis,
        }
    }

    /// Validate a JSON body and write its command to the robot
    ///
    /// Nothing is written unless the body carries a known command character.
    pub fn apply(&self, body: &[u8]) -> Result<DriveCommand, ServerError> {
        let command = CommandRequest::parse(body)?;
        let mut link = self.link.lock().map_err(|_| ServerError::Poisoned)?;
        link.write_command(command)?;
        Ok(command)
    }

    /// Feed one press or release from the control page; returns the active command
    ///
    /// Keyboard and pointer hold controls independently, so a cell held
    /// together with its key sends once.
    pub fn input(&self, body: &[u8]) -> Result<DriveCommand, ServerError> {
        let (control, source, pressed) = InputEvent::parse(body)?;
        let mut controller = self.controller.lock().map_err(|_| ServerError::Poisoned)?;
        if pressed {
            controller.press(control, source);
        } else {
            controller.release(control, source);
        }
        Ok(controller.active_command())
    }

    pub fn active_command(&self) -> Result<DriveCommand, ServerError> {
        let controller = self.controller.lock().map_err(|_| ServerError::Poisoned)?;
        Ok(controller.active_command())
    }
}

/// Run a blocking closure (serial write, lock wait) off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

fn log_failure(what: &str, e: &ServerError) -> StatusCode {
    let status = e.status();
    if status.is_server_error() {
        error!("{} failed: {}", what, e);
    } else {
        warn!("{} rejected: {}", what, e);
    }
    status
}

#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    x: Option<f64>,
    y: Option<f64>,
}

impl TargetQuery {
    fn target(&self) -> Point2D {
        Point2D::new(
            self.x.unwrap_or(DEFAULT_TARGET.0),
            self.y.unwrap_or(DEFAULT_TARGET.1),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).post(command_handler))
        .route("/input", post(input_handler))
        .route("/arc", get(arc_handler))
        .with_state(state)
}

async fn command_handler(State(state): State<AppState>, body: Bytes) -> StatusCode {
    debug!("post body: {:?}", String::from_utf8_lossy(&body));
    match blocking(move || state.apply(&body)).await {
        Ok(command) => {
            info!("Forwarded command {}", command);
            StatusCode::OK
        }
        Err(e) => log_failure("Command", &e),
    }
}

async fn input_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActiveCommand>, StatusCode> {
    debug!("input body: {:?}", String::from_utf8_lossy(&body));
    match blocking(move || state.input(&body)).await {
        Ok(active) => Ok(Json(ActiveCommand { active })),
        Err(e) => Err(log_failure("Input", &e)),
    }
}

async fn arc_handler(
    State(state): State<AppState>,
    Query(query): Query<TargetQuery>,
) -> Json<ArcDrive> {
    Json(state.chassis.arc_drive(query.target()))
}

async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<TargetQuery>,
) -> Result<Html<String>, StatusCode> {
    let page = blocking(move || {
        let active = state.active_command()?;
        let drive = state.chassis.arc_drive(query.target());
        let mut page = String::new();
        render_page(&mut page, &state.chassis, &drive, active)?;
        Ok(page)
    })
    .await;

    page.map(Html).map_err(|e| log_failure("Page", &e))
}

/// Serve the control endpoint until the listener fails
pub async fn serve(bind: &str, state: AppState) -> Result<(), BoxError> {
    let listener = TcpListener::bind(bind).await?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), BoxError> {
    info!("Robot server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Forward commands published on a zenoh topic to the same serial link
pub async fn bridge_zenoh(topic: &str, state: AppState) -> Result<(), BoxError> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let subscriber = session.declare_subscriber(topic).await?;
    info!("Subscribed to: {}", topic);

    while let Ok(sample) = subscriber.recv_async().await {
        let payload = sample.payload().to_bytes().to_vec();
        let state = state.clone();
        match blocking(move || state.apply(&payload)).await {
            Ok(command) => info!("Forwarded command {} from zenoh", command),
            Err(e) => warn!("Failed to forward zenoh command: {}", e),
        }
    }

    warn!("Zenoh subscriber closed");
    Ok(())
}
