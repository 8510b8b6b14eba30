// Client-side command transports
//
// Every transport is fire-and-forget: a send spawns the request and returns.
// No retry, no queuing, no ordering guarantee between in-flight requests.

use tracing::{debug, info, warn};

use crate::drive::DriveCommand;
use crate::messages::CommandRequest;

/// Error types for a single command transmission
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected command {command} with status {status}")]
    Rejected {
        command: DriveCommand,
        status: reqwest::StatusCode,
    },

    #[error("Zenoh error: {0}")]
    Zenoh(String),

    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives each command transition
pub trait CommandSink {
    fn send(&mut self, command: DriveCommand);
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn send(&mut self, command: DriveCommand) {
        (**self).send(command);
    }
}

// Recording sink
impl CommandSink for Vec<DriveCommand> {
    fn send(&mut self, command: DriveCommand) {
        self.push(command);
    }
}

/// POSTs `{"command": "<c>"}` to the control server
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        info!("Sending commands to {}", url);
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Send one command and wait for the server's answer
    pub async fn post(&self, command: DriveCommand) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&CommandRequest::from(command))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Command {} accepted ({})", command, status);
            Ok(())
        } else {
            Err(TransportError::Rejected { command, status })
        }
    }
}

impl CommandSink for HttpTransport {
    fn send(&mut self, command: DriveCommand) {
        let transport = self.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.post(command).await {
                warn!("Failed to send command {}: {}", command, e);
            }
        });
    }
}

/// Publishes `{"command": "<c>"}` on a zenoh topic
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct ZenohTransport {
    session: zenoh::Session,
    topic: String,
}

impl ZenohTransport {
    pub async fn open(topic: &str) -> Result<Self, TransportError> {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default())
            .await
            .map_err(|e| TransportError::Zenoh(e.to_string()))?;
        info!("Publishing commands to: {}", topic);
        Ok(Self {
            session,
            topic: topic.to_string(),
        })
    }

    pub async fn put(&self, command: DriveCommand) -> Result<(), TransportError> {
        let payload = serde_json::to_string(&CommandRequest::from(command))?;
        self.session
            .put(self.topic.as_str(), payload)
            .await
            .map_err(|e| TransportError::Zenoh(e.to_string()))
    }
}

impl CommandSink for ZenohTransport {
    fn send(&mut self, command: DriveCommand) {
        let transport = self.clone();
        tokio::spawn(async move {
            if let Err(e) = transport.put(command).await {
                warn!("Failed to publish command {}: {}", command, e);
            }
        });
    }
}
