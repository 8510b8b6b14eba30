// Wire messages shared by the teleop client and the control server

use serde::{Deserialize, Serialize};

use crate::drive::{CommandError, Control, DriveCommand, InputSource};

// Body of POST / and of the zenoh command topic: {"command": "<c>"}
// The field is kept as a raw JSON value so the server can tell a missing or
// non-string field apart from a well-formed but unknown command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: serde_json::Value,
}

impl From<DriveCommand> for CommandRequest {
    fn from(cmd: DriveCommand) -> Self {
        Self {
            command: serde_json::Value::String(cmd.as_char().to_string()),
        }
    }
}

/// Why a command request was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("Missing or non-string `command` field")]
    NotAString,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Unknown control: {0:?}")]
    UnknownControl(String),
}

impl CommandRequest {
    /// Parse a JSON body into a drive command
    pub fn parse(body: &[u8]) -> Result<DriveCommand, RequestError> {
        let request: CommandRequest =
            serde_json::from_slice(body).map_err(|e| RequestError::Malformed(e.to_string()))?;
        request.command()
    }

    pub fn command(&self) -> Result<DriveCommand, RequestError> {
        match &self.command {
            serde_json::Value::String(s) => Ok(s.parse()?),
            _ => Err(RequestError::NotAString),
        }
    }
}

// Body of POST /input: one press or release from the browser
// {"control": "w", "source": "pointer", "pressed": true}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputEvent {
    pub control: String,
    pub source: InputSource,
    pub pressed: bool,
}

impl InputEvent {
    pub fn parse(body: &[u8]) -> Result<(Control, InputSource, bool), RequestError> {
        let event: InputEvent =
            serde_json::from_slice(body).map_err(|e| RequestError::Malformed(e.to_string()))?;
        let mut chars = event.control.chars();
        let control = match (chars.next(), chars.next()) {
            (Some(key), None) => Control::from_key(key),
            _ => None,
        }
        .ok_or(RequestError::UnknownControl(event.control))?;
        Ok((control, event.source, event.pressed))
    }
}

// Reply to POST /input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActiveCommand {
    pub active: DriveCommand,
}
