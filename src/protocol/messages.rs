//! Wire messages exchanged with the game server, one JSON document per line.
//!
//! Both directions are tagged by an `@type` field naming the message kind.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::model::{GameEnded, Round, Selection};

/// Which opponents the server pairs us with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    /// Against server-side bots.
    #[default]
    Simulation,
    /// Against other teams.
    Live,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "simulation" => Ok(Self::Simulation),
            "live" => Ok(Self::Live),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulation => write!(f, "SIMULATION"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

/// Server-to-client messages. Decoded with [decode_server_message], which reads the
/// `@type` tag first and then parses the payload straight from the line so decimals
/// keep every digit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "@type")]
pub enum ServerMessage {
    /// A new round; must be answered within one second.
    #[serde(rename = "GameRoundServerMessage")]
    GameRound(Round),
    /// A rejected request that does not end the session.
    #[serde(rename = "WarningServerMessage")]
    Warning { msg: String },
    /// A fatal error; the server disconnects after sending it.
    #[serde(rename = "ErrorServerMessage")]
    Error { msg: String },
    #[serde(rename = "GameEndedServerMessage")]
    GameEnded(GameEnded),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum ClientMessage {
    #[serde(rename = "JoinClientMessage")]
    Join {
        secret: String,
        environment: Environment,
    },
    #[serde(rename = "SelectActionsClientMessage")]
    SelectActions(Selection),
}

const SERVER_MESSAGE_TYPES: &[&str] = &[
    "GameRoundServerMessage",
    "WarningServerMessage",
    "ErrorServerMessage",
    "GameEndedServerMessage",
];

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "@type")]
    kind: String,
}

#[derive(Deserialize)]
struct Notice {
    msg: String,
}

pub fn decode_server_message(line: &str) -> Result<ServerMessage, ProtocolError> {
    let line = line.trim();
    let envelope: Envelope = serde_json::from_str(line).map_err(ProtocolError::Decode)?;

    let message = match envelope.kind.as_str() {
        "GameRoundServerMessage" => serde_json::from_str(line).map(ServerMessage::GameRound),
        "WarningServerMessage" => {
            serde_json::from_str(line).map(|notice: Notice| ServerMessage::Warning { msg: notice.msg })
        }
        "ErrorServerMessage" => {
            serde_json::from_str(line).map(|notice: Notice| ServerMessage::Error { msg: notice.msg })
        }
        "GameEndedServerMessage" => serde_json::from_str(line).map(ServerMessage::GameEnded),
        other => Err(de::Error::unknown_variant(other, SERVER_MESSAGE_TYPES)),
    };
    message.map_err(ProtocolError::Decode)
}

/// Encodes a message as a single line, without the trailing newline.
pub fn encode_client_message(message: &ClientMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}
