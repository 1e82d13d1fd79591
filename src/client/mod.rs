//! Line-delimited JSON connection to the game server.
//!
//! This is a plain TCP transport for local and simulated servers. The hosted game server
//! speaks WebSocket, which is not implemented here.
//!
//! One outstanding round at a time: each line is decoded, dispatched to a
//! [GameListener], and any reply is written back before the next line is read.

pub mod pilot;

use std::env;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::protocol::{
    decode_server_message, dispatch, encode_client_message, ClientMessage, Dispatch, Environment,
    GameListener,
};

pub use pilot::Pilot;

pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:7777";

const SERVER_ENV: &str = "QUARTERMASTER_SERVER";
const SECRET_ENV: &str = "QUARTERMASTER_SECRET";
const ENVIRONMENT_ENV: &str = "QUARTERMASTER_ENVIRONMENT";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_addr: String,
    pub secret: String,
    pub environment: Environment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            secret: String::new(),
            environment: Environment::Simulation,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Ok(addr) = env::var(SERVER_ENV) {
            config.server_addr = addr;
        }
        if let Ok(secret) = env::var(SECRET_ENV) {
            config.secret = secret;
        }
        if let Ok(raw) = env::var(ENVIRONMENT_ENV) {
            config.environment = raw.parse().map_err(|_| ClientError::Env {
                key: ENVIRONMENT_ENV,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }
}

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    GameEnded,
    ConnectionClosed,
    Interrupted,
}

/// Connects, joins, and plays until the game ends, the server closes, or ctrl-c.
pub async fn run_client<L>(config: &ClientConfig, listener: &mut L) -> Result<SessionEnd, ClientError>
where
    L: GameListener + ?Sized,
{
    let stream = TcpStream::connect(&config.server_addr).await?;
    stream.set_nodelay(true)?;
    info!(
        server = %config.server_addr,
        environment = %config.environment,
        "connected"
    );

    tokio::select! {
        result = play(stream, config, listener) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, closing connection");
            Ok(SessionEnd::Interrupted)
        }
    }
}

/// Runs the session over an already connected stream.
pub async fn play<L>(stream: TcpStream, config: &ClientConfig, listener: &mut L) -> Result<SessionEnd, ClientError>
where
    L: GameListener + ?Sized,
{
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let join = ClientMessage::Join {
        secret: config.secret.clone(),
        environment: config.environment,
    };
    write_line(&mut writer, &encode_client_message(&join)?).await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message = match decode_server_message(&line) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "skipping undecodable server message");
                continue;
            }
        };

        match dispatch(listener, message) {
            Dispatch::Reply(reply) => {
                write_line(&mut writer, &encode_client_message(&reply)?).await?;
                debug!("reply sent");
            }
            Dispatch::Continue => {}
            Dispatch::Disconnect(msg) => return Err(ClientError::Server(msg)),
            Dispatch::Finished => return Ok(SessionEnd::GameEnded),
        }
    }

    info!("server closed the connection");
    Ok(SessionEnd::ConnectionClosed)
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
