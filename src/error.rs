use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    Env { key: &'static str, value: String },

    #[error("weight ordering violated: {0}")]
    Weights(String),
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed server message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode client message: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("server reported a fatal error: {0}")]
    Server(String),

    #[error("invalid value '{value}' for {key}")]
    Env { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read rounds from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid round on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether the failure ended the session on the server's initiative.
    pub fn is_server_initiated(&self) -> bool {
        matches!(self, ClientError::Server(_))
    }
}
