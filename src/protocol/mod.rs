pub mod dispatch;
pub mod messages;

pub use dispatch::{dispatch, Dispatch, GameListener};
pub use messages::{
    decode_server_message, encode_client_message, ClientMessage, Environment, ServerMessage,
};
