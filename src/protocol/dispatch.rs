use crate::model::{GameEnded, Round, Selection};
use crate::protocol::messages::{ClientMessage, ServerMessage};

/// Callbacks for each kind of server message.
///
/// Only rounds need an answer; the other notifications are informational.
pub trait GameListener {
    fn on_round(&mut self, round: &Round) -> Selection;

    fn on_warning(&mut self, _msg: &str) {}

    fn on_error(&mut self, _msg: &str) {}

    fn on_game_ended(&mut self, _ended: &GameEnded) {}
}

/// What the connection should do after a message was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Reply(ClientMessage),
    Continue,
    /// The server reported a fatal error and is closing the session.
    Disconnect(String),
    Finished,
}

pub fn dispatch<L>(listener: &mut L, message: ServerMessage) -> Dispatch
where
    L: GameListener + ?Sized,
{
    match message {
        ServerMessage::GameRound(round) => {
            Dispatch::Reply(ClientMessage::SelectActions(listener.on_round(&round)))
        }
        ServerMessage::Warning { msg } => {
            listener.on_warning(&msg);
            Dispatch::Continue
        }
        ServerMessage::Error { msg } => {
            listener.on_error(&msg);
            Dispatch::Disconnect(msg)
        }
        ServerMessage::GameEnded(ended) => {
            listener.on_game_ended(&ended);
            Dispatch::Finished
        }
    }
}
