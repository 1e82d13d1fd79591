//! Protocol dispatch and a full session against a loopback server.

use quartermaster::client::{play, ClientConfig, Pilot, SessionEnd};
use quartermaster::engine::RoundController;
use quartermaster::error::ClientError;
use quartermaster::model::{GameEnded, Round, Selection};
use quartermaster::protocol::{
    decode_server_message, dispatch, ClientMessage, Dispatch, Environment, GameListener,
    ServerMessage,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const ROUND_ID: &str = "5f0c6f1e-8a55-4c43-9d0e-3a1b2c3d4e5f";

fn round_message() -> Value {
    json!({
        "@type": "GameRoundServerMessage",
        "round": 1,
        "roundId": ROUND_ID,
        "nextCheckpoint": {"round": 10, "values": {"health": 0, "maxHealth": 0, "crew": 0, "maxCrew": 0}},
        "effects": [{"id": 1, "step": 1, "values": {"health": -30, "maxHealth": 0, "crew": 0, "maxCrew": 0}}],
        "actions": [
            {"id": 1, "effectId": 1, "values": {"health": 40, "maxHealth": 0, "crew": 0, "maxCrew": 0}},
            {"id": 2, "effectId": -1, "values": {"health": 5, "maxHealth": 0, "crew": 0, "maxCrew": 0}}
        ],
        "ourSpaceship": {"name": "ours", "values": {"health": 50, "maxHealth": 100, "crew": 10, "maxCrew": 10}, "alive": true},
        "competingSpaceships": []
    })
}

fn game_ended_message() -> Value {
    json!({
        "@type": "GameEndedServerMessage",
        "round": 42,
        "leaderboard": [
            {"name": "ours", "lastRound": 42, "points": 1250.5},
            {"name": "rival", "lastRound": 30, "points": 800}
        ]
    })
}

#[derive(Default)]
struct Recorder {
    warnings: Vec<String>,
    errors: Vec<String>,
    ended: Option<GameEnded>,
}

impl GameListener for Recorder {
    fn on_round(&mut self, round: &Round) -> Selection {
        Selection::empty(round.round_id)
    }

    fn on_warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn on_error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn on_game_ended(&mut self, ended: &GameEnded) {
        self.ended = Some(ended.clone());
    }
}

#[test]
fn dispatch_maps_every_message_kind() {
    let mut recorder = Recorder::default();

    let round = decode_server_message(&round_message().to_string()).expect("round");
    match dispatch(&mut recorder, round) {
        Dispatch::Reply(ClientMessage::SelectActions(selection)) => {
            assert_eq!(selection.round_id.to_string(), ROUND_ID);
        }
        other => panic!("expected a reply, got {other:?}"),
    }

    let warning = ServerMessage::Warning {
        msg: "unknown action".to_string(),
    };
    assert_eq!(dispatch(&mut recorder, warning), Dispatch::Continue);
    assert_eq!(recorder.warnings, vec!["unknown action".to_string()]);

    let error = ServerMessage::Error {
        msg: "too late".to_string(),
    };
    assert_eq!(
        dispatch(&mut recorder, error),
        Dispatch::Disconnect("too late".to_string())
    );
    assert_eq!(recorder.errors.len(), 1);

    let ended = decode_server_message(&game_ended_message().to_string()).expect("ended");
    assert_eq!(dispatch(&mut recorder, ended), Dispatch::Finished);
    assert_eq!(recorder.ended.map(|e| e.leaderboard.len()), Some(2));
}

async fn read_json_line(lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>) -> Value {
    let line = lines
        .next_line()
        .await
        .expect("read should succeed")
        .expect("client should send a line");
    serde_json::from_str(&line).expect("client lines are json")
}

async fn connect_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let client = TcpStream::connect(addr).await.expect("connect");
    let (server, _) = listener.accept().await.expect("accept");
    (client, server)
}

fn test_config() -> ClientConfig {
    ClientConfig {
        server_addr: "127.0.0.1:0".to_string(),
        secret: "hive".to_string(),
        environment: Environment::Simulation,
    }
}

#[tokio::test]
async fn session_joins_answers_rounds_and_finishes() {
    let (client, server) = connect_pair().await;

    let server_task = tokio::spawn(async move {
        let (reader, mut writer) = server.into_split();
        let mut lines = BufReader::new(reader).lines();

        let join = read_json_line(&mut lines).await;
        assert_eq!(join["@type"], "JoinClientMessage");
        assert_eq!(join["secret"], "hive");
        assert_eq!(join["environment"], "SIMULATION");

        writer.write_all(b"not json at all\n").await.expect("write");
        writer
            .write_all(format!("{}\n", round_message()).as_bytes())
            .await
            .expect("write");
        let reply = read_json_line(&mut lines).await;

        writer
            .write_all(b"{\"@type\":\"WarningServerMessage\",\"msg\":\"slow\"}\n")
            .await
            .expect("write");
        writer
            .write_all(format!("{}\n", game_ended_message()).as_bytes())
            .await
            .expect("write");
        reply
    });

    let mut pilot = Pilot::new(RoundController::default());
    let end = play(client, &test_config(), &mut pilot)
        .await
        .expect("session should finish cleanly");
    let reply = server_task.await.expect("server task");

    assert_eq!(end, SessionEnd::GameEnded);
    assert_eq!(reply["@type"], "SelectActionsClientMessage");
    assert_eq!(reply["roundId"], ROUND_ID);
    assert_eq!(reply["actionIds"], json!([1]));
    assert_eq!(pilot.rounds_played(), 1);
    assert_eq!(pilot.warnings().to_vec(), vec!["slow".to_string()]);
    let leaderboard = pilot.last_leaderboard().expect("leaderboard kept");
    assert_eq!(leaderboard[0].name, "ours");
}

#[tokio::test]
async fn server_error_ends_session_with_error() {
    let (client, server) = connect_pair().await;

    let server_task = tokio::spawn(async move {
        let (reader, mut writer) = server.into_split();
        let mut lines = BufReader::new(reader).lines();
        let _join = read_json_line(&mut lines).await;
        writer
            .write_all(b"{\"@type\":\"ErrorServerMessage\",\"msg\":\"bad secret\"}\n")
            .await
            .expect("write");
    });

    let mut pilot = Pilot::default();
    let err = play(client, &test_config(), &mut pilot)
        .await
        .expect_err("fatal server error");
    server_task.await.expect("server task");

    assert!(err.is_server_initiated());
    assert!(matches!(err, ClientError::Server(msg) if msg == "bad secret"));
}

#[tokio::test]
async fn closed_connection_ends_session_quietly() {
    let (client, server) = connect_pair().await;

    let server_task = tokio::spawn(async move {
        let (reader, writer) = server.into_split();
        let mut lines = BufReader::new(reader).lines();
        let _join = read_json_line(&mut lines).await;
        drop(writer);
        drop(lines);
    });

    let mut pilot = Pilot::default();
    let end = play(client, &test_config(), &mut pilot).await.expect("clean close");
    server_task.await.expect("server task");
    assert_eq!(end, SessionEnd::ConnectionClosed);
}
