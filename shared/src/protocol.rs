//! Fixed-layout datagram protocol shared by the arena server and its clients.
//!
//! Every datagram is a little-endian `u32` command tag followed by a
//! fixed-size body, serialized with bincode's default fixed-int encoding.
//! Arrays are fixed length, so each command has exactly one valid size.
//!
//! Client and server tags are separate namespaces: the connect ack reuses
//! the client's CONNECT tag. A receiver therefore decodes with the function
//! for the direction it listens on ([`decode_client`] on the server,
//! [`decode_server`] on a client). Within a direction several commands are
//! eight bytes long, so decoding first narrows by length, then requires the
//! tag to name a command of that length, and only then decodes the body.

use crate::{MAX_BULLETS, MAX_PLAYERS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the leading command tag.
pub const TAG_SIZE: usize = 4;

/// Which way a datagram travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToServer,
    ToClient,
}

impl Direction {
    pub fn commands(self) -> &'static [Command] {
        match self {
            Direction::ToServer => &Command::CLIENT,
            Direction::ToClient => &Command::SERVER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Update,
    Heartbeat,
    ConnectAck,
    StartMatch,
    GameState,
    MatchOver,
}

impl Command {
    /// Commands a client sends.
    pub const CLIENT: [Command; 3] = [Command::Connect, Command::Update, Command::Heartbeat];
    /// Commands the server sends.
    pub const SERVER: [Command; 4] = [
        Command::ConnectAck,
        Command::StartMatch,
        Command::GameState,
        Command::MatchOver,
    ];

    /// Tag within the command's own direction.
    pub fn tag(self) -> u32 {
        match self {
            Command::Connect => 0,
            Command::Update => 1,
            Command::Heartbeat => 2,
            Command::ConnectAck => Command::Connect.tag(),
            Command::StartMatch => 1,
            Command::GameState => 2,
            Command::MatchOver => 3,
        }
    }

    pub fn direction(self) -> Direction {
        if Self::CLIENT.contains(&self) {
            Direction::ToServer
        } else {
            Direction::ToClient
        }
    }

    pub fn from_tag(direction: Direction, tag: u32) -> Option<Self> {
        direction.commands().iter().copied().find(|c| c.tag() == tag)
    }

    /// Total datagram size, tag included.
    pub fn wire_size(self) -> usize {
        TAG_SIZE
            + match self {
                Command::Connect => ClientConnect::BODY_SIZE,
                Command::Update => ClientUpdate::BODY_SIZE,
                Command::Heartbeat => ClientHeartbeat::BODY_SIZE,
                Command::ConnectAck => ServerConnectAck::BODY_SIZE,
                Command::StartMatch => GameInit::BODY_SIZE,
                Command::GameState => GameStateMessage::BODY_SIZE,
                Command::MatchOver => MatchOver::BODY_SIZE,
            }
    }
}

/// Client asks for a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConnect {
    pub tank_color_id: i32,
}

impl ClientConnect {
    pub const BODY_SIZE: usize = 4;
}

/// Held keys and aim for one player, sent continuously while playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub player_number: i32,
    pub angle: f32,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shooting: bool,
    pub tank_color_id: i32,
}

impl ClientUpdate {
    pub const BODY_SIZE: usize = 17;
}

/// Keep-alive carrying no input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHeartbeat {
    pub player_number: i32,
}

impl ClientHeartbeat {
    pub const BODY_SIZE: usize = 4;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConnectAck {
    pub player_number: i32,
}

impl ServerConnectAck {
    pub const BODY_SIZE: usize = 4;
}

/// Sent once after the ack so the client can size its view of the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInit {
    pub player_id: i32,
    pub arena_width: i32,
    pub arena_height: i32,
}

impl GameInit {
    pub const BODY_SIZE: usize = 12;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TankState {
    pub player_number: i32,
    pub x: i32,
    pub y: i32,
    pub angle: f32,
    pub tank_color_id: i32,
    pub health: i32,
    pub shooting: bool,
}

impl TankState {
    pub const SIZE: usize = 25;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub active: bool,
    /// Player number of the tank that fired the bullet.
    pub owner_id: i32,
}

impl BulletState {
    pub const SIZE: usize = 21;
}

/// One snapshot of every active tank and bullet.
///
/// Only the first `num_players` tanks and `num_bullets` bullets are
/// meaningful; the remaining entries are zeroed filler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStateMessage {
    pub num_players: i32,
    pub tanks: [TankState; MAX_PLAYERS],
    pub bullets: [BulletState; MAX_BULLETS],
    pub num_bullets: i32,
}

impl GameStateMessage {
    pub const BODY_SIZE: usize =
        4 + MAX_PLAYERS * TankState::SIZE + MAX_BULLETS * BulletState::SIZE + 4;

    /// Packs the given entities, silently truncating anything beyond capacity.
    pub fn new(tanks: &[TankState], bullets: &[BulletState]) -> Self {
        let mut message = Self::default();

        for (slot, tank) in message.tanks.iter_mut().zip(tanks) {
            *slot = *tank;
        }
        for (slot, bullet) in message.bullets.iter_mut().zip(bullets) {
            *slot = *bullet;
        }

        message.num_players = tanks.len().min(MAX_PLAYERS) as i32;
        message.num_bullets = bullets.len().min(MAX_BULLETS) as i32;
        message
    }

    /// The populated tank entries. Out-of-range counts from the wire are clamped.
    pub fn active_tanks(&self) -> &[TankState] {
        let count = usize::try_from(self.num_players).unwrap_or(0).min(MAX_PLAYERS);
        &self.tanks[..count]
    }

    pub fn active_bullets(&self) -> &[BulletState] {
        let count = usize::try_from(self.num_bullets).unwrap_or(0).min(MAX_BULLETS);
        &self.bullets[..count]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOver {
    pub winning_player_id: i32,
}

impl MatchOver {
    pub const BODY_SIZE: usize = 4;
}

/// Every datagram the protocol knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Connect(ClientConnect),
    Update(ClientUpdate),
    Heartbeat(ClientHeartbeat),
    ConnectAck(ServerConnectAck),
    GameInit(GameInit),
    GameState(Box<GameStateMessage>),
    MatchOver(MatchOver),
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Message::Connect(_) => Command::Connect,
            Message::Update(_) => Command::Update,
            Message::Heartbeat(_) => Command::Heartbeat,
            Message::ConnectAck(_) => Command::ConnectAck,
            Message::GameInit(_) => Command::StartMatch,
            Message::GameState(_) => Command::GameState,
            Message::MatchOver(_) => Command::MatchOver,
        }
    }

    /// Player number the sender claims, for messages that carry one.
    pub fn player_number(&self) -> Option<i32> {
        match self {
            Message::Update(update) => Some(update.player_number),
            Message::Heartbeat(heartbeat) => Some(heartbeat.player_number),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no message is {0} bytes long")]
    UnknownLength(usize),
    #[error("unknown {direction:?} command tag {tag}")]
    UnknownCommand { direction: Direction, tag: u32 },
    #[error("{command:?} datagrams are {expected} bytes, got {actual}")]
    TagLengthMismatch {
        command: Command,
        expected: usize,
        actual: usize,
    },
    #[error("malformed message body: {0}")]
    Malformed(#[from] bincode::Error),
}

pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    let tag = message.command().tag();
    let bytes = match message {
        Message::Connect(body) => bincode::serialize(&(tag, body))?,
        Message::Update(body) => bincode::serialize(&(tag, body))?,
        Message::Heartbeat(body) => bincode::serialize(&(tag, body))?,
        Message::ConnectAck(body) => bincode::serialize(&(tag, body))?,
        Message::GameInit(body) => bincode::serialize(&(tag, body))?,
        Message::GameState(body) => bincode::serialize(&(tag, body.as_ref()))?,
        Message::MatchOver(body) => bincode::serialize(&(tag, body))?,
    };
    Ok(bytes)
}

/// Decodes a datagram sent by a client.
pub fn decode_client(bytes: &[u8]) -> Result<Message, CodecError> {
    decode(Direction::ToServer, bytes)
}

/// Decodes a datagram sent by the server.
pub fn decode_server(bytes: &[u8]) -> Result<Message, CodecError> {
    decode(Direction::ToClient, bytes)
}

fn decode(direction: Direction, bytes: &[u8]) -> Result<Message, CodecError> {
    let commands = direction.commands();
    if !commands.iter().any(|c| c.wire_size() == bytes.len()) {
        return Err(CodecError::UnknownLength(bytes.len()));
    }

    let tag: u32 = bincode::deserialize(&bytes[..TAG_SIZE])?;
    let command =
        Command::from_tag(direction, tag).ok_or(CodecError::UnknownCommand { direction, tag })?;
    if command.wire_size() != bytes.len() {
        return Err(CodecError::TagLengthMismatch {
            command,
            expected: command.wire_size(),
            actual: bytes.len(),
        });
    }

    let body = &bytes[TAG_SIZE..];
    let message = match command {
        Command::Connect => Message::Connect(bincode::deserialize(body)?),
        Command::Update => Message::Update(bincode::deserialize(body)?),
        Command::Heartbeat => Message::Heartbeat(bincode::deserialize(body)?),
        Command::ConnectAck => Message::ConnectAck(bincode::deserialize(body)?),
        Command::StartMatch => Message::GameInit(bincode::deserialize(body)?),
        Command::GameState => Message::GameState(Box::new(bincode::deserialize(body)?)),
        Command::MatchOver => Message::MatchOver(bincode::deserialize(body)?),
    };
    Ok(message)
}
