pub mod geometry;
pub mod protocol;

pub use geometry::{intersects, Corner, Rect, WallSegment, WallSet};
pub use protocol::{
    decode_client, decode_server, encode, BulletState, ClientConnect, ClientHeartbeat,
    ClientUpdate, CodecError, Command, Direction, GameInit, GameStateMessage, MatchOver, Message,
    ServerConnectAck, TankState,
};

pub const SERVER_PORT: u16 = 12345;

pub const MAX_PLAYERS: usize = 4;
pub const MAX_BULLETS_PER_PLAYER: usize = 5;
pub const MAX_BULLETS: usize = MAX_PLAYERS * MAX_BULLETS_PER_PLAYER;

pub const ARENA_WIDTH: i32 = 800;
pub const ARENA_HEIGHT: i32 = 600;

pub const TANK_SIZE: i32 = 64;
pub const TANK_MAX_HEALTH: i32 = 3;
/// Linear speed in arena units per second.
pub const TANK_SPEED: f32 = 800.0;
/// Applied once per broadcast tick while a turn key is held, so the
/// effective turn rate scales with the tick cadence.
pub const TURN_STEP_DEGREES: f32 = 10.0;

pub const BULLET_SPEED: f32 = 1500.0;
pub const BULLET_SIZE: f32 = 15.0;
/// Distance past the tank's half-height at which a bullet leaves the barrel.
pub const MUZZLE_CLEARANCE: f32 = 10.0;

pub const WALL_THICKNESS: i32 = 20;
pub const WALL_LENGTH: i32 = 80;
/// Distance from each arena corner to the outer corner of its wall.
pub const WALL_INSET: i32 = 100;
pub const SPAWN_MARGIN: i32 = 10;

pub const HEARTBEAT_TIMEOUT_MS: u64 = 5000;

/// Converts a heading in degrees (0 = up, clockwise positive) into a unit
/// direction vector in screen coordinates.
pub fn heading_vector(heading_degrees: f32) -> (f32, f32) {
    let radians = (heading_degrees - 90.0).to_radians();
    (radians.cos(), radians.sin())
}
