//! Per-slot tank state and the movement rules applied to it each tick.

use shared::{
    heading_vector, ClientUpdate, Rect, TankState, WallSet, ARENA_HEIGHT, ARENA_WIDTH,
    SPAWN_MARGIN, TANK_MAX_HEALTH, TANK_SIZE, TANK_SPEED, TURN_STEP_DEGREES, WALL_INSET,
    WALL_LENGTH,
};

/// The most recent keys a player reported holding.
///
/// The aim angle in an update is not kept: the server owns each tank's
/// heading and only turns it in response to the turn keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shooting: bool,
}

impl From<&ClientUpdate> for PlayerInput {
    fn from(update: &ClientUpdate) -> Self {
        Self {
            up: update.up,
            down: update.down,
            left: update.left,
            right: update.right,
            shooting: update.shooting,
        }
    }
}

/// Spawn point for a slot, just inside the matching corner wall.
pub fn spawn_position(slot_index: usize) -> (i32, i32) {
    let near = WALL_INSET + WALL_LENGTH + SPAWN_MARGIN;
    let far_x = ARENA_WIDTH - WALL_INSET - WALL_LENGTH - TANK_SIZE - SPAWN_MARGIN;
    let far_y = ARENA_HEIGHT - WALL_INSET - WALL_LENGTH - TANK_SIZE - SPAWN_MARGIN;

    match slot_index {
        0 => (near, near),
        1 => (far_x, near),
        2 => (near, far_y),
        3 => (far_x, far_y),
        _ => (ARENA_WIDTH / 2, ARENA_HEIGHT / 2),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub x: i32,
    pub y: i32,
    /// Degrees, 0 pointing up. Accumulates without wrapping.
    pub heading: f32,
    pub color_id: i32,
    health: i32,
}

impl Tank {
    pub fn new(x: i32, y: i32, color_id: i32) -> Self {
        Self {
            x,
            y,
            heading: 0.0,
            color_id,
            health: TANK_MAX_HEALTH,
        }
    }

    pub fn spawn(slot_index: usize, color_id: i32) -> Self {
        let (x, y) = spawn_position(slot_index);
        Self::new(x, y, color_id)
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn rect(&self) -> Rect {
        Rect::from_ints(self.x, self.y, TANK_SIZE, TANK_SIZE)
    }

    /// Applies one tick of input.
    ///
    /// Turning is a fixed step per call. The translated position is clamped
    /// to the arena and then discarded entirely if it touches a wall.
    pub fn step(&mut self, input: &PlayerInput, dt: f32, walls: &WallSet) {
        if !self.is_alive() {
            return;
        }

        if input.left && !input.right {
            self.heading -= TURN_STEP_DEGREES;
        } else if input.right && !input.left {
            self.heading += TURN_STEP_DEGREES;
        }

        let (dir_x, dir_y) = heading_vector(self.heading);
        let distance = TANK_SPEED * dt;
        let (dx, dy) = if input.up && !input.down {
            (dir_x * distance, dir_y * distance)
        } else if input.down && !input.up {
            (-dir_x * distance, -dir_y * distance)
        } else {
            return;
        };

        let x = ((self.x as f32 + dx).round() as i32).clamp(0, ARENA_WIDTH - TANK_SIZE);
        let y = ((self.y as f32 + dy).round() as i32).clamp(0, ARENA_HEIGHT - TANK_SIZE);

        if !walls.blocks(&Rect::from_ints(x, y, TANK_SIZE, TANK_SIZE)) {
            self.x = x;
            self.y = y;
        }
    }

    /// Removes one point of health. Returns true if this hit destroyed the tank.
    pub fn take_hit(&mut self) -> bool {
        if self.health == 0 {
            return false;
        }
        self.health -= 1;
        self.health == 0
    }

    pub fn to_state(&self, player_number: i32, shooting: bool) -> TankState {
        TankState {
            player_number,
            x: self.x,
            y: self.y,
            angle: self.heading,
            tank_color_id: self.color_id,
            health: self.health,
            shooting,
        }
    }
}
