//! Fixed-capacity projectile pool.
//!
//! Bullets are addressed by their index in the pool. An inactive entry is
//! free and is handed out again by the next [`BulletPool::fire`].

use crate::client_manager::SlotId;
use shared::{
    heading_vector, intersects, BulletState, Rect, WallSet, ARENA_HEIGHT, ARENA_WIDTH,
    BULLET_SIZE, BULLET_SPEED, MAX_BULLETS, MUZZLE_CLEARANCE, TANK_SIZE,
};

/// Distance from a tank's centre to the point where its bullets appear.
pub const MUZZLE_DISTANCE: f32 = TANK_SIZE as f32 / 2.0 + MUZZLE_CLEARANCE;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub active: bool,
    pub owner: SlotId,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, BULLET_SIZE, BULLET_SIZE)
    }

    fn out_of_bounds(&self) -> bool {
        !(0.0..=ARENA_WIDTH as f32).contains(&self.x)
            || !(0.0..=ARENA_HEIGHT as f32).contains(&self.y)
    }

    pub fn to_state(&self) -> BulletState {
        BulletState {
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            active: self.active,
            owner_id: self.owner.player_number(),
        }
    }
}

/// A bullet that struck a tank during [`BulletPool::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub bullet: usize,
    pub target: SlotId,
}

#[derive(Debug, Clone)]
pub struct BulletPool {
    bullets: [Bullet; MAX_BULLETS],
}

impl BulletPool {
    pub fn new() -> Self {
        Self {
            bullets: [Bullet::default(); MAX_BULLETS],
        }
    }

    pub fn capacity(&self) -> usize {
        self.bullets.len()
    }

    pub fn active_count(&self) -> usize {
        self.bullets.iter().filter(|b| b.active).count()
    }

    pub fn active(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().filter(|b| b.active)
    }

    pub fn clear(&mut self) {
        for bullet in self.bullets.iter_mut() {
            bullet.active = false;
        }
    }

    /// Fires from a tank centred on (`center_x`, `center_y`).
    ///
    /// Takes the first free entry; returns `None` and fires nothing when the
    /// pool is saturated.
    pub fn fire(
        &mut self,
        owner: SlotId,
        center_x: f32,
        center_y: f32,
        heading: f32,
    ) -> Option<usize> {
        let index = self.bullets.iter().position(|b| !b.active)?;
        let (dir_x, dir_y) = heading_vector(heading);

        let muzzle_x = center_x + dir_x * MUZZLE_DISTANCE;
        let muzzle_y = center_y + dir_y * MUZZLE_DISTANCE;

        self.bullets[index] = Bullet {
            x: muzzle_x - BULLET_SIZE / 2.0,
            y: muzzle_y - BULLET_SIZE / 2.0,
            vx: dir_x * BULLET_SPEED,
            vy: dir_y * BULLET_SPEED,
            active: true,
            owner,
        };
        Some(index)
    }

    /// Advances every active bullet by `dt` seconds.
    ///
    /// Wall contact reflects the axis of the bar that was touched; touching
    /// both bars of a corner reflects both. A bullet overlapping a tank other
    /// than its owner's is consumed and reported as a [`Hit`]. Bullets that
    /// end up outside the arena are deactivated.
    pub fn update(&mut self, dt: f32, walls: &WallSet, targets: &[(SlotId, Rect)]) -> Vec<Hit> {
        let mut hits = Vec::new();

        for (index, bullet) in self.bullets.iter_mut().enumerate() {
            if !bullet.active {
                continue;
            }

            bullet.x += bullet.vx * dt;
            bullet.y += bullet.vy * dt;

            let rect = bullet.rect();
            if walls.hits_vertical_bar(&rect) {
                bullet.vx = -bullet.vx;
            }
            if walls.hits_horizontal_bar(&rect) {
                bullet.vy = -bullet.vy;
            }

            let struck = targets
                .iter()
                .find(|(slot, tank)| *slot != bullet.owner && intersects(tank, &rect));
            if let Some(&(target, _)) = struck {
                bullet.active = false;
                hits.push(Hit {
                    bullet: index,
                    target,
                });
                continue;
            }

            if bullet.out_of_bounds() {
                bullet.active = false;
            }
        }

        hits
    }
}

impl Default for BulletPool {
    fn default() -> Self {
        Self::new()
    }
}
