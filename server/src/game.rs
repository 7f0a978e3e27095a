use crate::bullets::BulletPool;
use crate::client_manager::{ConnectionRegistry, SlotId};
use crate::tank::{PlayerInput, Tank};
use log::{debug, info};
use shared::{
    ClientUpdate, GameInit, GameStateMessage, MatchOver, Rect, TankState, WallSet, ARENA_HEIGHT,
    ARENA_WIDTH,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Fewer than two players have been in the lobby together.
    Waiting,
    InProgress,
    /// Latched until the winner leaves, a new player joins or the lobby empties.
    Won(SlotId),
}

/// What one broadcast tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub evicted: Vec<SlotId>,
    pub snapshot: GameStateMessage,
    pub match_over: Option<MatchOver>,
}

/// The whole authoritative simulation: seats and their tanks, the bullet
/// pool, the arena walls and the match outcome.
pub struct World {
    pub tick: u32,
    registry: ConnectionRegistry,
    bullets: BulletPool,
    walls: WallSet,
    phase: MatchPhase,
}

impl World {
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            tick: 0,
            registry: ConnectionRegistry::new(heartbeat_timeout),
            bullets: BulletPool::new(),
            walls: WallSet::default(),
            phase: MatchPhase::Waiting,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn bullets(&self) -> &BulletPool {
        &self.bullets
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Seats a peer. A newcomer arriving after a match was decided starts
    /// a fresh round for everyone.
    pub fn connect(&mut self, addr: SocketAddr, color_id: i32, now: Instant) -> Option<SlotId> {
        let rejoining = self.registry.find_by_addr(addr).is_some();
        let id = self.registry.connect(addr, color_id, now)?;

        if !rejoining && matches!(self.phase, MatchPhase::Won(_)) {
            info!("Player {} joined after the match ended", id.player_number());
            self.reset_round();
        }
        Some(id)
    }

    /// Respawns every seated tank at full health and clears the bullets.
    fn reset_round(&mut self) {
        for (id, slot) in self.registry.iter_mut() {
            slot.tank = Tank::spawn(id.index(), slot.tank.color_id);
        }
        self.bullets.clear();
        self.phase = MatchPhase::Waiting;
    }

    pub fn game_init(&self, id: SlotId) -> GameInit {
        GameInit {
            player_id: id.player_number(),
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
        }
    }

    /// Records a player's held keys and fires if the shot key is down.
    ///
    /// Returns the seat the update was applied to, or `None` if the player
    /// number does not name an occupied seat.
    pub fn apply_update(&mut self, update: &ClientUpdate, now: Instant) -> Option<SlotId> {
        let id = SlotId::from_player_number(update.player_number)?;
        let input = PlayerInput::from(update);
        if !self.registry.apply_input(id, input, now) {
            return None;
        }

        if input.shooting {
            self.fire(id);
        }
        Some(id)
    }

    pub fn heartbeat(&mut self, player_number: i32, now: Instant) -> bool {
        SlotId::from_player_number(player_number)
            .map(|id| self.registry.heartbeat(id, now))
            .unwrap_or(false)
    }

    /// Fires one bullet from the seat's tank. Dead tanks cannot fire.
    pub fn fire(&mut self, id: SlotId) -> Option<usize> {
        let tank = &self.registry.get(id)?.tank;
        if !tank.is_alive() {
            return None;
        }

        let (center_x, center_y) = tank.rect().center();
        let fired = self.bullets.fire(id, center_x, center_y, tank.heading);
        if fired.is_none() {
            debug!("Bullet pool saturated, player {} did not fire", id.player_number());
        }
        fired
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Silent seats are evicted first, so they are already missing from the
    /// snapshot this tick produces.
    pub fn tick(&mut self, now: Instant, dt: f32) -> TickReport {
        let evicted = self.registry.sweep_timeouts(now);

        for (_, slot) in self.registry.iter_mut() {
            slot.tank.step(&slot.input, dt, &self.walls);
        }

        let targets: Vec<(SlotId, Rect)> = self
            .registry
            .iter()
            .map(|(id, slot)| (id, slot.tank.rect()))
            .collect();

        for hit in self.bullets.update(dt, &self.walls, &targets) {
            if let Some(slot) = self.registry.get_mut(hit.target) {
                if slot.tank.take_hit() {
                    info!("Player {} was destroyed", hit.target.player_number());
                }
            }
        }

        self.update_phase();
        self.tick = self.tick.wrapping_add(1);

        TickReport {
            evicted,
            snapshot: self.snapshot(),
            match_over: self.match_over(),
        }
    }

    fn update_phase(&mut self) {
        let seated = self.registry.len();
        if seated == 0 {
            if self.phase != MatchPhase::Waiting {
                info!("Lobby is empty, waiting for players");
            }
            self.phase = MatchPhase::Waiting;
            return;
        }

        if let MatchPhase::Won(winner) = self.phase {
            if self.registry.get(winner).is_none() {
                info!("Winner left, starting a new round");
                self.reset_round();
            }
        }

        if self.phase == MatchPhase::Waiting && seated >= 2 {
            info!("Match started with {} players", seated);
            self.phase = MatchPhase::InProgress;
        }

        if self.phase == MatchPhase::InProgress && seated >= 2 {
            let mut alive = self
                .registry
                .iter()
                .filter(|(_, slot)| slot.tank.is_alive())
                .map(|(id, _)| id);

            if let (Some(winner), None) = (alive.next(), alive.next()) {
                info!("Player {} won the match", winner.player_number());
                self.phase = MatchPhase::Won(winner);
            }
        }
    }

    pub fn match_over(&self) -> Option<MatchOver> {
        match self.phase {
            MatchPhase::Won(winner) => Some(MatchOver {
                winning_player_id: winner.player_number(),
            }),
            _ => None,
        }
    }

    /// Every occupied seat's tank and every live bullet.
    pub fn snapshot(&self) -> GameStateMessage {
        let tanks: Vec<TankState> = self
            .registry
            .iter()
            .map(|(id, slot)| slot.tank.to_state(id.player_number(), slot.input.shooting))
            .collect();
        let bullets: Vec<_> = self.bullets.active().map(|b| b.to_state()).collect();

        GameStateMessage::new(&tanks, &bullets)
    }

    pub fn recipients(&self) -> Vec<SocketAddr> {
        self.registry.addrs()
    }
}
