//! Slot assignment and connection liveness for the arena lobby
//!
//! The lobby has a fixed number of seats. Each seat (a [`Slot`]) is bound to
//! one peer address for as long as that peer keeps sending datagrams:
//! - A connect request takes the lowest free seat and spawns a tank there
//! - Any message carrying the seat's player number refreshes its heartbeat
//! - A seat silent for longer than the heartbeat timeout is freed
//!
//! There is no disconnect message; timeout eviction is the only way a seat
//! is released.

use crate::tank::{PlayerInput, Tank};
use log::info;
use shared::MAX_PLAYERS;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Index of a lobby seat, always below [`MAX_PLAYERS`].
///
/// Peers see seats as 1-based player numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_PLAYERS).then_some(Self(index))
    }

    /// Maps a wire player number (1-based) back onto a seat.
    pub fn from_player_number(player_number: i32) -> Option<Self> {
        let index = usize::try_from(player_number).ok()?.checked_sub(1)?;
        Self::new(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn player_number(self) -> i32 {
        self.0 as i32 + 1
    }
}

/// An occupied seat: the peer, its liveness, its latest input and its tank.
#[derive(Debug, Clone)]
pub struct Slot {
    /// Where snapshots for this seat are sent
    pub addr: SocketAddr,
    /// Last time any message for this seat arrived
    pub last_heartbeat: Instant,
    /// Keys held according to the most recent update
    pub input: PlayerInput,
    pub tank: Tank,
}

impl Slot {
    pub fn new(id: SlotId, addr: SocketAddr, color_id: i32, now: Instant) -> Self {
        Self {
            addr,
            last_heartbeat: now,
            input: PlayerInput::default(),
            tank: Tank::spawn(id.index(), color_id),
        }
    }

    /// True once strictly more than `timeout` has passed since the last heartbeat.
    pub fn is_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > timeout
    }
}

/// Owns every lobby seat.
pub struct ConnectionRegistry {
    slots: [Option<Slot>; MAX_PLAYERS],
    heartbeat_timeout: Duration,
}

impl ConnectionRegistry {
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            slots: Default::default(),
            heartbeat_timeout,
        }
    }

    /// Seats a peer, or returns `None` when the lobby is full.
    ///
    /// A peer that already holds a seat gets the same seat back, so
    /// retried connect requests never consume a second one.
    pub fn connect(&mut self, addr: SocketAddr, color_id: i32, now: Instant) -> Option<SlotId> {
        if let Some(existing) = self.find_by_addr(addr) {
            self.heartbeat(existing, now);
            info!("Player {} re-sent connect from {}", existing.player_number(), addr);
            return Some(existing);
        }

        let index = self.slots.iter().position(Option::is_none)?;
        let id = SlotId(index);
        self.slots[index] = Some(Slot::new(id, addr, color_id, now));

        info!(
            "Player {} connected from {} ({} of {} seats taken)",
            id.player_number(),
            addr,
            self.len(),
            MAX_PLAYERS
        );
        Some(id)
    }

    /// Refreshes a seat's liveness. Returns false if the seat is empty.
    pub fn heartbeat(&mut self, id: SlotId, now: Instant) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                slot.last_heartbeat = now;
                true
            }
            None => false,
        }
    }

    /// Stores the latest input for a seat and counts it as a heartbeat.
    pub fn apply_input(&mut self, id: SlotId, input: PlayerInput, now: Instant) -> bool {
        match self.get_mut(id) {
            Some(slot) => {
                slot.input = input;
                slot.last_heartbeat = now;
                true
            }
            None => false,
        }
    }

    /// Frees every seat that has been silent past the timeout.
    ///
    /// Returns the freed seats so callers can drop anything tied to them.
    pub fn sweep_timeouts(&mut self, now: Instant) -> Vec<SlotId> {
        let timeout = self.heartbeat_timeout;
        let mut evicted = Vec::new();

        for (index, entry) in self.slots.iter_mut().enumerate() {
            if entry.as_ref().is_some_and(|slot| slot.is_timed_out(now, timeout)) {
                *entry = None;
                let id = SlotId(index);
                info!("Player {} disconnected due to timeout", id.player_number());
                evicted.push(id);
            }
        }

        evicted
    }

    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<SlotId> {
        self.iter().find(|(_, slot)| slot.addr == addr).map(|(id, _)| id)
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots[id.index()].as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots[id.index()].as_mut()
    }

    /// Occupied seats in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|slot| (SlotId(index), slot)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut Slot)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|slot| (SlotId(index), slot)))
    }

    /// Addresses of every occupied seat, for broadcasting.
    pub fn addrs(&self) -> Vec<SocketAddr> {
        self.iter().map(|(_, slot)| slot.addr).collect()
    }

    /// Returns the number of occupied seats
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
