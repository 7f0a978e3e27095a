//! Server network layer: the datagram socket and the loop that drives the world.

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::game::{TickReport, World};
use log::{debug, error, info, warn};
use shared::{decode_client, encode, Message, ServerConnectAck};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

/// Larger than any message the protocol defines, so oversized datagrams still
/// arrive with a length that fails to decode instead of being cut to fit.
const RECV_BUFFER_SIZE: usize = 1024;

/// Ticks between statistics lines in the debug log.
const STATS_EVERY_TICKS: u32 = 50;

/// Owns the socket and the world; everything runs on the task calling [`Server::run`].
pub struct Server {
    socket: UdpSocket,
    world: World,
    config: ServerConfig,
    last_broadcast: Instant,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_addr.clone(),
                source,
            })?;
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Self {
            socket,
            world: World::new(config.heartbeat_timeout),
            config,
            last_broadcast: Instant::now(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    async fn send(&self, message: &Message, addr: SocketAddr) -> Result<()> {
        let bytes = encode(message)?;
        self.socket.send_to(&bytes, addr).await?;
        Ok(())
    }

    /// Encodes once and sends the same bytes to every address. A failed send
    /// to one peer is logged and does not stop the rest.
    async fn broadcast(&self, message: &Message, recipients: &[SocketAddr]) -> Result<()> {
        let bytes = encode(message)?;
        for addr in recipients {
            if let Err(e) = self.socket.send_to(&bytes, *addr).await {
                error!("Failed to send {:?} to {}: {}", message.command(), addr, e);
            }
        }
        Ok(())
    }

    /// Handles every datagram already queued on the socket without waiting
    /// for more. Returns how many were read.
    pub async fn poll_inbound(&mut self) -> usize {
        let mut buffer = [0u8; RECV_BUFFER_SIZE];
        let mut received = 0;

        loop {
            match self.socket.try_recv_from(&mut buffer) {
                Ok((len, addr)) => {
                    received += 1;
                    match self.handle_datagram(&buffer[..len], addr).await {
                        Ok(()) => {}
                        Err(ServerError::Codec(e)) => {
                            debug!("Dropping {} byte datagram from {}: {}", len, addr, e);
                        }
                        Err(e) => error!("Failed to answer {}: {}", addr, e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                // Some platforms surface ICMP port-unreachable from an earlier send here.
                Err(e) if e.kind() == ErrorKind::ConnectionReset => continue,
                Err(e) => {
                    error!("Error receiving datagram: {}", e);
                    break;
                }
            }
        }

        received
    }

    async fn handle_datagram(&mut self, bytes: &[u8], addr: SocketAddr) -> Result<()> {
        let message = decode_client(bytes)?;

        let now = Instant::now();
        match message {
            Message::Connect(connect) => {
                let Some(id) = self.world.connect(addr, connect.tank_color_id, now) else {
                    warn!("Lobby full, ignoring connect from {}", addr);
                    return Ok(());
                };

                let ack = Message::ConnectAck(ServerConnectAck {
                    player_number: id.player_number(),
                });
                self.send(&ack, addr).await?;
                self.send(&Message::GameInit(self.world.game_init(id)), addr).await?;
            }
            Message::Update(update) => {
                if self.world.apply_update(&update, now).is_none() {
                    debug!(
                        "Update for unknown player {} from {}",
                        update.player_number, addr
                    );
                }
            }
            Message::Heartbeat(heartbeat) => {
                if !self.world.heartbeat(heartbeat.player_number, now) {
                    debug!(
                        "Heartbeat for unknown player {} from {}",
                        heartbeat.player_number, addr
                    );
                }
            }
            other => {
                debug!("Ignoring {:?} sent by {}", other.command(), addr);
            }
        }
        Ok(())
    }

    /// Advances the world by the time since the previous tick and sends the
    /// resulting snapshot to every seated player.
    pub async fn broadcast_tick(&mut self) -> TickReport {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_broadcast);
        self.last_broadcast = now;

        let (dt, capped) = self.config.tick_delta(elapsed);
        if capped {
            warn!(
                "Large delta time detected ({:.3}s), capping to {:.3}s",
                elapsed.as_secs_f32(),
                dt
            );
        }

        let report = self.world.tick(now, dt);

        let recipients = self.world.recipients();
        if !recipients.is_empty() {
            // One encoding per tick so every peer sees the same bytes.
            let snapshot = Message::GameState(Box::new(report.snapshot));
            if let Err(e) = self.broadcast(&snapshot, &recipients).await {
                error!("Failed to broadcast snapshot: {}", e);
            }

            if let Some(over) = report.match_over {
                if let Err(e) = self.broadcast(&Message::MatchOver(over), &recipients).await {
                    error!("Failed to broadcast match result: {}", e);
                }
            }
        }

        if self.world.tick % STATS_EVERY_TICKS == 0 && !recipients.is_empty() {
            debug!(
                "Tick {}: {} players, {} bullets, {:.1}Hz",
                self.world.tick,
                recipients.len(),
                report.snapshot.num_bullets,
                1.0 / elapsed.as_secs_f32().max(f32::EPSILON)
            );
        }

        report
    }

    /// Main loop. Only returns if the runtime is shut down around it.
    pub async fn run(&mut self) -> Result<()> {
        let mut poll = interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.last_broadcast = Instant::now();

        info!(
            "Server started: poll every {:?}, broadcast every {:?}",
            self.config.poll_interval, self.config.broadcast_interval
        );

        loop {
            poll.tick().await;
            self.poll_inbound().await;

            if self.last_broadcast.elapsed() >= self.config.broadcast_interval {
                self.broadcast_tick().await;
            }
        }
    }
}
