//! Headless client: joins a running server, drives a tank with random keys and
//! logs what comes back.

use clap::Parser;
use log::{info, warn};
use rand::Rng;
use shared::{
    decode_server, encode, ClientConnect, ClientHeartbeat, ClientUpdate, Message, SERVER_PORT,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, sleep, timeout, Instant};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server address
    #[clap(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], SERVER_PORT)))]
    server: SocketAddr,
    /// Colour requested for the tank
    #[clap(short, long, default_value = "0")]
    color: i32,
    /// Seconds to keep playing
    #[clap(short, long, default_value = "10")]
    duration: u64,
    /// Connect attempts before giving up
    #[clap(short, long, default_value = "5")]
    retries: u32,
}

async fn send(socket: &UdpSocket, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
    socket.send(&encode(message)?).await?;
    Ok(())
}

async fn recv(socket: &UdpSocket, wait: Duration) -> Option<Message> {
    let mut buffer = [0u8; 1024];
    let len = timeout(wait, socket.recv(&mut buffer)).await.ok()?.ok()?;
    match decode_server(&buffer[..len]) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Undecodable datagram: {}", e);
            None
        }
    }
}

async fn join(socket: &UdpSocket, args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let connect = Message::Connect(ClientConnect {
        tank_color_id: args.color,
    });

    for attempt in 1..=args.retries {
        info!("Connecting to {} (attempt {})", args.server, attempt);
        send(socket, &connect).await?;

        if let Some(Message::ConnectAck(ack)) = recv(socket, Duration::from_secs(1)).await {
            return Ok(ack.player_number);
        }
    }

    Err(format!("no answer from {} after {} attempts", args.server, args.retries).into())
}

fn random_update(rng: &mut impl Rng, player_number: i32, color: i32) -> ClientUpdate {
    ClientUpdate {
        player_number,
        angle: 0.0,
        up: rng.gen_bool(0.6),
        down: rng.gen_bool(0.1),
        left: rng.gen_bool(0.2),
        right: rng.gen_bool(0.2),
        shooting: rng.gen_bool(0.1),
        tank_color_id: color,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(args.server).await?;
    info!("Client socket bound to {}", socket.local_addr()?);

    let player_number = join(&socket, &args).await?;
    info!("Seated as player {}", player_number);

    let mut rng = rand::thread_rng();
    let mut input_timer = interval(Duration::from_millis(50));
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut snapshots = 0u32;

    while Instant::now() < deadline {
        input_timer.tick().await;
        let update = random_update(&mut rng, player_number, args.color);
        send(&socket, &Message::Update(update)).await?;

        while let Some(message) = recv(&socket, Duration::from_millis(1)).await {
            match message {
                Message::GameState(state) => {
                    snapshots += 1;
                    if snapshots % 10 == 0 {
                        for tank in state.active_tanks() {
                            info!(
                                "  Player {}: pos=({}, {}) angle={:.0} health={}",
                                tank.player_number, tank.x, tank.y, tank.angle, tank.health
                            );
                        }
                        info!("  {} bullets in flight", state.num_bullets);
                    }
                }
                Message::GameInit(init) => {
                    info!("Arena is {}x{}", init.arena_width, init.arena_height)
                }
                Message::MatchOver(over) => {
                    info!("Match over, player {} won", over.winning_player_id)
                }
                other => info!("Unexpected message: {:?}", other.command()),
            }
        }
    }

    send(&socket, &Message::Heartbeat(ClientHeartbeat { player_number })).await?;
    info!("Test client finished after {} snapshots", snapshots);

    // Leave time for the last datagram to go out before the socket closes.
    sleep(Duration::from_millis(10)).await;
    Ok(())
}
