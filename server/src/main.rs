use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use shared::SERVER_PORT;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value_t = SERVER_PORT)]
    port: u16,
    /// Milliseconds between socket polls
    #[clap(long, default_value = "10")]
    poll_ms: u64,
    /// Milliseconds between snapshot broadcasts
    #[clap(long, default_value = "100")]
    broadcast_ms: u64,
    /// Milliseconds of silence before a player loses their seat
    #[clap(long, default_value = "5000")]
    timeout_ms: u64,
    /// Largest time step integrated in one tick, in milliseconds
    #[clap(long, default_value = "250")]
    max_dt_ms: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: format!("{}:{}", args.host, args.port),
            poll_interval: Duration::from_millis(args.poll_ms),
            broadcast_interval: Duration::from_millis(args.broadcast_ms),
            heartbeat_timeout: Duration::from_millis(args.timeout_ms),
            max_delta: Duration::from_millis(args.max_dt_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut server = Server::bind(ServerConfig::from(args)).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
