//! Integration tests for the arena server
//!
//! These tests run a real server on a loopback socket and talk to it the way
//! a game client would.

use server::config::ServerConfig;
use server::network::Server;
use shared::{
    decode_server, encode, ClientConnect, ClientHeartbeat, ClientUpdate, Command,
    GameStateMessage, Message, MAX_PLAYERS,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tokio_test::assert_ok;

fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        ..Default::default()
    }
}

async fn start_server(config: ServerConfig) -> (SocketAddr, JoinHandle<()>) {
    let mut server = assert_ok!(Server::bind(config).await);
    let addr = assert_ok!(server.local_addr());
    let handle = tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, handle)
}

async fn client_for(server: SocketAddr) -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(server).await.unwrap();
    socket
}

async fn send(socket: &UdpSocket, message: Message) {
    socket.send(&encode(&message).unwrap()).await.unwrap();
}

/// Waits for the first message `pick` accepts, skipping everything else.
async fn recv_where<T>(
    socket: &UdpSocket,
    wait: Duration,
    mut pick: impl FnMut(Message) -> Option<T>,
) -> Option<T> {
    let deadline = Instant::now() + wait;
    let mut buffer = [0u8; 1024];

    loop {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        let len = timeout(remaining, socket.recv(&mut buffer)).await.ok()?.ok()?;
        if let Some(found) = decode_server(&buffer[..len]).ok().and_then(&mut pick) {
            return Some(found);
        }
    }
}

async fn join(socket: &UdpSocket, color: i32) -> Option<i32> {
    send(socket, Message::Connect(ClientConnect { tank_color_id: color })).await;
    recv_where(socket, Duration::from_millis(500), |m| match m {
        Message::ConnectAck(ack) => Some(ack.player_number),
        _ => None,
    })
    .await
}

async fn next_snapshot(socket: &UdpSocket) -> Option<Box<GameStateMessage>> {
    recv_where(socket, Duration::from_millis(500), |m| match m {
        Message::GameState(state) => Some(state),
        _ => None,
    })
    .await
}

/// CONNECTION LIFECYCLE TESTS
mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn connect_receives_ack_then_game_init() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;

        assert_eq!(join(&client, 1).await, Some(1));

        let init = recv_where(&client, Duration::from_millis(500), |m| match m {
            Message::GameInit(init) => Some(init),
            _ => None,
        })
        .await
        .expect("No game init received");
        assert_eq!(init.player_id, 1);
        assert_eq!((init.arena_width, init.arena_height), (800, 600));

        server.abort();
    }

    #[tokio::test]
    async fn ack_is_eight_bytes_tagged_connect() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;

        send(&client, Message::Connect(ClientConnect::default())).await;
        let mut buffer = [0u8; 1024];
        let len = timeout(Duration::from_millis(500), client.recv(&mut buffer))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(len, 8);
        assert_eq!(&buffer[..4], &Command::Connect.tag().to_le_bytes());
        assert_eq!(&buffer[..4], &0u32.to_le_bytes());
        assert_eq!(&buffer[4..8], &1i32.to_le_bytes());

        server.abort();
    }

    #[tokio::test]
    async fn players_get_consecutive_numbers() {
        let (addr, server) = start_server(test_config()).await;

        for expected in 1..=MAX_PLAYERS as i32 {
            let client = client_for(addr).await;
            assert_eq!(join(&client, 0).await, Some(expected));
        }

        server.abort();
    }

    #[tokio::test]
    async fn fifth_player_gets_no_reply() {
        let (addr, server) = start_server(test_config()).await;

        let mut seated = Vec::new();
        for _ in 0..MAX_PLAYERS {
            let client = client_for(addr).await;
            assert!(join(&client, 0).await.is_some());
            seated.push(client);
        }

        let extra = client_for(addr).await;
        send(&extra, Message::Connect(ClientConnect::default())).await;
        let anything = recv_where(&extra, Duration::from_millis(500), Some).await;
        assert!(anything.is_none(), "Unseated client received {:?}", anything);

        server.abort();
    }

    #[tokio::test]
    async fn reconnect_from_same_address_keeps_seat() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;

        let first = join(&client, 0).await;
        let second = join(&client, 0).await;
        assert_eq!(first, Some(1));
        assert_eq!(second, first);

        let snapshot = next_snapshot(&client).await.expect("No snapshot received");
        assert_eq!(snapshot.num_players, 1);

        server.abort();
    }

    #[tokio::test]
    async fn silent_player_is_evicted_and_seat_reused() {
        let config = ServerConfig {
            heartbeat_timeout: Duration::from_millis(300),
            ..test_config()
        };
        let (addr, server) = start_server(config).await;

        let quiet = client_for(addr).await;
        let chatty = client_for(addr).await;
        assert_eq!(join(&quiet, 0).await, Some(1));
        let chatty_number = join(&chatty, 0).await.unwrap();
        assert_eq!(chatty_number, 2);

        let mut evicted = false;
        for _ in 0..20 {
            send(
                &chatty,
                Message::Heartbeat(ClientHeartbeat {
                    player_number: chatty_number,
                }),
            )
            .await;
            if let Some(snapshot) = next_snapshot(&chatty).await {
                let tanks = snapshot.active_tanks();
                if tanks.len() == 1 {
                    assert_eq!(tanks[0].player_number, chatty_number);
                    evicted = true;
                    break;
                }
            }
        }
        assert!(evicted, "Silent player was never evicted");

        let newcomer = client_for(addr).await;
        assert_eq!(join(&newcomer, 0).await, Some(1));

        server.abort();
    }
}

/// GAMEPLAY TESTS
mod gameplay_tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_lists_connected_tank() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;
        join(&client, 3).await.unwrap();

        let snapshot = next_snapshot(&client).await.expect("No snapshot received");
        let tanks = snapshot.active_tanks();

        assert_eq!(tanks.len(), 1);
        assert_eq!(tanks[0].player_number, 1);
        assert_eq!((tanks[0].x, tanks[0].y), (190, 190));
        assert_eq!(tanks[0].health, 3);
        assert_eq!(tanks[0].tank_color_id, 3);
        assert_eq!(snapshot.num_bullets, 0);

        server.abort();
    }

    #[tokio::test]
    async fn held_input_moves_tank() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;
        let player_number = join(&client, 0).await.unwrap();

        send(
            &client,
            Message::Update(ClientUpdate {
                player_number,
                down: true,
                ..Default::default()
            }),
        )
        .await;

        let mut moved = false;
        for _ in 0..5 {
            let snapshot = next_snapshot(&client).await.expect("No snapshot received");
            if snapshot.active_tanks()[0].y > 190 {
                assert_eq!(snapshot.active_tanks()[0].x, 190);
                moved = true;
                break;
            }
        }
        assert!(moved, "Tank never moved");

        server.abort();
    }

    #[tokio::test]
    async fn shooting_puts_bullet_in_snapshot() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;
        let player_number = join(&client, 0).await.unwrap();

        send(
            &client,
            Message::Update(ClientUpdate {
                player_number,
                shooting: true,
                ..Default::default()
            }),
        )
        .await;

        let mut seen = false;
        for _ in 0..5 {
            let snapshot = next_snapshot(&client).await.expect("No snapshot received");
            if let Some(bullet) = snapshot.active_bullets().first() {
                assert_eq!(bullet.owner_id, player_number);
                assert!(bullet.active);
                assert!(snapshot.active_tanks()[0].shooting);
                seen = true;
                break;
            }
        }
        assert!(seen, "Bullet never appeared");

        server.abort();
    }
}

/// ROBUSTNESS TESTS
mod robustness_tests {
    use super::*;

    #[tokio::test]
    async fn malformed_datagrams_are_ignored() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;

        // Unknown length, unknown tag, and an UPDATE tag on an 8-byte body.
        client.send(&[0u8; 13]).await.unwrap();
        client.send(&bincode::serialize(&(99u32, 0i32)).unwrap()).await.unwrap();
        client.send(&bincode::serialize(&(1u32, 0i32)).unwrap()).await.unwrap();

        let anything = recv_where(&client, Duration::from_millis(300), Some).await;
        assert!(anything.is_none());

        assert_eq!(join(&client, 0).await, Some(1));

        server.abort();
    }

    #[tokio::test]
    async fn update_for_empty_seat_changes_nothing() {
        let (addr, server) = start_server(test_config()).await;
        let client = client_for(addr).await;
        join(&client, 0).await.unwrap();

        send(
            &client,
            Message::Update(ClientUpdate {
                player_number: 4,
                shooting: true,
                ..Default::default()
            }),
        )
        .await;
        sleep(Duration::from_millis(50)).await;

        let snapshot = next_snapshot(&client).await.expect("No snapshot received");
        assert_eq!(snapshot.num_players, 1);
        assert_eq!(snapshot.num_bullets, 0);

        server.abort();
    }
}
