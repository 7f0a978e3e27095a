//! Performance benchmarks for critical server systems

use server::game::World;
use shared::{
    decode_server, encode, intersects, BulletState, ClientUpdate, GameStateMessage, Message, Rect,
    TankState, WallSet, MAX_BULLETS, MAX_PLAYERS,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Benchmarks rectangle overlap tests
#[test]
fn benchmark_collision_detection() {
    let tank = Rect::from_ints(100, 100, 64, 64);
    let bullet = Rect::new(150.0, 150.0, 15.0, 15.0);

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = intersects(&tank, &bullet);
    }

    let duration = start.elapsed();
    println!(
        "Collision detection: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 100ms for 100k iterations
    assert!(duration.as_millis() < 100);
}

/// Benchmarks wall checks against every corner
#[test]
fn benchmark_wall_checks() {
    let walls = WallSet::default();
    let samples: Vec<Rect> = (0..100)
        .map(|i| Rect::from_ints((i * 7) % 736, (i * 13) % 536, 64, 64))
        .collect();

    let iterations = 1_000;
    let start = Instant::now();

    for _ in 0..iterations {
        for sample in &samples {
            let _ = walls.blocks(sample);
        }
    }

    let duration = start.elapsed();
    println!(
        "Wall checks: {} samples × {} iterations in {:?}",
        samples.len(),
        iterations,
        duration
    );

    assert!(duration.as_millis() < 500);
}

/// Benchmarks encoding and decoding a full snapshot
#[test]
fn benchmark_snapshot_codec() {
    let tanks: Vec<TankState> = (0..MAX_PLAYERS as i32)
        .map(|i| TankState {
            player_number: i + 1,
            x: i * 100,
            y: i * 50,
            angle: i as f32 * 90.0,
            tank_color_id: i,
            health: 3,
            shooting: i % 2 == 0,
        })
        .collect();
    let bullets: Vec<BulletState> = (0..MAX_BULLETS)
        .map(|i| BulletState {
            x: i as f32 * 10.0,
            y: i as f32 * 5.0,
            vx: 1500.0,
            vy: 0.0,
            active: true,
            owner_id: (i % MAX_PLAYERS) as i32 + 1,
        })
        .collect();
    let message = Message::GameState(Box::new(GameStateMessage::new(&tanks, &bullets)));

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = encode(&message).unwrap();
        assert_eq!(bytes.len(), 532);
        let _ = decode_server(&bytes).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Snapshot codec: {} round trips in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks full world ticks with a busy lobby
#[test]
fn benchmark_world_tick() {
    let now = Instant::now();
    let mut world = World::new(Duration::from_secs(3600));

    for i in 0..MAX_PLAYERS {
        let addr: SocketAddr = format!("127.0.0.1:{}", 9000 + i).parse().unwrap();
        world.connect(addr, i as i32, now).unwrap();
    }

    let iterations = 10_000;
    let start = Instant::now();

    for tick in 0..iterations {
        for player_number in 1..=MAX_PLAYERS as i32 {
            let update = ClientUpdate {
                player_number,
                up: tick % 3 != 0,
                left: tick % 7 == 0,
                shooting: tick % 4 == 0,
                ..Default::default()
            };
            world.apply_update(&update, now);
        }
        let report = world.tick(now, 0.016);
        assert!(report.snapshot.num_bullets as usize <= MAX_BULLETS);
    }

    let duration = start.elapsed();
    println!(
        "World tick: {} ticks in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}
