/*!
 * shardnet Load Driver
 *
 * Starts a connection registry from the environment, opens a batch of
 * connections toward a peer, pushes a payload through every one of them,
 * reports what happened and tears everything down.
 *
 * Usage: shardnet <peer-ip> <peer-port> [connections] [payload-bytes]
 */

use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use shardnet::{ConnectionInfo, ConnectionRegistry, EngineConfig, SocketRole};
use std::time::{Duration, Instant};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    // Initialize logging - respects RUST_LOG environment variable
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: shardnet <peer-ip> <peer-port> [connections] [payload-bytes]");
    }
    let peer_ip = args[0].clone();
    let peer_port: u16 = args[1].parse().context("peer port")?;
    let connections: u64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(100);
    let payload_len: usize = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(64 * 1024);

    let mut cfg = EngineConfig::from_env();
    cfg.role = SocketRole::Connect;
    let registry = ConnectionRegistry::new(&cfg)?;
    println!(
        "shardnet driving {} connections to {}:{} across {} shards",
        connections,
        peer_ip,
        peer_port,
        registry.pool().capacity()
    );

    let started = Instant::now();
    let built: Vec<ConnectionInfo> = crossbeam::thread::scope(|s| {
        let workers: Vec<_> = (0..4u64)
            .map(|w| {
                let registry = &registry;
                let peer_ip = &peer_ip;
                s.spawn(move |_| {
                    (0..connections)
                        .filter(|id| id % 4 == w)
                        .filter_map(|id| match registry.build_connection(id, peer_ip, peer_port) {
                            Ok(info) => Some(info),
                            Err(e) => {
                                log::warn!("identity {}: {}", id, e);
                                None
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_default())
            .collect()
    })
    .map_err(|_| anyhow!("connection builder panicked"))?;
    println!("built {} connections in {:?}", built.len(), started.elapsed());

    let payload = Bytes::from(vec![b'x'; payload_len]);
    let mut queued = 0usize;
    for info in &built {
        match registry.send_data(info.fd, info.identity, payload.clone()) {
            Ok(()) => queued += 1,
            Err(e) => log::warn!("identity {}: {}", info.identity, e),
        }
    }
    println!("queued {} bytes on {} connections", payload_len, queued);

    // Give the shards a moment to flush before tearing down.
    std::thread::sleep(Duration::from_secs(1));
    println!(
        "{} connections still alive, shard health {:?}",
        built.iter().filter(|i| registry.is_connection_alive(i.identity)).count(),
        registry.pool().health()
    );

    for info in &built {
        registry.remove_connection(info.identity);
    }
    registry.shutdown();
    Ok(())
}
