use shardnet::*;
use std::collections::HashSet;
use std::net::TcpListener;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn listen_config(ceiling: usize, shards: usize) -> EngineConfig {
    EngineConfig {
        max_connections: ceiling,
        shard_count: shards,
        role: SocketRole::Listen,
        wait_error_backoff: Duration::from_millis(5),
        ..Default::default()
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn admission_ceiling_scenario() {
    let registry = ConnectionRegistry::new(&listen_config(2, 2)).unwrap();

    registry.build_connection(1, "10.0.0.1", 5001).unwrap();
    registry.build_connection(2, "10.0.0.2", 5002).unwrap();
    let err = registry.build_connection(3, "10.0.0.3", 5003).unwrap_err();
    assert!(matches!(err, EngineError::AdmissionRejected { live: 2, ceiling: 2 }));
    assert!(registry.connection(3).is_none());

    assert!(registry.remove_connection(1));
    let info = registry.build_connection(4, "10.0.0.4", 5004).unwrap();
    assert_eq!(info.identity, 4);
    assert_eq!(registry.live_connections(), 2);
}

#[test]
fn build_is_idempotent_per_identity() {
    let registry = ConnectionRegistry::new(&listen_config(16, 2)).unwrap();
    let first = registry.build_connection(77, "192.168.1.5", 6000).unwrap();
    let second = registry.build_connection(77, "192.168.1.5", 6000).unwrap();
    assert_eq!(first, second);
    assert_eq!(registry.live_connections(), 1);
    assert_eq!(registry.pool().route_count(), 1);
    assert_ne!(first.local_port, 0);
    assert_eq!(first.peer_address, "192.168.1.5");
    assert_eq!(first.peer_port, 6000);
}

#[test]
fn concurrent_builds_never_exceed_ceiling() {
    let ceiling = 10;
    let registry = ConnectionRegistry::new(&listen_config(ceiling, 4)).unwrap();
    let rejected = AtomicUsize::new(0);

    crossbeam::thread::scope(|s| {
        for worker in 0..8u64 {
            let registry = &registry;
            let rejected = &rejected;
            s.spawn(move |_| {
                for n in 0..10u64 {
                    match registry.build_connection(worker * 100 + n, "10.1.1.1", 7000) {
                        Ok(_) => {}
                        Err(EngineError::AdmissionRejected { ceiling: c, .. }) => {
                            assert_eq!(c, ceiling);
                            rejected.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                    assert!(registry.live_connections() <= ceiling);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(registry.live_connections(), ceiling);
    assert_eq!(rejected.load(Ordering::Relaxed), 80 - ceiling);
    assert_eq!(registry.pool().route_count(), ceiling);
}

#[test]
fn concurrent_builds_of_one_identity_share_a_socket() {
    let registry = ConnectionRegistry::new(&listen_config(64, 4)).unwrap();
    let records = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = &registry;
                s.spawn(move |_| registry.build_connection(5, "10.2.2.2", 8000).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    })
    .unwrap();

    let fds: HashSet<_> = records.iter().map(|r| r.fd).collect();
    assert_eq!(fds.len(), 1);
    assert_eq!(registry.live_connections(), 1);
    assert_eq!(registry.pool().route_count(), 1);
}

#[test]
fn racing_build_and_remove_never_strands_a_socket() {
    let rounds = 2000u64;
    let registry = ConnectionRegistry::new(&listen_config(rounds as usize, 2)).unwrap();
    let built_up_to = AtomicU64::new(0);

    crossbeam::thread::scope(|s| {
        let registry = &registry;
        let built_up_to = &built_up_to;
        s.spawn(move |_| {
            for id in 0..rounds {
                registry.build_connection(id, "10.3.3.3", 3).unwrap();
                built_up_to.store(id + 1, Ordering::Release);
            }
        });
        s.spawn(move |_| {
            for id in 0..rounds {
                // Remove as soon as the record becomes visible.
                while registry.connection(id).is_none() && built_up_to.load(Ordering::Acquire) <= id {
                    std::hint::spin_loop();
                }
                assert!(registry.remove_connection(id), "identity {} not removable", id);
            }
        });
    })
    .unwrap();

    let pool = registry.pool();
    let owned: usize = (0..pool.capacity()).map(|i| pool.shard(i).unwrap().len()).sum();
    assert_eq!(owned, 0);
    assert_eq!(pool.route_count(), 0);
    assert_eq!(registry.live_connections(), 0);
    assert!((0..rounds).all(|id| registry.connection(id).is_none()));
}

#[test]
fn remove_twice_is_harmless() {
    let registry = ConnectionRegistry::new(&listen_config(8, 2)).unwrap();
    let a = registry.build_connection(1, "10.0.0.1", 1).unwrap();
    let b = registry.build_connection(2, "10.0.0.2", 2).unwrap();

    assert!(registry.remove_connection(1));
    assert!(!registry.remove_connection(1));
    assert!(!registry.remove_connection(999));

    assert_eq!(registry.live_connections(), 1);
    assert_eq!(registry.pool().route_of(a.fd, 1), None);
    assert!(registry.pool().route_of(b.fd, 2).is_some());
    assert!(registry.is_connection_alive(2));
    assert!(!registry.is_connection_alive(1));
}

#[test]
fn every_live_descriptor_has_exactly_one_owner() {
    let registry = ConnectionRegistry::new(&listen_config(128, 4)).unwrap();
    let infos: Vec<_> = (0..40u64)
        .map(|id| registry.build_connection(id, "10.0.0.9", 9).unwrap())
        .collect();

    let pool = registry.pool();
    for info in &infos {
        let routed = pool.route_of(info.fd, info.identity).unwrap();
        assert_eq!(routed, pool.shard_for(info.identity));
        let owners = (0..pool.capacity())
            .filter(|&i| pool.shard(i).unwrap().owns(info.fd, info.identity))
            .count();
        assert_eq!(owners, 1);
    }
}

#[test]
fn send_requires_a_registered_identity() {
    let registry = ConnectionRegistry::new(&listen_config(8, 1)).unwrap();
    let info = registry.build_connection(3, "10.0.0.3", 3).unwrap();

    let err = registry.send_data(info.fd, 4, &b"nope"[..]).unwrap_err();
    assert!(matches!(err, EngineError::SendOnUnknownRoute { identity: 4, .. }));
    let err = registry.send_data(info.fd + 1000, 3, &b"nope"[..]).unwrap_err();
    assert!(err.is_route_miss());
    let err = registry.send(42, &b"nope"[..]).unwrap_err();
    assert!(matches!(err, EngineError::UnknownIdentity(42)));
    assert!(err.is_route_miss());
}

#[test]
fn peer_hang_up_clears_registry_entry() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let cfg = EngineConfig {
        role: SocketRole::Connect,
        ..listen_config(8, 2)
    };
    let registry = ConnectionRegistry::new(&cfg).unwrap();

    let info = registry.build_connection(21, "127.0.0.1", port).unwrap();
    let (peer, _) = listener.accept().unwrap();
    assert!(registry.is_connection_alive(21));

    drop(peer);
    assert!(wait_until(|| registry.connection(21).is_none()));
    assert_eq!(registry.live_connections(), 0);
    assert_eq!(registry.pool().route_of(info.fd, 21), None);
    assert!(!registry.remove_connection(21));
}

#[test]
fn connect_role_rejects_hostnames() {
    let cfg = EngineConfig {
        role: SocketRole::Connect,
        ..listen_config(8, 1)
    };
    let registry = ConnectionRegistry::new(&cfg).unwrap();
    assert!(matches!(
        registry.build_connection(1, "example.invalid", 80),
        Err(EngineError::InvalidPeerAddress(_))
    ));
    assert_eq!(registry.live_connections(), 0);
}

#[test]
fn shutdown_forgets_everything() {
    let registry = ConnectionRegistry::new(&listen_config(8, 2)).unwrap();
    for id in 0..4u64 {
        registry.build_connection(id, "10.0.0.1", 1).unwrap();
    }
    registry.shutdown();
    assert_eq!(registry.live_connections(), 0);
    assert!(registry.connection(0).is_none());
    assert_eq!(registry.pool().route_count(), 0);
}
