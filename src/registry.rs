/*!
 * Connection Registry
 *
 * The process-facing entry point of the engine. It enforces the admission
 * ceiling, builds and tunes sockets, delegates routing to the shard pool and
 * keeps the identity -> connection record map.
 *
 * A registry is an ordinary value: construct one at startup and pass it (or
 * an `Arc` of it) to whoever needs it.
 */

use crate::config::{EngineConfig, SocketRole};
use crate::conn::{epoch_seconds, CloseCause, CloseListener, ConnectionInfo};
use crate::error::{EngineError, Result};
use crate::net::{build_socket, parse_peer};
use crate::pool::ShardPool;
use crate::shard::{DiscardInbound, InboundHandler};
use bytes::Bytes;
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

type AHash = BuildHasherDefault<ahash::AHasher>;

/// Identity map plus the live counter that backs admission.
///
/// The counter moves only together with the map: a slot is reserved before
/// a socket is built, handed over to the map entry on insert, and released
/// exactly once when that entry is erased.
///
/// A record is published only once its socket is owned by a shard. While
/// that is in progress the identity sits in `building`, invisible to
/// removal and sends; concurrent builders of the same identity wait on
/// `built` and then pick up the published record.
struct ConnectionTable {
    connections: RwLock<HashMap<u64, ConnectionInfo, AHash>>,
    building: Mutex<HashSet<u64, AHash>>,
    built: Condvar,
    live: AtomicUsize,
    ceiling: usize,
}

/// Outcome of claiming an identity for a build.
enum Claim<'a> {
    Existing(ConnectionInfo),
    Vacant(Building<'a>),
}

impl ConnectionTable {
    fn new(ceiling: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::default()),
            building: Mutex::new(HashSet::default()),
            built: Condvar::new(),
            live: AtomicUsize::new(0),
            ceiling,
        }
    }

    fn get(&self, identity: u64) -> Option<ConnectionInfo> {
        self.connections.read().get(&identity).cloned()
    }

    /// Return the published record of `identity`, or make the caller its
    /// only builder. Blocks while another build of it is in flight.
    fn claim(&self, identity: u64) -> Claim<'_> {
        let mut building = self.building.lock();
        loop {
            if let Some(existing) = self.get(identity) {
                return Claim::Existing(existing);
            }
            if building.insert(identity) {
                return Claim::Vacant(Building { table: self, identity });
            }
            self.built.wait(&mut building);
        }
    }

    /// Make `info` visible and hand its admission slot over to the entry,
    /// unless `still_routed` reports the socket already closed.
    ///
    /// The check runs under the map lock: a close that lands after it finds
    /// the record and erases it as usual.
    fn publish(
        &self,
        info: ConnectionInfo,
        slot: Slot<'_>,
        still_routed: impl FnOnce() -> bool,
    ) -> bool {
        let mut map = self.connections.write();
        if !still_routed() {
            return false;
        }
        map.insert(info.identity, info);
        slot.commit();
        true
    }

    fn reserve(&self) -> Result<Slot<'_>> {
        self.live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.ceiling).then_some(n + 1)
            })
            .map(|_| Slot { table: self, armed: true })
            .map_err(|live| EngineError::AdmissionRejected {
                live,
                ceiling: self.ceiling,
            })
    }

    fn release(&self) {
        let _ = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    /// Erase `identity` only if it still refers to `fd`.
    fn remove_if(&self, identity: u64, fd: RawFd) -> Option<ConnectionInfo> {
        let removed = {
            let mut map = self.connections.write();
            let current = map.get(&identity).map_or(false, |info| info.fd == fd);
            if current {
                map.remove(&identity)
            } else {
                None
            }
        };
        if removed.is_some() {
            self.release();
        }
        removed
    }
}

impl CloseListener for ConnectionTable {
    fn on_close(&self, fd: RawFd, identity: u64, cause: CloseCause) {
        if self.remove_if(identity, fd).is_some() {
            log::warn!(
                "connection for identity {} dropped (fd {}, {:?})",
                identity,
                fd,
                cause
            );
        }
    }
}

/// A reserved admission slot, returned to the counter unless committed.
struct Slot<'a> {
    table: &'a ConnectionTable,
    armed: bool,
}

impl Slot<'_> {
    fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.table.release();
        }
    }
}

/// Exclusive right to build one identity, given back on drop.
struct Building<'a> {
    table: &'a ConnectionTable,
    identity: u64,
}

impl Drop for Building<'_> {
    fn drop(&mut self) {
        self.table.building.lock().remove(&self.identity);
        self.table.built.notify_all();
    }
}

pub struct ConnectionRegistry {
    table: Arc<ConnectionTable>,
    pool: ShardPool,
    cfg: EngineConfig,
}

impl ConnectionRegistry {
    /// Start a registry whose shards discard inbound bytes.
    pub fn new(cfg: &EngineConfig) -> Result<Self> {
        Self::with_inbound(cfg, Arc::new(DiscardInbound))
    }

    /// Start a registry with a custom read path.
    pub fn with_inbound(cfg: &EngineConfig, inbound: Arc<dyn InboundHandler>) -> Result<Self> {
        cfg.validate()?;
        let table = Arc::new(ConnectionTable::new(cfg.max_connections));
        let weak: Weak<ConnectionTable> = Arc::downgrade(&table);
        let downstream: Weak<dyn CloseListener> = weak;
        let pool = ShardPool::start(cfg, inbound, Some(downstream))?;

        log::info!(
            "connection registry ready: ceiling {}, {} shards, role {:?}",
            cfg.max_connections,
            pool.capacity(),
            cfg.role
        );
        Ok(Self {
            table,
            pool,
            cfg: cfg.clone(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn pool(&self) -> &ShardPool {
        &self.pool
    }

    /// Connections currently admitted.
    pub fn live_connections(&self) -> usize {
        self.table.live.load(Ordering::Acquire)
    }

    pub fn connection(&self, identity: u64) -> Option<ConnectionInfo> {
        self.table.get(identity)
    }

    /// Registered and still routed to a shard.
    pub fn is_connection_alive(&self, identity: u64) -> bool {
        self.table
            .get(identity)
            .map_or(false, |info| self.pool.route_of(info.fd, identity).is_some())
    }

    /// Build (or return the existing) connection for `identity`.
    ///
    /// A second call for a live identity returns the same record without
    /// creating a socket; a call racing an in-flight build of the identity
    /// waits for it. Otherwise a slot is reserved against the ceiling, a
    /// socket is built per the configured role and routed to its shard, and
    /// only then is the record published. Any failure releases the slot and
    /// closes the socket.
    ///
    /// # Arguments
    /// * `identity` - Stable key of the connection
    /// * `peer_address` - Literal IP of the peer
    /// * `peer_port` - Port of the peer
    pub fn build_connection(
        &self,
        identity: u64,
        peer_address: &str,
        peer_port: u16,
    ) -> Result<ConnectionInfo> {
        let _building = match self.table.claim(identity) {
            Claim::Existing(existing) => {
                log::warn!("connection for identity {} already exists", identity);
                return Ok(existing);
            }
            Claim::Vacant(building) => building,
        };

        let slot = self.table.reserve().map_err(|e| {
            log::error!("cannot build connection for identity {}: {}", identity, e);
            e
        })?;

        let peer = match self.cfg.role {
            SocketRole::Connect => Some(parse_peer(peer_address, peer_port)?),
            SocketRole::Listen => None,
        };
        let built = build_socket(&self.cfg, self.cfg.role, peer).map_err(|e| {
            log::error!("socket setup for identity {} failed: {}", identity, e);
            e
        })?;

        let info = ConnectionInfo {
            identity,
            fd: built.socket.as_raw_fd(),
            peer_address: peer_address.to_string(),
            peer_port,
            local_port: built.local_port,
            last_active_time: epoch_seconds(),
        };

        let state = built.state;
        let (fd, shard) = self.pool.add_user_socket(built.socket, identity)?;
        // A hang-up seen before publication already dropped the route and
        // found no record to erase.
        if !self
            .table
            .publish(info.clone(), slot, || self.pool.route_of(fd, identity).is_some())
        {
            log::warn!("connection for identity {} closed during setup (fd {})", identity, fd);
            return Err(EngineError::ClosedDuringSetup { fd, identity });
        }

        log::info!(
            "built connection for identity {}: fd {}, local port {}, shard {}, {:?}",
            identity,
            fd,
            info.local_port,
            shard,
            state
        );
        Ok(info)
    }

    /// Tear down the connection for `identity`.
    ///
    /// Returns `false` (and logs) when the identity is unknown, including
    /// on a repeated call.
    pub fn remove_connection(&self, identity: u64) -> bool {
        let Some(info) = self.table.get(identity) else {
            log::warn!("remove of unknown identity {}", identity);
            return false;
        };

        if let Err(e) = self.pool.remove_user_socket(info.fd, identity) {
            log::debug!("descriptor of identity {} already gone: {}", identity, e);
        }
        match self.table.remove_if(identity, info.fd) {
            Some(_) => {
                log::info!("removed connection for identity {} (fd {})", identity, info.fd);
                true
            }
            None => false,
        }
    }

    /// Queue `bytes` on the connection registered as (`fd`, `identity`).
    pub fn send_data(&self, fd: RawFd, identity: u64, bytes: impl Into<Bytes>) -> Result<()> {
        match self.table.get(identity) {
            Some(info) if info.fd == fd => self.pool.send_data(fd, identity, bytes.into()),
            _ => {
                log::error!("send for unregistered identity {} fd {}", identity, fd);
                Err(EngineError::SendOnUnknownRoute { fd, identity })
            }
        }
    }

    /// Queue `bytes` on the connection of `identity`, whatever its descriptor.
    pub fn send(&self, identity: u64, bytes: impl Into<Bytes>) -> Result<()> {
        match self.table.get(identity) {
            Some(info) => self.send_data(info.fd, identity, bytes),
            None => {
                log::error!("send for unregistered identity {}", identity);
                Err(EngineError::UnknownIdentity(identity))
            }
        }
    }

    /// Stop all shards and forget every connection.
    pub fn shutdown(&self) {
        self.pool.shutdown();
        let mut map = self.table.connections.write();
        let dropped = map.len();
        map.clear();
        self.table.live.store(0, Ordering::Release);
        log::info!("connection registry shut down, {} connections dropped", dropped);
    }
}
