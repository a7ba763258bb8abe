/*!
 * Shard Pool
 *
 * Starts a fixed set of epoll shards and routes every (descriptor, identity)
 * pair to exactly one of them. Routing is a deterministic hash of the
 * identity modulo the number of running shards, so every operation for an
 * identity lands on the shard that owns its descriptor.
 */

use crate::config::EngineConfig;
use crate::conn::{CloseCause, CloseListener};
use crate::error::{EngineError, Result};
use crate::shard::{EpollShard, InboundHandler, ShardHealth};
use bytes::Bytes;
use parking_lot::RwLock;
use socket2::Socket;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::{Arc, Weak};
use xxhash_rust::xxh3::xxh3_64;

type AHash = BuildHasherDefault<ahash::AHasher>;

/// Shard index for `identity` among `shard_count` shards.
#[inline]
pub fn route_index(identity: u64, shard_count: usize) -> usize {
    debug_assert!(shard_count > 0);
    (xxh3_64(&identity.to_le_bytes()) % shard_count as u64) as usize
}

/// (descriptor, identity) -> shard index, plus the listener shard closures
/// are forwarded to once the route is gone.
struct RouteTable {
    index: RwLock<HashMap<(RawFd, u64), usize, AHash>>,
    downstream: Option<Weak<dyn CloseListener>>,
}

impl RouteTable {
    fn lookup(&self, fd: RawFd, identity: u64) -> Option<usize> {
        self.index.read().get(&(fd, identity)).copied()
    }
}

impl CloseListener for RouteTable {
    fn on_close(&self, fd: RawFd, identity: u64, cause: CloseCause) {
        let route = self.index.write().remove(&(fd, identity));
        log::info!(
            "fd {} (identity {}) closed by shard {:?}: {:?}",
            fd,
            identity,
            route,
            cause
        );
        if let Some(listener) = self.downstream.as_ref().and_then(Weak::upgrade) {
            listener.on_close(fd, identity, cause);
        }
    }
}

pub struct ShardPool {
    shards: Vec<EpollShard>,
    routes: Arc<RouteTable>,
    configured: usize,
}

impl ShardPool {
    /// Start `cfg.shard_count` shards.
    ///
    /// A shard that fails to start is logged and skipped unless
    /// `cfg.require_all_shards` is set; the pool then routes across the
    /// shards that did start. Zero started shards is always an error.
    ///
    /// # Arguments
    /// * `cfg` - Engine configuration
    /// * `inbound` - Read path shared by every shard
    /// * `downstream` - Receives shard-initiated closures after the route is dropped
    pub fn start(
        cfg: &EngineConfig,
        inbound: Arc<dyn InboundHandler>,
        downstream: Option<Weak<dyn CloseListener>>,
    ) -> Result<Self> {
        cfg.validate()?;
        let routes = Arc::new(RouteTable {
            index: RwLock::new(HashMap::default()),
            downstream,
        });

        let mut shards = Vec::with_capacity(cfg.shard_count);
        for slot in 0..cfg.shard_count {
            let listener: Arc<dyn CloseListener> = routes.clone();
            match EpollShard::start(shards.len(), cfg, listener, inbound.clone()) {
                Ok(shard) => shards.push(shard),
                Err(e) => {
                    log::error!("shard slot {} failed to start: {}", slot, e);
                    if cfg.require_all_shards {
                        return Err(e);
                    }
                }
            }
        }

        if shards.is_empty() {
            return Err(EngineError::NoShards);
        }
        if shards.len() < cfg.shard_count {
            log::warn!(
                "shard pool running under capacity: {} of {} shards",
                shards.len(),
                cfg.shard_count
            );
        }
        log::info!("shard pool started with {} shards", shards.len());

        Ok(Self {
            shards,
            routes,
            configured: cfg.shard_count,
        })
    }

    /// Number of shards actually running.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shards.len()
    }

    /// Number of shards requested by the configuration.
    #[inline]
    pub fn configured_shards(&self) -> usize {
        self.configured
    }

    pub fn health(&self) -> Vec<ShardHealth> {
        self.shards.iter().map(EpollShard::health).collect()
    }

    pub fn shard(&self, index: usize) -> Option<&EpollShard> {
        self.shards.get(index)
    }

    #[inline]
    pub fn shard_for(&self, identity: u64) -> usize {
        route_index(identity, self.shards.len())
    }

    /// Shard currently recorded for the pair, if routed.
    pub fn route_of(&self, fd: RawFd, identity: u64) -> Option<usize> {
        self.routes.lookup(fd, identity)
    }

    pub fn route_count(&self) -> usize {
        self.routes.index.read().len()
    }

    fn resolve(&self, fd: RawFd, identity: u64) -> Result<usize> {
        self.routes.lookup(fd, identity).ok_or_else(|| {
            log::error!("no route for fd {} identity {}", fd, identity);
            EngineError::RouteNotFound { fd, identity }
        })
    }

    /// Hand `socket` to the shard owning `identity`.
    ///
    /// Returns the descriptor and the shard index. The socket is closed if
    /// the shard refuses it.
    pub fn add_user_socket(&self, socket: Socket, identity: u64) -> Result<(RawFd, usize)> {
        let fd = socket.as_raw_fd();
        let index = self.shard_for(identity);

        // Recorded first: a hang-up observed by the shard right after
        // registration must find the route it is meant to remove.
        self.routes.index.write().insert((fd, identity), index);
        match self.shards[index].add_socket(socket, identity) {
            Ok(_) => {
                log::info!("added fd {} for identity {} to shard {}", fd, identity, index);
                Ok((fd, index))
            }
            Err(e) => {
                self.routes.index.write().remove(&(fd, identity));
                log::error!(
                    "failed to add fd {} for identity {} to shard {}: {}",
                    fd,
                    identity,
                    index,
                    e
                );
                Err(e)
            }
        }
    }

    /// Remove and close the descriptor routed for the pair.
    ///
    /// Returns whether the shard still owned it; `false` means it had
    /// already been closed by the shard.
    pub fn remove_user_socket(&self, fd: RawFd, identity: u64) -> Result<bool> {
        let index = self.resolve(fd, identity)?;
        let closed = self.shards[index].remove_socket(fd, identity);
        self.routes.index.write().remove(&(fd, identity));
        log::info!(
            "removed fd {} for identity {} from shard {} (closed now: {})",
            fd,
            identity,
            index,
            closed
        );
        Ok(closed)
    }

    /// Queue `bytes` on the shard owning the pair.
    pub fn send_data(&self, fd: RawFd, identity: u64, bytes: Bytes) -> Result<()> {
        let index = self.resolve(fd, identity)?;
        self.shards[index].send_data(fd, identity, bytes).map_err(|e| {
            log::error!(
                "failed to send on fd {} for identity {} via shard {}: {}",
                fd,
                identity,
                index,
                e
            );
            e
        })
    }

    /// Stop every shard (closing everything they own) and clear the
    /// routing index. Safe to call more than once.
    pub fn shutdown(&self) {
        for shard in &self.shards {
            shard.stop();
        }
        let mut index = self.routes.index.write();
        if !index.is_empty() {
            log::debug!("dropping {} routes on shutdown", index.len());
        }
        index.clear();
    }
}

impl Drop for ShardPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
