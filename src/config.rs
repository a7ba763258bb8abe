/*!
 * Engine Configuration
 *
 * All tunables of the connection engine live in [`EngineConfig`]. A config is
 * built once at process start (defaults, optionally overridden from the
 * environment) and handed by reference to every constructor.
 */

use crate::error::{EngineError, Result};
use std::str::FromStr;
use std::time::Duration;

/// Default ceiling on simultaneously live connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 25_000;

/// Default listen backlog (matches a raised `net.core.somaxconn`)
pub const DEFAULT_BACKLOG: i32 = 4096;

/// Default per-socket send buffer: 1 MiB
pub const DEFAULT_SEND_BUFFER: usize = 1 << 20;

/// What a freshly built connection socket does after binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketRole {
    /// Listen on the assigned ephemeral port for the peer to dial in.
    Listen,
    /// Issue a non-blocking connect toward the peer.
    Connect,
}

impl FromStr for SocketRole {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "listen" => Ok(SocketRole::Listen),
            "connect" => Ok(SocketRole::Connect),
            other => Err(EngineError::Config(format!("unknown socket role `{}`", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Admission ceiling for live connections.
    pub max_connections: usize,
    /// Backlog passed to `listen` for [`SocketRole::Listen`] sockets.
    pub backlog: i32,
    /// Number of epoll shards started by the pool.
    pub shard_count: usize,
    pub role: SocketRole,
    /// `SO_SNDBUF` applied to every connection socket.
    pub send_buffer: usize,
    /// `SO_SNDTIMEO` applied to every connection socket.
    pub send_timeout: Duration,
    /// Sleep after a failed (non-interrupted) readiness wait.
    pub wait_error_backoff: Duration,
    /// Consecutive failed waits before a shard restarts itself.
    pub restart_threshold: u32,
    /// Capacity of the per-wait event buffer.
    pub events_capacity: usize,
    /// Abort pool startup if any shard fails to start.
    pub require_all_shards: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            backlog: DEFAULT_BACKLOG,
            shard_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            role: SocketRole::Listen,
            send_buffer: DEFAULT_SEND_BUFFER,
            send_timeout: Duration::from_secs(3),
            wait_error_backoff: Duration::from_secs(1),
            restart_threshold: 3,
            events_capacity: 1024,
            require_all_shards: false,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `SHARDNET_*` environment variables.
    ///
    /// Malformed values are logged and ignored so a typo never prevents
    /// startup.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(v) = env_parse("SHARDNET_MAX_CONNECTIONS") {
            cfg.max_connections = v;
        }
        if let Some(v) = env_parse("SHARDNET_BACKLOG") {
            cfg.backlog = v;
        }
        if let Some(v) = env_parse("SHARDNET_SHARDS") {
            cfg.shard_count = v;
        }
        if let Some(v) = env_parse("SHARDNET_ROLE") {
            cfg.role = v;
        }
        if let Some(v) = env_parse("SHARDNET_SEND_BUFFER") {
            cfg.send_buffer = v;
        }
        if let Some(ms) = env_parse::<u64>("SHARDNET_SEND_TIMEOUT_MS") {
            cfg.send_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("SHARDNET_WAIT_BACKOFF_MS") {
            cfg.wait_error_backoff = Duration::from_millis(ms);
        }
        if let Some(v) = env_parse("SHARDNET_REQUIRE_ALL_SHARDS") {
            cfg.require_all_shards = v;
        }
        cfg
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(EngineError::Config("shard_count must be at least 1".into()));
        }
        if self.max_connections == 0 {
            return Err(EngineError::Config("max_connections must be at least 1".into()));
        }
        if self.restart_threshold == 0 {
            return Err(EngineError::Config("restart_threshold must be at least 1".into()));
        }
        if self.events_capacity == 0 {
            return Err(EngineError::Config("events_capacity must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring malformed {}={:?}", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_connections, 25_000);
        assert_eq!(cfg.backlog, 4096);
        assert_eq!(cfg.send_buffer, 1 << 20);
        assert_eq!(cfg.restart_threshold, 3);
        assert!(cfg.shard_count >= 1);
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_shards_rejected() {
        let cfg = EngineConfig { shard_count: 0, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Connect".parse::<SocketRole>().unwrap(), SocketRole::Connect);
        assert_eq!("listen".parse::<SocketRole>().unwrap(), SocketRole::Listen);
        assert!("dial".parse::<SocketRole>().is_err());
    }
}
