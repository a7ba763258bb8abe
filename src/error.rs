/*!
 * Engine Error Taxonomy
 *
 * Structured failures returned by the registry, the shard pool and the
 * individual shards. Transient conditions (interrupted waits, short sends,
 * connects still in progress) are recovered where they happen and never
 * show up here.
 */

use std::io;
use std::os::fd::RawFd;
use thiserror::Error;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Every failure the engine reports to its callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The live connection count already sits at the configured ceiling.
    #[error("admission rejected: {live} live connections, ceiling is {ceiling}")]
    AdmissionRejected { live: usize, ceiling: usize },

    #[error("socket creation failed: {0}")]
    SocketCreateFailed(#[source] io::Error),

    #[error("bind to an ephemeral port failed: {0}")]
    BindFailed(#[source] io::Error),

    /// The first tuning option that could not be applied. Setup stops there.
    #[error("socket tuning `{option}` failed: {source}")]
    TuningFailed {
        option: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("listen failed: {0}")]
    ListenFailed(#[source] io::Error),

    #[error("connect to {peer} failed: {source}")]
    ConnectFailed {
        peer: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid peer address `{0}`")]
    InvalidPeerAddress(String),

    /// No routing entry exists for this descriptor/identity pair.
    #[error("no route for fd {fd} identity {identity}")]
    RouteNotFound { fd: RawFd, identity: u64 },

    /// A send was requested for an identity the registry does not know.
    #[error("send on unknown route: identity {identity} fd {fd}")]
    SendOnUnknownRoute { fd: RawFd, identity: u64 },

    /// No connection is registered under this identity.
    #[error("unknown identity {0}")]
    UnknownIdentity(u64),

    /// The shard closed the descriptor before its record was published.
    #[error("connection for identity {identity} closed during setup (fd {fd})")]
    ClosedDuringSetup { fd: RawFd, identity: u64 },

    /// A readiness-multiplexer control call (add/modify/delete) failed.
    #[error("interest control failed on fd {fd}: {source}")]
    InterestControlFailed {
        fd: RawFd,
        #[source]
        source: io::Error,
    },

    /// The shard is stopped or could not recreate its multiplexer.
    #[error("shard {0} is unavailable")]
    ShardUnavailable(usize),

    #[error("shard {index} failed to start: {source}")]
    ShardStartFailed {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// Not a single shard could be started.
    #[error("no shard could be started")]
    NoShards,

    #[error("config error: {0}")]
    Config(String),

    /// The standalone sender was used while closed.
    #[error("sender is not open")]
    SenderClosed,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// True for failures that mean "this identity/descriptor is not routed".
    pub fn is_route_miss(&self) -> bool {
        matches!(
            self,
            EngineError::RouteNotFound { .. }
                | EngineError::SendOnUnknownRoute { .. }
                | EngineError::UnknownIdentity(_)
        )
    }
}
