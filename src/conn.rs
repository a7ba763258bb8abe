/*!
 * Connection Data Model
 *
 * Plain records shared by the registry, the pool and the shards: the
 * per-identity connection record, queued outbound writes, the cached
 * interest mask, and the close-notification seam used by shards to tell
 * their owners that a descriptor went away on its own.
 */

use bytes::Bytes;
use mio::Interest;
use std::os::fd::RawFd;
use std::time::{SystemTime, UNIX_EPOCH};

/// Describes one logical connection. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Stable key of the connection, also its routing key.
    pub identity: u64,
    /// Descriptor of the socket. The owning shard holds the socket itself.
    pub fd: RawFd,
    pub peer_address: String,
    pub peer_port: u16,
    /// Ephemeral port the kernel assigned at bind time.
    pub local_port: u16,
    /// Epoch seconds.
    pub last_active_time: u32,
}

/// Current wall-clock time in epoch seconds, saturated into `u32`.
pub fn epoch_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

/// Outbound bytes waiting for write readiness.
///
/// Entries for one descriptor are drained strictly in arrival order; an
/// entry is only dropped once every byte of it has been handed to the kernel.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    bytes: Bytes,
    sent: usize,
}

impl PendingWrite {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes, sent: 0 }
    }

    #[inline]
    pub fn total_len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn sent_offset(&self) -> usize {
        self.sent
    }

    #[inline]
    pub fn fully_sent(&self) -> bool {
        self.sent >= self.bytes.len()
    }

    /// The unsent tail.
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        &self.bytes[self.sent..]
    }

    /// Record `n` more bytes accepted by the kernel.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.sent = (self.sent + n).min(self.bytes.len());
    }
}

/// Last readiness mask successfully applied to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestState {
    Read,
    ReadWrite,
}

impl InterestState {
    #[inline]
    pub fn wants_write(self) -> bool {
        matches!(self, InterestState::ReadWrite)
    }

    pub fn as_mio(self) -> Interest {
        match self {
            InterestState::Read => Interest::READABLE,
            InterestState::ReadWrite => Interest::READABLE | Interest::WRITABLE,
        }
    }
}

/// Why a shard closed a descriptor without being asked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCause {
    /// The peer hung up or the socket reported an error.
    HangUp,
    /// A send failed with a non-retryable error.
    SendFailed,
    /// The shard restarted and dropped everything it owned.
    Orphaned,
}

/// Receives shard-initiated closures.
///
/// Called from the shard's worker thread with none of the shard's locks
/// held. Implementations must not block.
pub trait CloseListener: Send + Sync {
    fn on_close(&self, fd: RawFd, identity: u64, cause: CloseCause);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_write_tracks_offset() {
        let mut w = PendingWrite::new(Bytes::from_static(b"hello world"));
        assert_eq!(w.total_len(), 11);
        w.advance(6);
        assert_eq!(w.sent_offset(), 6);
        assert_eq!(w.remaining(), b"world");
        assert!(!w.fully_sent());
        w.advance(100);
        assert!(w.fully_sent());
        assert!(w.remaining().is_empty());
    }

    #[test]
    fn interest_state_maps_to_mio() {
        assert_eq!(InterestState::Read.as_mio(), Interest::READABLE);
        assert!(InterestState::ReadWrite.as_mio().is_writable());
        assert!(!InterestState::Read.wants_write());
    }
}
