/*!
 * Epoll Shard
 *
 * A shard owns one readiness multiplexer (a mio `Poll`) and one worker
 * thread blocked on it. Every socket routed to the shard is owned by the
 * shard until it is removed, hung up or orphaned by a restart; all socket
 * I/O for those descriptors happens on the shard's worker.
 *
 * Callers on arbitrary threads add sockets, remove them and queue outbound
 * bytes. Queued bytes are written only from write-readiness events, strictly
 * in arrival order, with write interest armed only while bytes are pending.
 *
 * Lock order: pending -> members -> mux -> interest on the send path,
 * mux -> members -> interest on add. Restart and teardown take these one
 * at a time and never nest them.
 */

use crate::config::EngineConfig;
use crate::conn::{CloseCause, CloseListener, InterestState, PendingWrite};
use crate::error::{EngineError, Result};
use crate::net::would_block;
use bytes::Bytes;
use hashbrown::HashMap;
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Registry, Token, Waker};
use parking_lot::{Mutex, RwLock};
use socket2::Socket;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[cfg(test)]
use std::sync::atomic::AtomicU32;

/// Token reserved for the shutdown waker.
const WAKE_TOKEN: Token = Token(usize::MAX);

/// Size of the scratch buffer used by [`DiscardInbound`]
const READ_BUF: usize = 4096;

/// What the read path reports back to the shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Open,
    /// End of stream; the shard closes the descriptor.
    PeerClosed,
}

/// Application read path, invoked on the shard's worker for read readiness.
///
/// Readiness is edge-triggered: a handler that wants further notifications
/// must consume everything currently readable.
pub trait InboundHandler: Send + Sync {
    fn on_readable(&self, shard: usize, fd: RawFd, identity: u64, socket: &Socket) -> ReadOutcome;
}

/// Default read path: drains and drops inbound bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardInbound;

impl InboundHandler for DiscardInbound {
    fn on_readable(&self, shard: usize, fd: RawFd, identity: u64, mut socket: &Socket) -> ReadOutcome {
        let mut buf = [0u8; READ_BUF];
        let mut total = 0usize;
        loop {
            match socket.read(&mut buf) {
                Ok(0) => return ReadOutcome::PeerClosed,
                Ok(n) => total += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e) if would_block(e) => break,
                Err(e) => {
                    // Listening sockets land here; readiness means a pending accept.
                    log::trace!("shard {}: fd {} (identity {}) not readable as stream: {}", shard, fd, identity, e);
                    break;
                }
            }
        }
        if total > 0 {
            log::trace!("shard {}: discarded {} inbound bytes on fd {} (identity {})", shard, total, fd, identity);
        }
        ReadOutcome::Open
    }
}

/// Liveness of a shard as seen from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShardHealth {
    Running = 0,
    Restarting = 1,
    /// The multiplexer could not be recreated; the shard accepts nothing.
    Failed = 2,
    Stopped = 3,
}

impl ShardHealth {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ShardHealth::Running,
            1 => ShardHealth::Restarting,
            2 => ShardHealth::Failed,
            _ => ShardHealth::Stopped,
        }
    }
}

/// Result of draining one descriptor's write queue.
#[derive(Debug)]
enum DrainOutcome {
    /// Queue emptied, interest demoted to read-only.
    Drained,
    /// The kernel stopped accepting bytes; write interest stays armed.
    Partial,
    /// Nothing was queued.
    Idle,
    Failed(io::Error),
}

/// Why a readiness wait came back without events.
#[derive(Debug)]
enum WaitFailure {
    Transient,
    Fatal(io::Error),
}

/// Control-side handle to the multiplexer the worker is polling.
struct Mux {
    registry: Registry,
    waker: Waker,
}

fn open_mux() -> io::Result<(Poll, Arc<Mux>)> {
    let poll = Poll::new()?;
    let registry = poll.registry().try_clone()?;
    let waker = Waker::new(poll.registry(), WAKE_TOKEN)?;
    Ok((poll, Arc::new(Mux { registry, waker })))
}

struct Member {
    identity: u64,
    token: Token,
    socket: Arc<Socket>,
}

/// Owned descriptors, reachable by number and by registration token.
///
/// Tokens are never reused, so readiness reported for a registration that
/// has since been removed resolves to nothing even when the kernel hands
/// the same descriptor number to a new socket.
#[derive(Default)]
struct Members {
    by_fd: HashMap<RawFd, Member>,
    by_token: HashMap<Token, RawFd>,
}

impl Members {
    fn get(&self, fd: RawFd) -> Option<&Member> {
        self.by_fd.get(&fd)
    }

    fn insert(&mut self, fd: RawFd, member: Member) {
        self.by_token.insert(member.token, fd);
        if let Some(replaced) = self.by_fd.insert(fd, member) {
            self.by_token.remove(&replaced.token);
        }
    }

    fn remove(&mut self, fd: RawFd) -> Option<Member> {
        let member = self.by_fd.remove(&fd)?;
        self.by_token.remove(&member.token);
        Some(member)
    }

    fn resolve(&self, token: Token) -> Option<(RawFd, &Member)> {
        let fd = *self.by_token.get(&token)?;
        self.by_fd.get(&fd).map(|m| (fd, m))
    }

    fn drain(&mut self) -> Vec<(RawFd, Member)> {
        self.by_token.clear();
        self.by_fd.drain().collect()
    }

    fn len(&self) -> usize {
        self.by_fd.len()
    }
}

struct ShardCore {
    index: usize,
    backoff: Duration,
    restart_threshold: u32,
    events_capacity: usize,
    running: AtomicBool,
    health: AtomicU8,
    generation: AtomicU64,
    next_token: AtomicUsize,
    mux: RwLock<Option<Arc<Mux>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    members: RwLock<Members>,
    pending: Mutex<HashMap<RawFd, VecDeque<PendingWrite>>>,
    interest: RwLock<HashMap<RawFd, InterestState>>,
    listener: Arc<dyn CloseListener>,
    inbound: Arc<dyn InboundHandler>,
    #[cfg(test)]
    injected_failures: AtomicU32,
    #[cfg(test)]
    fail_mux_reopen: AtomicBool,
    #[cfg(test)]
    readable_events: AtomicU64,
    #[cfg(test)]
    writable_events: AtomicU64,
}

/// One epoll partition of the connection set.
pub struct EpollShard {
    core: Arc<ShardCore>,
}

impl EpollShard {
    /// Create the multiplexer and launch the worker thread.
    ///
    /// # Arguments
    /// * `index` - Position of the shard inside its pool
    /// * `cfg` - Backoff, restart threshold and event buffer sizing
    /// * `listener` - Told about every descriptor the shard closes on its own
    /// * `inbound` - Read path invoked on read readiness
    pub fn start(
        index: usize,
        cfg: &EngineConfig,
        listener: Arc<dyn CloseListener>,
        inbound: Arc<dyn InboundHandler>,
    ) -> Result<Self> {
        let core = Arc::new(ShardCore {
            index,
            backoff: cfg.wait_error_backoff,
            restart_threshold: cfg.restart_threshold.max(1),
            events_capacity: cfg.events_capacity.max(1),
            running: AtomicBool::new(true),
            health: AtomicU8::new(ShardHealth::Running as u8),
            generation: AtomicU64::new(0),
            next_token: AtomicUsize::new(0),
            mux: RwLock::new(None),
            worker: Mutex::new(None),
            members: RwLock::new(Members::default()),
            pending: Mutex::new(HashMap::new()),
            interest: RwLock::new(HashMap::new()),
            listener,
            inbound,
            #[cfg(test)]
            injected_failures: AtomicU32::new(0),
            #[cfg(test)]
            fail_mux_reopen: AtomicBool::new(false),
            #[cfg(test)]
            readable_events: AtomicU64::new(0),
            #[cfg(test)]
            writable_events: AtomicU64::new(0),
        });

        let fail = |source| EngineError::ShardStartFailed { index, source };
        let (poll, mux) = open_mux().map_err(fail)?;
        *core.mux.write() = Some(mux);
        let handle = ShardCore::spawn_worker(&core, poll).map_err(fail)?;
        *core.worker.lock() = Some(handle);
        core.generation.store(1, Ordering::Release);

        log::info!("shard {} started", index);
        Ok(Self { core })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.core.index
    }

    pub fn health(&self) -> ShardHealth {
        ShardHealth::from_u8(self.core.health.load(Ordering::Acquire))
    }

    /// Bumped each time a multiplexer is (re)created.
    pub fn generation(&self) -> u64 {
        self.core.generation.load(Ordering::Acquire)
    }

    /// Number of descriptors currently owned.
    pub fn len(&self) -> usize {
        self.core.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `fd` is owned by this shard on behalf of `identity`.
    pub fn owns(&self, fd: RawFd, identity: u64) -> bool {
        self.core.token_of(fd, identity).is_some()
    }

    /// Cached interest mask for `fd`, if it is registered.
    pub fn interest_of(&self, fd: RawFd) -> Option<InterestState> {
        self.core.interest.read().get(&fd).copied()
    }

    /// Number of queued writes for `fd` that still have unsent bytes.
    pub fn queued_writes(&self, fd: RawFd) -> usize {
        self.core.pending.lock().get(&fd).map_or(0, |q| q.len())
    }

    /// Take ownership of `socket` and arm edge-triggered read interest.
    ///
    /// On failure the socket is dropped, which closes it.
    pub fn add_socket(&self, socket: Socket, identity: u64) -> Result<RawFd> {
        self.core.add_socket(socket, identity)
    }

    /// Deregister and close `fd`, purging its queued writes.
    ///
    /// Returns `false` when the shard does not own `fd` for `identity`
    /// (already removed or closed on hang-up); nothing is closed then.
    pub fn remove_socket(&self, fd: RawFd, identity: u64) -> bool {
        match self.core.detach(fd, identity) {
            Some(member) => {
                drop(member);
                log::debug!("shard {}: removed fd {} (identity {})", self.core.index, fd, identity);
                true
            }
            None => {
                log::debug!(
                    "shard {}: remove of fd {} (identity {}) ignored, not owned",
                    self.core.index,
                    fd,
                    identity
                );
                false
            }
        }
    }

    /// Queue `bytes` for `fd` and make sure write interest is armed.
    pub fn send_data(&self, fd: RawFd, identity: u64, bytes: Bytes) -> Result<()> {
        self.core.send_data(fd, identity, bytes)
    }

    /// Stop the worker, join it and close every descriptor still owned.
    /// Safe to call more than once.
    pub fn stop(&self) {
        self.core.stop();
    }

    /// Make the next `n` readiness waits fail as if the kernel had refused them.
    #[cfg(test)]
    pub(crate) fn inject_wait_failures(&self, n: u32) {
        self.core.injected_failures.store(n, Ordering::Release);
        if let Some(mux) = self.core.mux.read().as_ref() {
            let _ = mux.waker.wake();
        }
    }

    /// Make the next restart fail to recreate the multiplexer.
    #[cfg(test)]
    pub(crate) fn fail_next_restart(&self) {
        self.core.fail_mux_reopen.store(true, Ordering::Release);
    }
}

impl Drop for EpollShard {
    fn drop(&mut self) {
        self.core.stop();
    }
}

impl ShardCore {
    fn spawn_worker(core: &Arc<Self>, poll: Poll) -> io::Result<JoinHandle<()>> {
        let worker_core = core.clone();
        thread::Builder::new()
            .name(format!("shard-{}", core.index))
            .spawn(move || worker_core.run(poll))
    }

    fn mux(&self) -> Result<Arc<Mux>> {
        self.mux
            .read()
            .clone()
            .ok_or(EngineError::ShardUnavailable(self.index))
    }

    /// Registration token of `fd` if it is owned on behalf of `identity`.
    fn token_of(&self, fd: RawFd, identity: u64) -> Option<Token> {
        self.members
            .read()
            .get(fd)
            .filter(|m| m.identity == identity)
            .map(|m| m.token)
    }

    fn resolve(&self, token: Token) -> Option<(RawFd, u64, Arc<Socket>)> {
        self.members
            .read()
            .resolve(token)
            .map(|(fd, m)| (fd, m.identity, m.socket.clone()))
    }

    fn next_token(&self) -> Token {
        Token(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    fn add_socket(&self, socket: Socket, identity: u64) -> Result<RawFd> {
        let fd = socket.as_raw_fd();
        // Held across registration so a concurrent restart orphans this
        // descriptor instead of missing it.
        let mux_guard = self.mux.read();
        let Some(mux) = mux_guard.as_ref() else {
            log::error!(
                "shard {}: cannot add fd {} for identity {}, multiplexer is down",
                self.index,
                fd,
                identity
            );
            return Err(EngineError::ShardUnavailable(self.index));
        };

        // Ownership is recorded before registration so that a hang-up
        // reported by the very first wait finds its member.
        let token = self.next_token();
        self.members.write().insert(
            fd,
            Member {
                identity,
                token,
                socket: Arc::new(socket),
            },
        );
        self.interest.write().insert(fd, InterestState::Read);

        if let Err(source) = mux
            .registry
            .register(&mut SourceFd(&fd), token, Interest::READABLE)
        {
            log::error!(
                "shard {}: failed to add fd {} for identity {}: {}",
                self.index,
                fd,
                identity,
                source
            );
            self.members.write().remove(fd);
            self.interest.write().remove(&fd);
            return Err(EngineError::InterestControlFailed { fd, source });
        }
        drop(mux_guard);

        log::debug!("shard {}: added fd {} for identity {}", self.index, fd, identity);
        Ok(fd)
    }

    /// Remove `fd` from every table and the multiplexer. The returned
    /// member holds the last reference to the socket, unless the worker is
    /// mid-event on it; either way it is closed exactly once.
    fn detach(&self, fd: RawFd, identity: u64) -> Option<Member> {
        let member = {
            let mut members = self.members.write();
            let owned = members.get(fd).map_or(false, |m| m.identity == identity);
            if owned {
                members.remove(fd)
            } else {
                None
            }
        }?;

        if let Ok(mux) = self.mux() {
            if let Err(e) = mux.registry.deregister(&mut SourceFd(&fd)) {
                log::debug!("shard {}: deregister of fd {} failed: {}", self.index, fd, e);
            }
        }
        self.pending.lock().remove(&fd);
        self.interest.write().remove(&fd);
        Some(member)
    }

    fn send_data(&self, fd: RawFd, identity: u64, bytes: Bytes) -> Result<()> {
        let mut pending = self.pending.lock();
        let Some(token) = self.token_of(fd, identity) else {
            log::error!(
                "shard {}: send for fd {} identity {} but it is not owned here",
                self.index,
                fd,
                identity
            );
            return Err(EngineError::RouteNotFound { fd, identity });
        };
        pending
            .entry(fd)
            .or_default()
            .push_back(PendingWrite::new(bytes));

        if self.interest.read().get(&fd).copied() == Some(InterestState::ReadWrite) {
            return Ok(());
        }

        if let Err(e) = self.apply_interest(fd, token, InterestState::ReadWrite) {
            if let Some(queue) = pending.get_mut(&fd) {
                queue.pop_back();
                if queue.is_empty() {
                    pending.remove(&fd);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn apply_interest(&self, fd: RawFd, token: Token, state: InterestState) -> Result<()> {
        let mux = self.mux()?;
        mux.registry
            .reregister(&mut SourceFd(&fd), token, state.as_mio())
            .map_err(|source| {
                log::error!(
                    "shard {}: failed to set {:?} interest on fd {}: {}",
                    self.index,
                    state,
                    fd,
                    source
                );
                EngineError::InterestControlFailed { fd, source }
            })?;
        self.interest.write().insert(fd, state);
        Ok(())
    }

    /// Write queued entries in order until the queue empties or the kernel
    /// pushes back. A short send ends the pass; later entries wait.
    fn drain(&self, fd: RawFd, token: Token, socket: &Socket) -> DrainOutcome {
        let mut pending = self.pending.lock();
        let Some(queue) = pending.get_mut(&fd) else {
            return DrainOutcome::Idle;
        };

        while let Some(front) = queue.front_mut() {
            match socket.send(front.remaining()) {
                Ok(n) => {
                    front.advance(n);
                    if !front.fully_sent() {
                        log::trace!(
                            "shard {}: short send on fd {}, {}/{} bytes",
                            self.index,
                            fd,
                            front.sent_offset(),
                            front.total_len()
                        );
                        return DrainOutcome::Partial;
                    }
                    queue.pop_front();
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(ref e) if would_block(e) => return DrainOutcome::Partial,
                Err(e) => return DrainOutcome::Failed(e),
            }
        }

        pending.remove(&fd);
        // Demote while the queue lock is held so a concurrent send cannot
        // observe write interest that is about to disappear.
        if let Err(e) = self.apply_interest(fd, token, InterestState::Read) {
            log::warn!("shard {}: could not demote fd {} to read-only: {}", self.index, fd, e);
        }
        DrainOutcome::Drained
    }

    fn run(self: Arc<Self>, mut poll: Poll) {
        let mut events = Events::with_capacity(self.events_capacity);
        let mut consecutive_errors = 0u32;
        log::debug!("shard {}: worker running", self.index);

        while self.running.load(Ordering::Acquire) {
            match self.wait(&mut poll, &mut events) {
                Ok(()) => {
                    consecutive_errors = 0;
                    if events.is_empty() {
                        continue;
                    }
                    for event in events.iter() {
                        if event.token() == WAKE_TOKEN {
                            continue;
                        }
                        self.dispatch(event);
                    }
                }
                Err(WaitFailure::Transient) => continue,
                Err(WaitFailure::Fatal(e)) => {
                    log::error!("shard {}: readiness wait failed: {}", self.index, e);
                    thread::sleep(self.backoff);
                    consecutive_errors += 1;
                    if consecutive_errors >= self.restart_threshold {
                        log::error!(
                            "shard {}: {} consecutive wait failures, restarting",
                            self.index,
                            consecutive_errors
                        );
                        self.restart();
                        return;
                    }
                }
            }
        }
        log::debug!("shard {}: worker exiting", self.index);
    }

    fn wait(&self, poll: &mut Poll, events: &mut Events) -> std::result::Result<(), WaitFailure> {
        #[cfg(test)]
        {
            let injected = self.injected_failures.load(Ordering::Acquire);
            if injected > 0 {
                self.injected_failures.store(injected - 1, Ordering::Release);
                return Err(WaitFailure::Fatal(io::Error::new(
                    io::ErrorKind::Other,
                    "injected wait failure",
                )));
            }
        }
        match poll.poll(events, None) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(WaitFailure::Transient),
            Err(e) => Err(WaitFailure::Fatal(e)),
        }
    }

    fn dispatch(&self, event: &mio::event::Event) {
        let token = event.token();
        let Some((fd, identity, socket)) = self.resolve(token) else {
            log::trace!("shard {}: stale event for token {}", self.index, token.0);
            return;
        };

        #[cfg(test)]
        {
            if event.is_readable() {
                self.readable_events.fetch_add(1, Ordering::Relaxed);
            }
            if event.is_writable() {
                self.writable_events.fetch_add(1, Ordering::Relaxed);
            }
        }

        if event.is_error() || (event.is_read_closed() && event.is_write_closed()) {
            log::warn!("shard {}: hang up or error on fd {} (identity {})", self.index, fd, identity);
            self.force_close(fd, identity, CloseCause::HangUp);
            return;
        }

        if event.is_readable() {
            log::trace!("shard {}: fd {} readable", self.index, fd);
            if self.inbound.on_readable(self.index, fd, identity, &socket) == ReadOutcome::PeerClosed {
                log::info!("shard {}: peer closed fd {} (identity {})", self.index, fd, identity);
                self.force_close(fd, identity, CloseCause::HangUp);
                return;
            }
        }

        if event.is_writable() {
            match self.drain(fd, token, &socket) {
                DrainOutcome::Drained => {
                    log::trace!("shard {}: fd {} fully flushed", self.index, fd);
                }
                DrainOutcome::Partial | DrainOutcome::Idle => {}
                DrainOutcome::Failed(e) => {
                    log::warn!("shard {}: send on fd {} (identity {}) failed: {}", self.index, fd, identity, e);
                    self.force_close(fd, identity, CloseCause::SendFailed);
                }
            }
        }
    }

    fn force_close(&self, fd: RawFd, identity: u64, cause: CloseCause) {
        if let Some(member) = self.detach(fd, identity) {
            drop(member);
            self.listener.on_close(fd, identity, cause);
        }
    }

    /// Drop every owned descriptor from the tables without touching the
    /// multiplexer.
    fn take_all(&self) -> Vec<(RawFd, Member)> {
        let members = self.members.write().drain();
        self.pending.lock().clear();
        self.interest.write().clear();
        members
    }

    /// Replace the multiplexer and the worker. Runs on the failing worker,
    /// which exits right after.
    fn restart(self: &Arc<Self>) {
        let mut worker = self.worker.lock();
        if !self.running.load(Ordering::Acquire) {
            return;
        }
        self.health.store(ShardHealth::Restarting as u8, Ordering::Release);
        log::info!("shard {} is restarting", self.index);

        self.mux.write().take();
        let orphans = self.take_all();

        let relaunched = self.reopen_mux().and_then(|(poll, mux)| {
            *self.mux.write() = Some(mux);
            match ShardCore::spawn_worker(self, poll) {
                Ok(handle) => Ok(handle),
                Err(e) => {
                    self.mux.write().take();
                    Err(e)
                }
            }
        });
        match relaunched {
            Ok(handle) => {
                // Replaces (and detaches) the handle of the calling thread.
                *worker = Some(handle);
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.health.store(ShardHealth::Running as u8, Ordering::Release);
                log::info!("shard {} restarted", self.index);
            }
            Err(e) => {
                self.health.store(ShardHealth::Failed as u8, Ordering::Release);
                log::error!(
                    "shard {} could not recreate its multiplexer and is out of service: {}",
                    self.index,
                    e
                );
            }
        }
        drop(worker);

        if !orphans.is_empty() {
            log::warn!("shard {}: restart orphaned {} descriptors", self.index, orphans.len());
        }
        for (fd, member) in orphans {
            let identity = member.identity;
            drop(member);
            self.listener.on_close(fd, identity, CloseCause::Orphaned);
        }
    }

    fn reopen_mux(&self) -> io::Result<(Poll, Arc<Mux>)> {
        #[cfg(test)]
        {
            if self.fail_mux_reopen.swap(false, Ordering::AcqRel) {
                return Err(io::Error::new(io::ErrorKind::Other, "injected multiplexer failure"));
            }
        }
        open_mux()
    }

    fn stop(&self) {
        {
            let _worker = self.worker.lock();
            if !self.running.swap(false, Ordering::AcqRel) {
                return;
            }
            if let Some(mux) = self.mux.read().as_ref() {
                if let Err(e) = mux.waker.wake() {
                    log::warn!("shard {}: failed to wake worker: {}", self.index, e);
                }
            }
        }

        loop {
            let handle = self.worker.lock().take();
            match handle {
                Some(h) if h.thread().id() != thread::current().id() => {
                    if h.join().is_err() {
                        log::error!("shard {}: worker panicked", self.index);
                    }
                }
                _ => break,
            }
        }

        let leftovers = self.take_all();
        if !leftovers.is_empty() {
            log::debug!("shard {}: closing {} descriptors on stop", self.index, leftovers.len());
        }
        drop(leftovers);
        self.mux.write().take();
        self.health.store(ShardHealth::Stopped as u8, Ordering::Release);
        log::info!("shard {} stopped", self.index);
    }
}
