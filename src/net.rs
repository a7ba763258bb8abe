/*!
 * Socket Construction and Tuning
 *
 * Builds the per-identity sockets handed to the shards. Every socket is
 * created non-blocking, tuned, bound to an ephemeral port and then either
 * put into listening mode or pointed at its peer with a non-blocking
 * connect. Tuning aborts on the first option the kernel refuses.
 */

use crate::config::{EngineConfig, SocketRole};
use crate::error::{EngineError, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::os::fd::AsRawFd;

/// Linux `IP_BIND_ADDRESS_NO_PORT` (include/uapi/linux/in.h)
#[cfg(target_os = "linux")]
const IP_BIND_ADDRESS_NO_PORT: libc::c_int = 24;

/// State of a freshly built socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Listening,
    Connected,
    /// Non-blocking connect still in flight; the owning shard observes the
    /// outcome through write readiness or hang-up.
    ConnectPending,
}

/// A tuned socket ready to be handed to a shard.
#[derive(Debug)]
pub struct BuiltSocket {
    pub socket: Socket,
    pub local_port: u16,
    pub state: SocketState,
}

/// Parse a literal peer address. Hostnames are rejected so that connection
/// setup never blocks on name resolution.
pub fn parse_peer(peer_address: &str, peer_port: u16) -> Result<SocketAddr> {
    peer_address
        .trim()
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, peer_port))
        .map_err(|_| EngineError::InvalidPeerAddress(peer_address.to_string()))
}

/// Apply the connection tuning policy.
///
/// Order: no-delay, 1 MiB (configurable) send buffer, send timeout, address
/// reuse, bind-without-port. The first failure is returned and nothing after
/// it is attempted.
pub fn tune_socket(socket: &Socket, cfg: &EngineConfig) -> Result<()> {
    socket.set_nodelay(true).map_err(tuning("TCP_NODELAY"))?;
    socket
        .set_send_buffer_size(cfg.send_buffer)
        .map_err(tuning("SO_SNDBUF"))?;
    socket
        .set_write_timeout(Some(cfg.send_timeout))
        .map_err(tuning("SO_SNDTIMEO"))?;
    socket.set_reuse_address(true).map_err(tuning("SO_REUSEADDR"))?;
    set_bind_address_no_port(socket).map_err(tuning("IP_BIND_ADDRESS_NO_PORT"))?;
    Ok(())
}

fn tuning(option: &'static str) -> impl FnOnce(io::Error) -> EngineError {
    move |source| EngineError::TuningFailed { option, source }
}

#[cfg(target_os = "linux")]
fn set_bind_address_no_port(socket: &Socket) -> io::Result<()> {
    // IPv6 sockets reserve their port at bind time regardless.
    if socket.domain()? != Domain::IPV4 {
        return Ok(());
    }
    let on: libc::c_int = 1;
    // SAFETY: valid descriptor, pointer/len describe a live c_int.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::IPPROTO_IP,
            IP_BIND_ADDRESS_NO_PORT,
            &on as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_bind_address_no_port(_socket: &Socket) -> io::Result<()> {
    Ok(())
}

/// Create, tune and bind a socket, then listen or connect per `role`.
///
/// With [`SocketRole::Connect`] a `peer` is required; an in-progress connect
/// is returned as [`SocketState::ConnectPending`], not as an error.
///
/// # Arguments
/// * `cfg` - Tuning values and listen backlog
/// * `role` - Listen on the assigned port or dial the peer
/// * `peer` - Destination for [`SocketRole::Connect`]
pub fn build_socket(
    cfg: &EngineConfig,
    role: SocketRole,
    peer: Option<SocketAddr>,
) -> Result<BuiltSocket> {
    let (domain, bind_ip) = match (role, peer) {
        (SocketRole::Connect, Some(SocketAddr::V6(_))) => {
            (Domain::IPV6, IpAddr::V6(Ipv6Addr::UNSPECIFIED))
        }
        (SocketRole::Connect, None) => {
            return Err(EngineError::InvalidPeerAddress("<none>".into()));
        }
        _ => (Domain::IPV4, IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .map_err(EngineError::SocketCreateFailed)?;
    socket
        .set_nonblocking(true)
        .map_err(EngineError::SocketCreateFailed)?;
    tune_socket(&socket, cfg)?;

    let bind_addr: SockAddr = SocketAddr::new(bind_ip, 0).into();
    socket.bind(&bind_addr).map_err(EngineError::BindFailed)?;
    // Zero while the no-port option defers the reservation to listen/connect.
    let mut local_port = local_port_of(&socket).map_err(EngineError::BindFailed)?;

    let state = match (role, peer) {
        (SocketRole::Connect, Some(peer)) => match socket.connect(&peer.into()) {
            Ok(()) => SocketState::Connected,
            Err(e) if connect_in_progress(&e) => SocketState::ConnectPending,
            Err(source) => {
                return Err(EngineError::ConnectFailed { peer: peer.to_string(), source });
            }
        },
        _ => {
            socket.listen(cfg.backlog).map_err(EngineError::ListenFailed)?;
            SocketState::Listening
        }
    };

    if local_port == 0 {
        local_port = local_port_of(&socket).map_err(EngineError::BindFailed)?;
    }
    log::debug!(
        "built socket fd {} on local port {} ({:?})",
        socket.as_raw_fd(),
        local_port,
        state
    );

    Ok(BuiltSocket { socket, local_port, state })
}

fn local_port_of(socket: &Socket) -> io::Result<u16> {
    Ok(socket
        .local_addr()?
        .as_socket()
        .map(|addr| addr.port())
        .unwrap_or(0))
}

#[inline]
fn connect_in_progress(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EINPROGRESS) || e.kind() == io::ErrorKind::WouldBlock
}

/// Check if an I/O error indicates the operation would block
#[inline]
pub(crate) fn would_block(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
}
