/*!
 * Standalone Outbound Sender
 *
 * A single tuned client connection for code that wants to push bytes to a
 * peer without going through the sharded engine. It applies the same socket
 * tuning as engine sockets but connects and sends in blocking mode, bounded
 * by the connect timeout and the configured send timeout.
 */

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::net::{parse_peer, tune_socket};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::time::Duration;

/// Open/send/close contract for a single outbound connection.
pub trait TcpSender: Send {
    /// Connect to `ip:port`. Opening an already open sender is a no-op.
    fn open(&mut self, ip: &str, port: u16) -> Result<()>;
    /// Write all of `data`, or fail.
    fn send(&mut self, data: &[u8]) -> Result<()>;
    /// Close the connection. Closing a closed sender is a no-op.
    fn close(&mut self) -> Result<()>;
    fn is_open(&self) -> bool;
}

pub struct TunedSender {
    cfg: EngineConfig,
    connect_timeout: Duration,
    socket: Option<Socket>,
    peer: Option<SocketAddr>,
}

impl TunedSender {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            connect_timeout: Duration::from_secs(3),
            socket: None,
            peer: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl TcpSender for TunedSender {
    fn open(&mut self, ip: &str, port: u16) -> Result<()> {
        if self.socket.is_some() {
            log::warn!("sender already open to {:?}", self.peer);
            return Ok(());
        }
        let peer = parse_peer(ip, port)?;
        let socket = Socket::new(Domain::for_address(peer), Type::STREAM, Some(Protocol::TCP))
            .map_err(EngineError::SocketCreateFailed)?;
        tune_socket(&socket, &self.cfg)?;
        socket
            .connect_timeout(&peer.into(), self.connect_timeout)
            .map_err(|source| {
                log::error!("connection to {} failed: {}", peer, source);
                EngineError::ConnectFailed {
                    peer: peer.to_string(),
                    source,
                }
            })?;

        log::info!("sender connected to {}", peer);
        self.socket = Some(socket);
        self.peer = Some(peer);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        let Some(socket) = self.socket.as_ref() else {
            log::error!("send on a closed sender");
            return Err(EngineError::SenderClosed);
        };
        let mut written = 0;
        while written < data.len() {
            match socket.send(&data[written..]) {
                Ok(0) => {
                    return Err(EngineError::Io(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "peer stopped accepting bytes",
                    )));
                }
                Ok(n) => written += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("failed to send to {:?}: {}", self.peer, e);
                    return Err(EngineError::Io(e));
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.socket.take() {
            Some(socket) => {
                let _ = socket.shutdown(Shutdown::Both);
                log::info!("sender to {:?} closed", self.peer.take());
            }
            None => log::debug!("sender already closed"),
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }
}

impl Drop for TunedSender {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
