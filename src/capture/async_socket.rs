//! Tokio wrapper around the discovery socket

use super::{Capture, DiscoverySocket, RxInfo};
use crate::{Error, Result};
use std::os::fd::{AsRawFd, RawFd};
use tokio::io::unix::AsyncFd;

/// Discovery socket registered with the tokio reactor.
///
/// Must be created inside a tokio runtime.
pub struct AsyncDiscoverySocket {
    async_fd: AsyncFd<DiscoverySocket>,
}

impl AsyncDiscoverySocket {
    /// Switches `socket` to nonblocking mode and registers it.
    pub fn new(socket: DiscoverySocket) -> Result<Self> {
        socket.set_nonblocking(true)?;
        let async_fd = AsyncFd::new(socket).map_err(Error::Io)?;
        Ok(Self { async_fd })
    }

    /// Receive a frame (async)
    pub async fn recv(&self, buf: &mut [u8]) -> Result<RxInfo> {
        loop {
            let mut guard = self.async_fd.readable().await.map_err(Error::Io)?;

            match guard.try_io(|inner| inner.get_ref().try_recv(buf)) {
                Ok(Ok(info)) => return Ok(info),
                Ok(Err(e)) => return Err(Error::Io(e)),
                Err(_would_block) => continue,
            }
        }
    }

    /// Send a frame (async)
    pub async fn send(&self, buf: &[u8]) -> Result<usize> {
        loop {
            let mut guard = self.async_fd.writable().await.map_err(Error::Io)?;

            match guard.try_io(|inner| inner.get_ref().try_send(buf)) {
                Ok(Ok(len)) => return Ok(len),
                Ok(Err(e)) => return Err(Error::Io(e)),
                Err(_would_block) => continue,
            }
        }
    }

    pub fn get_ref(&self) -> &DiscoverySocket {
        self.async_fd.get_ref()
    }

    /// Deregisters the socket and hands it back in blocking mode.
    pub fn into_inner(self) -> Result<DiscoverySocket> {
        let socket = self.async_fd.into_inner();
        socket.set_nonblocking(false)?;
        Ok(socket)
    }
}

impl std::fmt::Debug for AsyncDiscoverySocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncDiscoverySocket")
            .field("socket", self.async_fd.get_ref())
            .finish()
    }
}

impl AsRawFd for AsyncDiscoverySocket {
    fn as_raw_fd(&self) -> RawFd {
        self.async_fd.as_raw_fd()
    }
}

impl Capture for AsyncDiscoverySocket {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<RxInfo> {
        AsyncDiscoverySocket::recv(self, buf).await
    }

    async fn send(&mut self, buf: &[u8]) -> Result<usize> {
        AsyncDiscoverySocket::send(self, buf).await
    }
}
