//! AF_PACKET discovery socket

use super::RxInfo;
use crate::config::SetupConfig;
use crate::error::SocketKind;
use crate::interface::ControlSocket;
use crate::protocol::{EtherType, MacAddr};
use crate::session::{ConnectionData, SetupState};
use crate::telemetry::SocketStats;
use crate::{Error, Result};
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};
use std::sync::Arc;
use tracing::debug;

/// Opens a raw socket receiving PPPoE Discovery frames, broadcast enabled.
pub(crate) fn open_discovery_socket() -> Result<OwnedFd> {
    let fd = unsafe {
        libc::socket(
            libc::AF_PACKET,
            libc::SOCK_RAW | libc::SOCK_CLOEXEC,
            EtherType::PppoeDiscovery.to_network() as i32,
        )
    };

    if fd < 0 {
        return Err(Error::SocketCreate {
            kind: SocketKind::Discovery,
            source: io::Error::last_os_error(),
        });
    }

    // Closed on drop if the option below fails
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };

    let optval: libc::c_int = 1;
    let ret = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_BROADCAST,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as u32,
        )
    };

    if ret < 0 {
        return Err(Error::SocketCreate {
            kind: SocketKind::Discovery,
            source: io::Error::last_os_error(),
        });
    }

    Ok(fd)
}

/// Binds the discovery socket to one interface.
pub(crate) fn bind_to_interface(fd: BorrowedFd<'_>, ifindex: u32) -> io::Result<()> {
    let sockaddr = libc::sockaddr_ll {
        sll_family: libc::AF_PACKET as u16,
        sll_protocol: EtherType::PppoeDiscovery.to_network(),
        sll_ifindex: ifindex as i32,
        sll_hatype: 0,
        sll_pkttype: 0,
        sll_halen: 0,
        sll_addr: [0; 8],
    };

    let ret = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            &sockaddr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_ll>() as u32,
        )
    };

    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

pub(crate) fn set_nonblocking(fd: BorrowedFd<'_>, nonblocking: bool) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };

    if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) } < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

fn recv_from(fd: RawFd, buf: &mut [u8]) -> io::Result<RxInfo> {
    let mut addr: libc::sockaddr_ll = unsafe { std::mem::zeroed() };
    let mut addr_len = std::mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

    let n = unsafe {
        libc::recvfrom(
            fd,
            buf.as_mut_ptr() as *mut _,
            buf.len(),
            0,
            &mut addr as *mut _ as *mut libc::sockaddr,
            &mut addr_len,
        )
    };

    if n < 0 {
        return Err(io::Error::last_os_error());
    }

    let source = if addr.sll_halen as usize >= 6 {
        MacAddr::from_slice(&addr.sll_addr).unwrap_or_default()
    } else {
        MacAddr::ZERO
    };

    Ok(RxInfo {
        len: n as usize,
        source,
        ifindex: addr.sll_ifindex as u32,
    })
}

fn send(fd: RawFd, buf: &[u8]) -> io::Result<usize> {
    let n = unsafe { libc::send(fd, buf.as_ptr() as *const _, buf.len(), 0) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(n as usize)
}

/// Ready discovery socket handed to an external PPPoE Discovery engine.
///
/// Owns the whole [`ConnectionData`]. The connection cannot be cleared
/// while wrapped, so the discovery descriptor stays valid for the lifetime
/// of this value; session calls are forwarded to it.
#[derive(Debug)]
pub struct DiscoverySocket {
    connection: ConnectionData,
    raw_fd: RawFd,
    stats: SocketStats,
}

impl DiscoverySocket {
    /// Sets up both sockets on `interface_name` and wraps the result.
    pub fn on_interface(control: Arc<ControlSocket>, interface_name: &str) -> Result<Self> {
        let mut connection = ConnectionData::new(control);
        connection.initialize(Some(interface_name))?;
        Self::from_connection(connection)
    }

    /// Like [`DiscoverySocket::on_interface`], taking the interface, connect
    /// timeout and blocking mode from `config`.
    pub fn from_config(control: Arc<ControlSocket>, config: &SetupConfig) -> Result<Self> {
        let name = config
            .interface
            .as_deref()
            .ok_or_else(|| Error::Config("no interface configured".to_string()))?;

        let mut connection = ConnectionData::with_config(control, config);
        connection.initialize(Some(name))?;

        let socket = Self::from_connection(connection)?;
        if config.nonblocking_discovery {
            socket.set_nonblocking(true)?;
        }
        Ok(socket)
    }

    /// Wraps an initialized connection.
    pub fn from_connection(connection: ConnectionData) -> Result<Self> {
        let raw_fd = match (connection.state(), connection.discovery_fd()) {
            (SetupState::Ready, Some(fd)) => fd.as_raw_fd(),
            _ => return Err(Error::NotReady),
        };

        Ok(Self {
            connection,
            raw_fd,
            stats: SocketStats::new(),
        })
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        let fd = unsafe { BorrowedFd::borrow_raw(self.raw_fd) };
        set_nonblocking(fd, nonblocking)?;
        debug!(interface = ?self.connection.interface_name(), nonblocking, "Discovery socket mode set");
        Ok(())
    }

    /// Sends one complete Ethernet frame.
    pub fn send(&self, frame: &[u8]) -> Result<usize> {
        Ok(self.try_send(frame)?)
    }

    /// Receives one frame into `buf`.
    pub fn recv(&self, buf: &mut [u8]) -> Result<RxInfo> {
        Ok(self.try_recv(buf)?)
    }

    pub(crate) fn try_send(&self, frame: &[u8]) -> io::Result<usize> {
        let result = send(self.raw_fd, frame);
        match &result {
            Ok(len) => self.stats.record_tx(*len),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(_) => self.stats.tx_errors.inc(),
        }
        result
    }

    pub(crate) fn try_recv(&self, buf: &mut [u8]) -> io::Result<RxInfo> {
        let result = recv_from(self.raw_fd, buf);
        match &result {
            Ok(info) => self.stats.record_rx(info.len),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(_) => self.stats.rx_errors.inc(),
        }
        result
    }

    pub fn mac_address(&self) -> MacAddr {
        self.connection.mac_address()
    }

    pub fn ifindex(&self) -> Option<u32> {
        self.connection.ifindex()
    }

    pub fn stats(&self) -> &SocketStats {
        &self.stats
    }

    pub fn connection(&self) -> &ConnectionData {
        &self.connection
    }

    /// See [`ConnectionData::connect_session`].
    pub fn connect_session(&self, session_id: u16) -> Result<()> {
        self.connection.connect_session(session_id)
    }

    /// See [`ConnectionData::connect_session_to`].
    pub fn connect_session_to(&self, session_id: u16, remote: MacAddr) -> Result<()> {
        self.connection.connect_session_to(session_id, remote)
    }

    /// See [`ConnectionData::ppp_channel`].
    pub fn ppp_channel(&self) -> Result<i32> {
        self.connection.ppp_channel()
    }

    /// Gives the connection back, e.g. to `clear` it.
    pub fn into_connection(self) -> ConnectionData {
        self.connection
    }
}

impl AsRawFd for DiscoverySocket {
    fn as_raw_fd(&self) -> RawFd {
        self.raw_fd
    }
}
