//! PPPoE connection setup
//!
//! Prepares the two kernel sockets a PPPoE client needs:
//! the raw Discovery socket bound to one interface, and the PPPoX session
//! socket that is connected once a session id has been negotiated.

use super::pppox::{self, SockaddrPppox};
use crate::capture::{self, DiscoverySocket};
use crate::config::SetupConfig;
use crate::interface::ControlSocket;
use crate::protocol::{InterfaceName, MacAddr};
use crate::{Error, Result};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Setup progress, derived from which fields are populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    /// No name, no sockets
    Uninitialized,
    /// Interface name and hardware address known, no sockets
    Named,
    /// Both sockets open, discovery socket bound
    Ready,
}

/// One candidate PPPoE endpoint binding.
///
/// Sockets are `None` until opened and are closed exactly once, either by
/// [`ConnectionData::clear`] or on drop.
#[derive(Debug)]
pub struct ConnectionData {
    control: Arc<ControlSocket>,
    pppoe_socket: Option<OwnedFd>,
    raw_socket: Option<OwnedFd>,
    interface_name: Option<InterfaceName>,
    mac_address: MacAddr,
    ifindex: Option<u32>,
    connect_timeout: Option<Duration>,
}

impl ConnectionData {
    pub fn new(control: Arc<ControlSocket>) -> Self {
        Self {
            control,
            pppoe_socket: None,
            raw_socket: None,
            interface_name: None,
            mac_address: MacAddr::ZERO,
            ifindex: None,
            connect_timeout: None,
        }
    }

    /// Creates an entity whose session connect honours
    /// `config.connect_timeout_ms`. The interface is not named here.
    pub fn with_config(control: Arc<ControlSocket>, config: &SetupConfig) -> Self {
        let mut connection = Self::new(control);
        connection.connect_timeout = config.connect_timeout();
        connection
    }

    pub fn set_connect_timeout(&mut self, timeout: Option<Duration>) {
        self.connect_timeout = timeout;
    }

    pub fn state(&self) -> SetupState {
        match (&self.pppoe_socket, &self.raw_socket, &self.interface_name) {
            (Some(_), Some(_), _) => SetupState::Ready,
            (_, _, Some(_)) => SetupState::Named,
            _ => SetupState::Uninitialized,
        }
    }

    /// Names the interface and derives its hardware address.
    ///
    /// Nothing changes if the lookup fails. The name can only be changed
    /// again after [`ConnectionData::clear`].
    pub fn set_interface_name(&mut self, name: &str) -> Result<()> {
        if let Some(current) = &self.interface_name {
            return Err(Error::AlreadyNamed {
                name: current.to_string(),
            });
        }

        let name = InterfaceName::new(name)?;
        let mac = self
            .control
            .resolve_hardware_address(&name)
            .map_err(|e| match e {
                Error::InterfaceNotFound { name, source } => Error::Lookup { name, source },
                other => other,
            })?;

        debug!(interface = %name, %mac, "Interface named");
        self.interface_name = Some(name);
        self.mac_address = mac;
        Ok(())
    }

    /// Opens and binds both sockets.
    ///
    /// `interface_name` is applied only if no name has been set yet. On
    /// failure every resource acquired so far is released and the entity is
    /// back to [`SetupState::Uninitialized`].
    pub fn initialize(&mut self, interface_name: Option<&str>) -> Result<()> {
        if self.state() == SetupState::Ready {
            return Err(Error::AlreadyInitialized);
        }

        match self.open_sockets(interface_name) {
            Ok((pppoe_socket, raw_socket, ifindex)) => {
                self.pppoe_socket = Some(pppoe_socket);
                self.raw_socket = Some(raw_socket);
                self.ifindex = Some(ifindex);
                info!(
                    interface = ?self.interface_name,
                    ifindex,
                    mac = %self.mac_address,
                    "PPPoE sockets ready"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "PPPoE socket setup failed, releasing resources");
                self.clear();
                Err(e)
            }
        }
    }

    /// Steps of `initialize`; sockets acquired here are owned locals until
    /// every step succeeded, so an early return closes them.
    fn open_sockets(&mut self, interface_name: Option<&str>) -> Result<(OwnedFd, OwnedFd, u32)> {
        let pppoe_socket = pppox::open_session_socket()?;
        debug!(fd = pppoe_socket.as_raw_fd(), "Opened PPPoX session socket");

        if let Some(name) = interface_name {
            if self.interface_name.is_none() {
                self.set_interface_name(name)?;
            } else if let Some(current) = self
                .interface_name
                .as_ref()
                .filter(|current| current.as_str() != name)
            {
                warn!(current = %current, requested = name, "Interface already named, keeping current");
            }
        }

        let raw_socket = capture::open_discovery_socket()?;
        debug!(fd = raw_socket.as_raw_fd(), "Opened discovery socket");

        let ifindex = self.bind_discovery(raw_socket.as_fd())?;

        Ok((pppoe_socket, raw_socket, ifindex))
    }

    fn bind_discovery(&self, fd: BorrowedFd<'_>) -> Result<u32> {
        let Some(name) = &self.interface_name else {
            return Err(Error::Bind {
                name: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "no interface name set"),
            });
        };

        let ifindex = self
            .control
            .resolve_interface_index(name)
            .map_err(|e| match e {
                Error::InterfaceNotFound { name, source } => Error::Bind { name, source },
                other => other,
            })?;

        capture::bind_to_interface(fd, ifindex).map_err(|source| Error::Bind {
            name: name.to_string(),
            source,
        })?;

        debug!(interface = %name, ifindex, "Bound discovery socket");
        Ok(ifindex)
    }

    /// Connects the session socket to `session_id`, with the interface's own
    /// resolved hardware address as the remote.
    ///
    /// The state is unchanged on failure, so the call can be retried.
    pub fn connect_session(&self, session_id: u16) -> Result<()> {
        self.connect_session_to(session_id, self.mac_address)
    }

    /// Connects the session socket to `session_id` at the access
    /// concentrator `remote`, as learned from its PADS.
    pub fn connect_session_to(&self, session_id: u16, remote: MacAddr) -> Result<()> {
        if session_id == 0 {
            return Err(Error::InvalidSessionId(session_id));
        }

        let (Some(fd), Some(name)) = (self.session_fd(), &self.interface_name) else {
            return Err(Error::NotReady);
        };
        if self.raw_socket.is_none() {
            return Err(Error::NotReady);
        }

        if let Some(timeout) = self.connect_timeout {
            pppox::set_send_timeout(fd, timeout).map_err(|source| Error::Connect {
                session_id,
                source,
            })?;
        }

        let addr = SockaddrPppox::new(session_id, remote, name);
        pppox::connect(fd, &addr).map_err(|source| Error::Connect { session_id, source })?;

        info!(interface = %name, session_id, %remote, "PPPoE session connected");
        Ok(())
    }

    /// PPP channel index of the connected session socket, used to attach
    /// the session to a ppp unit.
    pub fn ppp_channel(&self) -> Result<i32> {
        let fd = self.session_fd().ok_or(Error::NotReady)?;
        Ok(pppox::channel_index(fd)?)
    }

    /// Closes both sockets and forgets the interface. Never fails.
    pub fn clear(&mut self) {
        if self.pppoe_socket.take().is_some() {
            debug!("Closed PPPoX session socket");
        }
        if self.raw_socket.take().is_some() {
            debug!("Closed discovery socket");
        }
        self.interface_name = None;
        self.mac_address = MacAddr::ZERO;
        self.ifindex = None;
    }

    /// Hands the ready connection to a [`DiscoverySocket`].
    pub fn into_discovery_socket(self) -> Result<DiscoverySocket> {
        DiscoverySocket::from_connection(self)
    }

    pub fn interface_name(&self) -> Option<&InterfaceName> {
        self.interface_name.as_ref()
    }

    pub fn mac_address(&self) -> MacAddr {
        self.mac_address
    }

    pub fn ifindex(&self) -> Option<u32> {
        self.ifindex
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn discovery_fd(&self) -> Option<BorrowedFd<'_>> {
        self.raw_socket.as_ref().map(|fd| fd.as_fd())
    }

    pub fn session_fd(&self) -> Option<BorrowedFd<'_>> {
        self.pppoe_socket.as_ref().map(|fd| fd.as_fd())
    }

    pub fn control(&self) -> &Arc<ControlSocket> {
        &self.control
    }
}
