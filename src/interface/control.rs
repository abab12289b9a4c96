//! Control socket for interface ioctls

use crate::error::SocketKind;
use crate::protocol::{InterfaceName, MacAddr};
use crate::{Error, Result};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// AF_INET datagram socket used only as a conduit for `SIOCGIF*` queries.
///
/// Opened lazily on first use and shared between setups through an `Arc`.
/// The lock is held across each ioctl, so [`ControlSocket::close`] never
/// races an in-flight query.
#[derive(Debug, Default)]
pub struct ControlSocket {
    fd: Mutex<Option<OwnedFd>>,
}

impl ControlSocket {
    /// Creates an accessor with no socket opened yet.
    pub const fn new() -> Self {
        Self {
            fd: Mutex::new(None),
        }
    }

    /// Convenience for the common case of sharing one accessor.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, Option<OwnedFd>> {
        // The slot is a plain Option, a panic elsewhere cannot corrupt it
        self.fd.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_locked(slot: &mut Option<OwnedFd>) -> Result<RawFd> {
        if let Some(fd) = slot {
            return Ok(fd.as_raw_fd());
        }

        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if fd < 0 {
            return Err(Error::SocketCreate {
                kind: SocketKind::Control,
                source: io::Error::last_os_error(),
            });
        }

        debug!(fd, "Opened control socket");
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        let raw = fd.as_raw_fd();
        *slot = Some(fd);
        Ok(raw)
    }

    /// Opens the socket if needed and returns its descriptor.
    ///
    /// The descriptor stays valid until [`ControlSocket::close`] is called.
    pub fn ensure_open(&self) -> Result<RawFd> {
        Self::open_locked(&mut self.lock())
    }

    /// Closes the socket. Does nothing if it is not open.
    pub fn close(&self) {
        if let Some(fd) = self.lock().take() {
            debug!(fd = fd.as_raw_fd(), "Closing control socket");
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs one `ifreq` ioctl for `name` while holding the lock.
    fn query<F>(&self, name: &InterfaceName, ioctl: F) -> Result<libc::ifreq>
    where
        F: FnOnce(RawFd, &mut libc::ifreq) -> libc::c_int,
    {
        let mut slot = self.lock();
        let fd = Self::open_locked(&mut slot)?;

        let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
        ifr.ifr_name = name.to_c_buf();

        if ioctl(fd, &mut ifr) < 0 {
            return Err(Error::InterfaceNotFound {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        Ok(ifr)
    }

    /// Kernel index of the interface (`SIOCGIFINDEX`).
    pub fn resolve_interface_index(&self, name: &InterfaceName) -> Result<u32> {
        let ifr = self.query(name, |fd, ifr| unsafe {
            libc::ioctl(fd, libc::SIOCGIFINDEX, ifr as *mut libc::ifreq)
        })?;

        let ifindex = unsafe { ifr.ifr_ifru.ifru_ifindex };
        debug!(interface = %name, ifindex, "Resolved interface index");
        Ok(ifindex as u32)
    }

    /// Hardware address of the interface (`SIOCGIFHWADDR`).
    pub fn resolve_hardware_address(&self, name: &InterfaceName) -> Result<MacAddr> {
        let ifr = self.query(name, |fd, ifr| unsafe {
            libc::ioctl(fd, libc::SIOCGIFHWADDR, ifr as *mut libc::ifreq)
        })?;

        let sa_data = unsafe { ifr.ifr_ifru.ifru_hwaddr.sa_data };
        let bytes: Vec<u8> = sa_data.iter().map(|&b| b as u8).collect();
        let mac = MacAddr::from_slice(&bytes).unwrap_or_default();
        debug!(interface = %name, %mac, "Resolved hardware address");
        Ok(mac)
    }
}
