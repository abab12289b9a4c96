//! Kernel PPPoX ABI (`linux/if_pppox.h`, `linux/ppp-ioctl.h`)

use crate::error::SocketKind;
use crate::protocol::{InterfaceName, MacAddr};
use crate::{Error, Result};
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::time::Duration;

/// PPP over X address family
pub const AF_PPPOX: libc::c_int = 24;

/// PPPoX protocol number for PPP over Ethernet
pub const PX_PROTO_OE: libc::c_int = 0;

/// `_IOR('t', 55, int)`
const PPPIOCGCHAN: libc::c_ulong = 0x8004_7437;

#[repr(C)]
#[derive(Clone, Copy)]
struct PppoeAddr {
    /// Session id, network byte order
    sid: u16,
    remote: [u8; 6],
    dev: [libc::c_char; libc::IFNAMSIZ],
}

/// `struct sockaddr_pppox` is declared `__packed` by the kernel.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct SockaddrPppox {
    sa_family: libc::sa_family_t,
    sa_protocol: u32,
    sa_addr: PppoeAddr,
}

const _: () = assert!(mem::size_of::<SockaddrPppox>() == 30);

impl SockaddrPppox {
    pub(crate) fn new(session_id: u16, remote: MacAddr, dev: &InterfaceName) -> Self {
        Self {
            sa_family: AF_PPPOX as libc::sa_family_t,
            sa_protocol: PX_PROTO_OE as u32,
            sa_addr: PppoeAddr {
                sid: session_id.to_be(),
                remote: remote.octets(),
                dev: dev.to_c_buf(),
            },
        }
    }

    #[cfg(test)]
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                self as *const Self as *const u8,
                mem::size_of::<SockaddrPppox>(),
            )
        }
    }
}

/// Opens an `AF_PPPOX`/`PX_PROTO_OE` stream socket.
///
/// Fails with `EAFNOSUPPORT` when the `pppoe` kernel module is missing.
pub(crate) fn open_session_socket() -> Result<OwnedFd> {
    let fd = unsafe { libc::socket(AF_PPPOX, libc::SOCK_STREAM | libc::SOCK_CLOEXEC, PX_PROTO_OE) };
    if fd < 0 {
        return Err(Error::SocketCreate {
            kind: SocketKind::Session,
            source: io::Error::last_os_error(),
        });
    }

    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub(crate) fn connect(fd: BorrowedFd<'_>, addr: &SockaddrPppox) -> io::Result<()> {
    let ret = unsafe {
        libc::connect(
            fd.as_raw_fd(),
            addr as *const SockaddrPppox as *const libc::sockaddr,
            mem::size_of::<SockaddrPppox>() as libc::socklen_t,
        )
    };

    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Bounds how long a blocking `connect` may wait (`SO_SNDTIMEO`).
pub(crate) fn set_send_timeout(fd: BorrowedFd<'_>, timeout: Duration) -> io::Result<()> {
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    let ret = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_SNDTIMEO,
            &tv as *const _ as *const libc::c_void,
            mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };

    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// PPP channel index of a connected session socket (`PPPIOCGCHAN`).
pub(crate) fn channel_index(fd: BorrowedFd<'_>) -> io::Result<i32> {
    let mut channel: libc::c_int = 0;
    let ret = unsafe { libc::ioctl(fd.as_raw_fd(), PPPIOCGCHAN as _, &mut channel) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(channel)
}
