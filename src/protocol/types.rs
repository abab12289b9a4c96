//! Value types shared by the setup code

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    pub const ZERO: MacAddr = MacAddr([0, 0, 0, 0, 0, 0]);

    /// Builds an address from the leading bytes of a kernel `sa_data` /
    /// `sll_addr` buffer. Returns `None` if fewer than 6 bytes are given.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.get(..6)?.try_into().ok()?;
        Some(MacAddr(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        MacAddr(octets)
    }
}

/// Error type for MAC address parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacAddrError(&'static str);

impl fmt::Display for ParseMacAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for ParseMacAddrError {}

impl FromStr for MacAddr {
    type Err = ParseMacAddrError;

    /// Parses `00:11:22:33:44:55` or `00-11-22-33-44-55`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let sep = if s.contains(':') { ':' } else { '-' };
        let parts: Vec<&str> = s.split(sep).collect();
        if parts.len() != 6 {
            return Err(ParseMacAddrError("invalid MAC address length"));
        }

        let mut result = [0u8; 6];
        for (octet, part) in result.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(ParseMacAddrError("invalid MAC address format"));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| ParseMacAddrError("invalid hex digit in MAC address"))?;
        }

        Ok(MacAddr(result))
    }
}

/// EtherType values used by PPPoE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EtherType {
    PppoeDiscovery = 0x8863,
    PppoeSession = 0x8864,
}

impl EtherType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x8863 => Some(EtherType::PppoeDiscovery),
            0x8864 => Some(EtherType::PppoeSession),
            _ => None,
        }
    }

    /// Protocol value in network byte order, as `socket(2)` and
    /// `sockaddr_ll` expect it.
    pub fn to_network(self) -> u16 {
        (self as u16).to_be()
    }
}

/// Network interface name accepted by the kernel.
///
/// Holds 1 to [`InterfaceName::MAX_LEN`] bytes without NUL, `/` or
/// whitespace, so it always fits an `ifr_name` buffer with its terminator.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InterfaceName(String);

impl InterfaceName {
    /// `IFNAMSIZ` minus the terminating NUL
    pub const MAX_LEN: usize = libc::IFNAMSIZ - 1;

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.len() > Self::MAX_LEN {
            Some("name exceeds IFNAMSIZ")
        } else if name.bytes().any(|b| b == 0 || b == b'/' || b.is_ascii_whitespace()) {
            Some("name contains NUL, '/' or whitespace")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidInterfaceName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL padded copy suitable for `ifr_name` or `sockaddr_pppox.dev`.
    pub(crate) fn to_c_buf(&self) -> [libc::c_char; libc::IFNAMSIZ] {
        let mut buf = [0 as libc::c_char; libc::IFNAMSIZ];
        for (dst, src) in buf.iter_mut().zip(self.0.bytes()) {
            *dst = src as libc::c_char;
        }
        buf
    }
}

impl fmt::Debug for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InterfaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for InterfaceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for InterfaceName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
