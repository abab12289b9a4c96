//! Discovery socket I/O
//!
//! The raw AF_PACKET socket prepared by [`crate::session::ConnectionData`]
//! is exposed here for an external PPPoE Discovery engine:
//! - [`DiscoverySocket`]: blocking (or manually nonblocking) send/recv
//! - [`AsyncDiscoverySocket`]: tokio readiness driven send/recv

mod af_packet;
mod async_socket;

pub use af_packet::DiscoverySocket;
pub use async_socket::AsyncDiscoverySocket;

pub(crate) use af_packet::{bind_to_interface, open_discovery_socket};

use crate::Result;
use crate::protocol::MacAddr;
use std::future::Future;

/// Information about a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxInfo {
    /// Number of bytes received
    pub len: usize,
    /// Link-layer source as reported by the kernel
    pub source: MacAddr,
    /// Interface the frame arrived on
    pub ifindex: u32,
}

/// Async frame I/O on a discovery socket
pub trait Capture: Send + Sync {
    /// Receive a frame into the provided buffer
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<RxInfo>> + Send;

    /// Send a frame
    fn send(&mut self, buf: &[u8]) -> impl Future<Output = Result<usize>> + Send;
}
