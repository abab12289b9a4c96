//! pppoe-socket - PPPoE socket preparation for Linux
//!
//! Opens and configures the kernel sockets a PPPoE client needs: a raw
//! Discovery socket bound to one interface and a PPPoX session socket that
//! is connected once the Discovery exchange produced a session id.
//! Framing of Discovery packets and the PPP link layer are left to the
//! caller.
//!
//! ```no_run
//! use pppoe_socket::{ConnectionData, ControlSocket};
//!
//! let control = ControlSocket::shared();
//! let mut connection = ConnectionData::new(control.clone());
//! connection.initialize(Some("eth0"))?;
//! // ... PADI/PADO/PADR/PADS over connection.discovery_fd() ...
//! connection.connect_session(0x1234)?;
//! control.close();
//! # Ok::<(), pppoe_socket::Error>(())
//! ```

#[cfg(not(target_os = "linux"))]
compile_error!("pppoe-socket relies on AF_PACKET and AF_PPPOX and only supports Linux");

pub mod capture;
pub mod config;
pub mod error;
pub mod interface;
pub mod protocol;
pub mod session;
pub mod telemetry;

pub use capture::{AsyncDiscoverySocket, DiscoverySocket, RxInfo};
pub use error::{Error, Result, SocketKind};
pub use interface::ControlSocket;
pub use protocol::{InterfaceName, MacAddr};
pub use session::{ConnectionData, SetupState};
