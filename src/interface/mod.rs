//! Interface resolution
//!
//! Maps an interface name to its kernel index and hardware address through
//! a shared control socket.

mod control;

pub use control::ControlSocket;
