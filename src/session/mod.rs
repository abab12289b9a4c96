//! PPPoE connection setup and the kernel PPPoX socket ABI

mod connection;
pub mod pppox;

pub use connection::{ConnectionData, SetupState};
