//! Addressing types
//!
//! Hardware addresses, interface names and the PPPoE EtherTypes. Frame
//! encoding is not part of this crate.

pub mod types;

pub use types::*;
