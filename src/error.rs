use std::fmt;
use std::io;

/// Which of the sockets a creation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketKind {
    /// AF_INET datagram socket used only for interface ioctls
    Control,
    /// AF_PPPOX session socket
    Session,
    /// AF_PACKET raw discovery socket
    Discovery,
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketKind::Control => write!(f, "control"),
            SocketKind::Session => write!(f, "PPPoX session"),
            SocketKind::Discovery => write!(f, "discovery"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("interface {name} not found: {source}")]
    InterfaceNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid interface name {name:?}: {reason}")]
    InvalidInterfaceName { name: String, reason: &'static str },

    #[error("failed to create {kind} socket: {source}")]
    SocketCreate {
        kind: SocketKind,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind discovery socket to {name}: {source}")]
    Bind {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to connect PPPoE session {session_id}: {source}")]
    Connect {
        session_id: u16,
        #[source]
        source: io::Error,
    },

    #[error("hardware address lookup for {name} failed: {source}")]
    Lookup {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("session id {0} is reserved")]
    InvalidSessionId(u16),

    #[error("connection sockets are not initialized")]
    NotReady,

    #[error("connection sockets are already initialized")]
    AlreadyInitialized,

    #[error("interface name is already set to {name}")]
    AlreadyNamed { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
