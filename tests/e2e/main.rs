//! E2E tests against the host kernel
//!
//! Loopback tests run unprivileged. The rest create veth pairs and open
//! AF_PACKET/AF_PPPOX sockets, so they need root and the pppoe module:
//!
//! sudo modprobe pppoe && sudo -E cargo test --test e2e -- --ignored

mod discovery;
mod veth;

use pppoe_socket::{ConnectionData, ControlSocket, Error, InterfaceName, MacAddr, SetupState};

/// Index and hardware address resolution is stable for an existing name
#[test]
fn test_loopback_resolution_is_stable() {
    let control = ControlSocket::shared();
    let lo = InterfaceName::new("lo").unwrap();

    let first = control.resolve_interface_index(&lo).unwrap();
    let second = control.resolve_interface_index(&lo).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), veth::sysfs("lo", "ifindex"));

    assert_eq!(control.resolve_hardware_address(&lo).unwrap(), MacAddr::ZERO);
    control.close();
}

/// Unknown names fail without touching any connection
#[test]
fn test_unknown_interface_mutates_nothing() {
    let control = ControlSocket::shared();
    let name = InterfaceName::new("doesnotexist0").unwrap();
    let mut connection = ConnectionData::new(control.clone());

    assert!(matches!(
        control.resolve_interface_index(&name),
        Err(Error::InterfaceNotFound { .. })
    ));
    assert!(matches!(
        control.resolve_hardware_address(&name),
        Err(Error::InterfaceNotFound { .. })
    ));
    assert!(matches!(
        connection.set_interface_name("doesnotexist0"),
        Err(Error::Lookup { .. })
    ));
    assert_eq!(connection.state(), SetupState::Uninitialized);
    assert!(connection.interface_name().is_none());
}

/// Naming a real interface derives the MAC the kernel reports
#[test]
#[ignore] // Requires CAP_NET_ADMIN to create a veth pair
fn test_set_interface_name_derives_mac() {
    let pair = veth::VethPair::create().expect("Failed to create veth pair");
    let mut connection = ConnectionData::new(ControlSocket::shared());

    connection.set_interface_name(&pair.left).unwrap();

    let expected: MacAddr = veth::sysfs(&pair.left, "address").parse().unwrap();
    assert_eq!(connection.mac_address(), expected);
    assert_eq!(connection.state(), SetupState::Named);
}

/// initialize then clear is equivalent to a fresh instance
#[test]
#[ignore] // Requires root and the pppoe kernel module
fn test_initialize_then_clear() {
    let pair = veth::VethPair::create().expect("Failed to create veth pair");
    let control = ControlSocket::shared();
    let mut connection = ConnectionData::new(control.clone());

    connection.initialize(Some(&pair.left)).unwrap();
    assert_eq!(connection.state(), SetupState::Ready);
    assert!(connection.discovery_fd().is_some());
    assert!(connection.session_fd().is_some());
    assert_eq!(
        connection.ifindex().map(|i| i.to_string()),
        Some(veth::sysfs(&pair.left, "ifindex"))
    );

    assert!(matches!(
        connection.initialize(None),
        Err(Error::AlreadyInitialized)
    ));

    connection.clear();
    let fresh = ConnectionData::new(control);
    assert_eq!(connection.state(), fresh.state());
    assert_eq!(connection.interface_name(), fresh.interface_name());
    assert_eq!(connection.mac_address(), fresh.mac_address());
    assert_eq!(connection.ifindex(), fresh.ifindex());
    assert!(connection.discovery_fd().is_none());
    assert!(connection.session_fd().is_none());

    connection.clear();
    assert_eq!(connection.state(), SetupState::Uninitialized);
}

/// A failed connect leaves the sockets open for a retry
#[test]
#[ignore] // Requires root and the pppoe kernel module
fn test_connect_failure_keeps_sockets() {
    let pair = veth::VethPair::create().expect("Failed to create veth pair");
    let mut connection = ConnectionData::new(ControlSocket::shared());
    connection.initialize(Some(&pair.left)).unwrap();

    let peer: MacAddr = veth::sysfs(&pair.right, "address").parse().unwrap();
    connection.connect_session_to(0x1234, peer).unwrap();
    assert!(connection.ppp_channel().unwrap() >= 0);

    // The kernel refuses to move a connected socket to another session
    let err = connection.connect_session_to(0x1235, peer).unwrap_err();
    assert!(matches!(err, Error::Connect { session_id: 0x1235, .. }));
    assert_eq!(connection.state(), SetupState::Ready);
    assert!(connection.session_fd().is_some());
    assert!(connection.ppp_channel().is_ok());
}

/// Full scenario against a live access concentrator
///
/// PPPOE_TEST_INTERFACE, PPPOE_TEST_SESSION_ID and PPPOE_TEST_AC_MAC
/// describe a session negotiated out of band.
#[test]
#[ignore] // Requires root and a PPPoE server
fn test_connect_live_session() {
    let interface = std::env::var("PPPOE_TEST_INTERFACE").expect("PPPOE_TEST_INTERFACE");
    let session_id: u16 = std::env::var("PPPOE_TEST_SESSION_ID")
        .expect("PPPOE_TEST_SESSION_ID")
        .parse()
        .expect("session id must be a u16");
    let ac: MacAddr = std::env::var("PPPOE_TEST_AC_MAC")
        .expect("PPPOE_TEST_AC_MAC")
        .parse()
        .expect("invalid AC MAC");

    let mut connection = ConnectionData::new(ControlSocket::shared());
    connection.initialize(Some(&interface)).unwrap();
    connection.connect_session_to(session_id, ac).unwrap();
    assert_eq!(connection.state(), SetupState::Ready);
}
