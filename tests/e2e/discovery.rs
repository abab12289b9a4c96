//! Discovery socket traffic over a veth pair
//!
//! Both ends get a DiscoverySocket; frames sent on one end must arrive on
//! the other with the sender's MAC as source.

use super::veth::VethPair;
use pppoe_socket::config::SetupConfig;
use pppoe_socket::{AsyncDiscoverySocket, ControlSocket, DiscoverySocket, MacAddr};
use std::time::Duration;

/// Broadcast frame with the Discovery EtherType and a bare PADI header
fn padi_frame(src: MacAddr) -> Vec<u8> {
    let mut frame = Vec::with_capacity(60);
    frame.extend_from_slice(&MacAddr::BROADCAST.octets());
    frame.extend_from_slice(&src.octets());
    frame.extend_from_slice(&[0x88, 0x63]);
    // ver/type, code PADI, session 0, length 0
    frame.extend_from_slice(&[0x11, 0x09, 0x00, 0x00, 0x00, 0x00]);
    frame.resize(60, 0);
    frame
}

fn socket_pair(pair: &VethPair) -> (DiscoverySocket, DiscoverySocket) {
    let control = ControlSocket::shared();
    let left = DiscoverySocket::on_interface(control.clone(), &pair.left).unwrap();
    let right = DiscoverySocket::on_interface(control, &pair.right).unwrap();
    (left, right)
}

#[test]
#[ignore] // Requires root and the pppoe kernel module
fn test_blocking_send_recv() {
    let pair = VethPair::create().expect("Failed to create veth pair");
    let (left, right) = socket_pair(&pair);

    let frame = padi_frame(left.mac_address());
    assert_eq!(left.send(&frame).unwrap(), frame.len());

    let mut buf = [0u8; 1514];
    let info = right.recv(&mut buf).unwrap();
    assert_eq!(&buf[..info.len], &frame[..]);
    assert_eq!(info.source, left.mac_address());
    assert_eq!(Some(info.ifindex), right.ifindex());

    assert_eq!(left.stats().tx_packets.get(), 1);
    assert_eq!(right.stats().rx_bytes.get(), frame.len() as u64);
}

#[test]
#[ignore] // Requires root and the pppoe kernel module
fn test_nonblocking_recv_would_block() {
    let pair = VethPair::create().expect("Failed to create veth pair");
    let config = SetupConfig {
        interface: Some(pair.left.clone()),
        nonblocking_discovery: true,
        ..Default::default()
    };
    let socket = DiscoverySocket::from_config(ControlSocket::shared(), &config).unwrap();

    let mut buf = [0u8; 1514];
    let err = socket.recv(&mut buf).unwrap_err();
    assert!(matches!(err, pppoe_socket::Error::Io(ref e) if e.kind() == std::io::ErrorKind::WouldBlock));
    assert_eq!(socket.stats().rx_errors.get(), 0);
}

#[tokio::test]
#[ignore] // Requires root and the pppoe kernel module
async fn test_async_send_recv() {
    let pair = VethPair::create().expect("Failed to create veth pair");
    let (left, right) = socket_pair(&pair);
    let left = AsyncDiscoverySocket::new(left).unwrap();
    let right = AsyncDiscoverySocket::new(right).unwrap();

    let frame = padi_frame(left.get_ref().mac_address());
    left.send(&frame).await.unwrap();

    let mut buf = [0u8; 1514];
    let info = tokio::time::timeout(Duration::from_secs(2), right.recv(&mut buf))
        .await
        .expect("no frame within 2s")
        .unwrap();
    assert_eq!(info.len, frame.len());
    assert_eq!(info.source, left.get_ref().mac_address());

    // Back to blocking mode and still usable
    let right = right.into_inner().unwrap();
    assert_eq!(right.stats().rx_packets.get(), 1);
    let connection = right.into_connection();
    assert!(connection.discovery_fd().is_some());
}
