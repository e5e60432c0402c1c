//! Wake-on-LAN over UDP.

use std::net::{Ipv4Addr, SocketAddr};

use esxi_manager_domain::mac::{MAGIC_PACKET_LEN, MacAddress};
use tokio::net::UdpSocket;

use crate::error::SshError;

/// Send the magic packet for `mac` to `destination`.
///
/// # Errors
///
/// Returns an IO error if the socket cannot be opened or written, and
/// [`SshError::ShortWrite`] if the datagram was truncated.
pub async fn send_magic_packet(mac: MacAddress, destination: SocketAddr) -> Result<(), SshError> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
    socket.set_broadcast(true)?;

    let packet = mac.magic_packet();
    let sent = socket.send_to(&packet, destination).await?;
    if sent != MAGIC_PACKET_LEN {
        return Err(SshError::ShortWrite(sent));
    }

    tracing::info!(%mac, %destination, "sent Wake-on-LAN packet");
    Ok(())
}
