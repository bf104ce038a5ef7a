// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0
use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::{TcpStream, UdpSocket};

use super::{Relay, RelayError};

/// Binds the local datagram endpoint on the wildcard address.
pub async fn bind_datagram(port: u16) -> Result<UdpSocket, RelayError> {
  let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
  let socket = UdpSocket::bind(bind_addr)
    .await
    .map_err(RelayError::Bind)?;
  tracing::debug!(addr = ?socket.local_addr().ok(), "datagram_endpoint_bound");
  Ok(socket)
}

/// Connects the persistent stream endpoint to the remote peer.
///
/// Name resolution happens here; an unresolvable host is a connect failure
/// like an unreachable one.
pub async fn connect_stream(host: &str, port: u16) -> Result<TcpStream, RelayError> {
  let stream = TcpStream::connect((host, port))
    .await
    .map_err(RelayError::Connect)?;
  tracing::debug!(peer = ?stream.peer_addr().ok(), "stream_endpoint_connected");
  Ok(stream)
}

/// Produces the live endpoint pair consumed by the relay loop.
///
/// The datagram endpoint is bound before the stream connection is attempted,
/// so an in-use local port surfaces without touching the network. Either
/// failure is terminal; there is no retry path.
pub async fn establish(udp_port: u16, host: &str, tcp_port: u16) -> Result<Relay, RelayError> {
  let datagram = bind_datagram(udp_port).await?;
  let stream = connect_stream(host, tcp_port).await?;
  Ok(Relay::new(datagram, stream))
}

#[cfg(test)]
mod tests {
  use tokio::net::{TcpListener, UdpSocket};

  use super::{connect_stream, establish};
  use crate::relay::RelayError;

  #[tokio::test]
  async fn bind_failure_surfaces_before_connect() {
    let taken = UdpSocket::bind("0.0.0.0:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();
    // The remote side would refuse too; the bind failure must win.
    let err = establish(port, "127.0.0.1", 1).await.unwrap_err();
    assert!(matches!(err, RelayError::Bind(_)));
  }

  #[tokio::test]
  async fn connect_refused_is_fatal() {
    let vacated = {
      let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
      listener.local_addr().unwrap()
    };
    let err = establish(0, "127.0.0.1", vacated.port())
      .await
      .unwrap_err();
    assert!(matches!(err, RelayError::Connect(_)));
  }

  #[tokio::test]
  async fn unresolvable_host_is_a_connect_failure() {
    let err = connect_stream("unresolvable.invalid.", 161)
      .await
      .unwrap_err();
    assert!(matches!(err, RelayError::Connect(_)));
  }
}
