// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0

//! Core relay cycle: datagram in, stream out, stream in, datagram out.

use std::convert::Infallible;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

pub mod exchange;
pub mod session;

pub use exchange::{Scratch, SCRATCH_CAPACITY};
pub use session::{bind_datagram, connect_stream, establish};

/// One variant per fallible relay operation; every variant is terminal.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
  #[error("Failed to bind local datagram endpoint: {0}")]
  Bind(#[source] std::io::Error),
  #[error("Failed to connect to remote stream endpoint: {0}")]
  Connect(#[source] std::io::Error),
  #[error("Failed to receive datagram: {0}")]
  Receive(#[source] std::io::Error),
  #[error("Failed to forward payload to stream endpoint: {0}")]
  Write(#[source] std::io::Error),
  #[error("Failed to read reply from stream endpoint: {0}")]
  Read(#[source] std::io::Error),
  #[error("Failed to send reply datagram: {0}")]
  Send(#[source] std::io::Error),
}

/// A relaying session: both live endpoints plus the reusable scratch buffer.
///
/// Endpoints are held for the process lifetime; there is deliberately no
/// rebind or reconnect path.
#[derive(Debug)]
pub struct Relay {
  datagram: UdpSocket,
  stream: TcpStream,
  scratch: Scratch,
}

impl Relay {
  pub fn new(datagram: UdpSocket, stream: TcpStream) -> Self {
    Self {
      datagram,
      stream,
      scratch: Scratch::new(),
    }
  }

  /// Local address of the datagram endpoint.
  pub fn datagram_addr(&self) -> std::io::Result<SocketAddr> {
    self.datagram.local_addr()
  }

  /// Remote address of the stream endpoint.
  pub fn stream_addr(&self) -> std::io::Result<SocketAddr> {
    self.stream.peer_addr()
  }

  /// Runs the relay cycle until a step fails.
  ///
  /// One exchange is in flight at a time: each iteration completes all four
  /// steps before the next datagram is accepted, and nothing persists across
  /// iterations except the scratch region itself.
  pub async fn run(mut self) -> Result<Infallible, RelayError> {
    loop {
      let peer = Self::receive_datagram(&self.datagram, &mut self.scratch).await?;
      Self::forward_to_stream(&mut self.stream, &self.scratch).await?;
      Self::read_reply(&mut self.stream, &mut self.scratch).await?;
      Self::forward_to_datagram(&self.datagram, &self.scratch, peer).await?;
    }
  }

  /// Blocks until one datagram arrives, recording its length and sender.
  async fn receive_datagram(
    datagram: &UdpSocket,
    scratch: &mut Scratch,
  ) -> Result<SocketAddr, RelayError> {
    let (len, peer) = datagram
      .recv_from(scratch.as_mut_slice())
      .await
      .map_err(RelayError::Receive)?;
    scratch.set_valid(len);
    tracing::debug!(len, ?peer, "received_datagram");
    Ok(peer)
  }

  /// Writes exactly the valid payload bytes to the stream, then flushes so
  /// nothing is held back.
  async fn forward_to_stream(stream: &mut TcpStream, scratch: &Scratch) -> Result<(), RelayError> {
    stream
      .write_all(scratch.valid())
      .await
      .map_err(RelayError::Write)?;
    stream.flush().await.map_err(RelayError::Write)?;
    tracing::debug!(len = scratch.valid().len(), "forwarded_to_stream");
    Ok(())
  }

  /// Blocks until the stream yields a reply chunk, overwriting the scratch
  /// region.
  ///
  /// The stream carries no framing and none is imposed here: a single read
  /// may return less than the peer wrote as one message. A zero-length read
  /// means the remote closed the connection, which is terminal.
  async fn read_reply(stream: &mut TcpStream, scratch: &mut Scratch) -> Result<(), RelayError> {
    let len = stream
      .read(scratch.as_mut_slice())
      .await
      .map_err(RelayError::Read)?;
    if len == 0 {
      return Err(RelayError::Read(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "stream endpoint closed by remote peer",
      )));
    }
    scratch.set_valid(len);
    tracing::debug!(len, "read_reply_from_stream");
    Ok(())
  }

  /// Sends the reply bytes back to the most recent datagram sender.
  async fn forward_to_datagram(
    datagram: &UdpSocket,
    scratch: &Scratch,
    peer: SocketAddr,
  ) -> Result<(), RelayError> {
    datagram
      .send_to(scratch.valid(), peer)
      .await
      .map_err(RelayError::Send)?;
    tracing::debug!(len = scratch.valid().len(), ?peer, "forwarded_to_datagram");
    Ok(())
  }
}
