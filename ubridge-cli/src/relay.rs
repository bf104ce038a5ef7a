// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0

use anyhow::{Context as AnyhowContext, Result};
use futures::future::{self, Either, FutureExt};
use tokio_util::sync::CancellationToken;
use tracing_futures::Instrument;

use ubridge::relay;

/// Parameters used to run the datagram-to-stream relay
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct RelayArgs {
  pub udp_port: u16,
  pub remote_host: String,
  pub remote_port: u16,
}

pub async fn relay_main(config: RelayArgs) -> Result<()> {
  let relay = relay::establish(config.udp_port, &config.remote_host, config.remote_port)
    .await
    .context("Establishing relay endpoints")?;

  tracing::info!(
    "forwarding udp:{} to tcp:{}:{}",
    relay
      .datagram_addr()
      .context("Reading bound datagram address")?,
    config.remote_host,
    config.remote_port,
  );

  let (shutdown, sigint_handler_task) = {
    let shutdown = CancellationToken::new();
    let shutdown_trigger = shutdown.clone();
    let sigint_handler_task = tokio::task::spawn(async move {
      let _ = tokio::signal::ctrl_c().await;
      shutdown_trigger.cancel();
    });
    (shutdown, sigint_handler_task)
  };

  let span = tracing::span!(tracing::Level::DEBUG, "relay", peer = ?relay.stream_addr().ok());
  let relay_fut = relay.run().instrument(span).boxed();

  let res = future::select(relay_fut, Box::pin(shutdown.cancelled())).await;
  sigint_handler_task.abort();
  match res {
    Either::Left((Err(err), _)) => Err(err).context("Relay loop failed"),
    Either::Left((Ok(never), _)) => match never {},
    Either::Right(((), _relay_fut)) => {
      tracing::info!("Interrupt received, disconnecting...");
      Ok(())
    }
  }
}
