// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use ubridge::util;

use util::validators::{parse_host, parse_port, validate_host, validate_port};

mod relay;

fn main() {
  let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
  let collector = tracing_subscriber::fmt()
    .pretty()
    .with_env_filter(env_filter)
    .finish();
  tracing::subscriber::set_global_default(collector).expect("Logger init must succeed");
  let app = Command::new(env!("CARGO_BIN_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .arg(
      Arg::new("udp-port")
        .help("Local port that accepts the datagrams to forward")
        .long("udp-port")
        .short('u')
        .validator(validate_port)
        .default_value("161")
        .takes_value(true),
    )
    .arg(
      Arg::new("port")
        .help("Remote port the stream connection is made to")
        .long("port")
        .short('p')
        .validator(validate_port)
        .default_value("161")
        .takes_value(true),
    )
    .arg(
      Arg::new("host")
        .help("Remote host the stream connection is made to")
        .long("host")
        .validator(validate_host)
        .takes_value(true)
        .required(true),
    );
  let matches = app.get_matches();
  let handler = main_args_handler(&matches);
  let rt = tokio::runtime::Builder::new_multi_thread()
    .thread_name("tokio-reactor-worker")
    .enable_all()
    .build()
    .expect("Tokio Runtime setup failure");
  match rt.block_on(handler) {
    Err(err) => {
      tracing::error!(err = ?err, "relay_failure");
      std::process::exit(1);
    }
    Ok(_) => tracing::info!("exited successfully"),
  }
}

pub fn relay_arg_handling(args: &'_ ArgMatches) -> Result<relay::RelayArgs> {
  Ok(relay::RelayArgs {
    udp_port: parse_port(args.value_of("udp-port").expect("udp-port has a default"))?,
    remote_host: parse_host(args.value_of("host").expect("host is marked as required"))?,
    remote_port: parse_port(args.value_of("port").expect("port has a default"))?,
  })
}

async fn main_args_handler(matches: &'_ ArgMatches) -> Result<()> {
  let config = relay_arg_handling(matches)?;
  tracing::info!("Running relay with config {:#?}", config);
  relay::relay_main(config).await
}

#[cfg(test)]
mod tests {}
