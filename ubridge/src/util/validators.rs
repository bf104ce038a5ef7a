// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0
use anyhow::{Error as AnyErr, Result};

pub fn parse_port(v: &str) -> Result<u16> {
  v.parse::<u16>()
    .map_err(|_| AnyErr::msg("Port was not a valid u16"))
}

pub fn parse_host(v: &str) -> Result<String> {
  let trimmed = v.trim();
  if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
    Err(AnyErr::msg("Host must be a single name or address"))
  } else {
    Ok(trimmed.to_string())
  }
}

pub fn validate_port(v: &str) -> Result<(), String> {
  parse_port(v).map(|_| ()).map_err(|e| e.to_string())
}

pub fn validate_host(v: &str) -> Result<(), String> {
  parse_host(v).map(|_| ()).map_err(|e| e.to_string())
}
