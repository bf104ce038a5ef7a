// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license OR Apache 2.0

/// Fixed capacity of the relay's reusable receive buffer; datagrams beyond
/// this are truncated by the receiving socket.
pub const SCRATCH_CAPACITY: usize = 2048;

/// Bounded scratch region reused across every relay iteration.
///
/// Allocated once for the process lifetime. Each relay step borrows it
/// exclusively; `len` tracks how many leading bytes the most recent receive
/// or read made valid, so sends never touch stale capacity.
#[derive(Debug)]
pub struct Scratch {
  bytes: Box<[u8; SCRATCH_CAPACITY]>,
  len: usize,
}

impl Scratch {
  pub fn new() -> Self {
    Self {
      bytes: Box::new([0u8; SCRATCH_CAPACITY]),
      len: 0,
    }
  }

  /// The currently valid leading bytes.
  pub fn valid(&self) -> &[u8] {
    &self.bytes[..self.len]
  }

  /// Full-capacity view handed to socket receive and read calls.
  pub fn as_mut_slice(&mut self) -> &mut [u8] {
    &mut self.bytes[..]
  }

  /// Records how many leading bytes are valid after a receive or read.
  pub fn set_valid(&mut self, len: usize) {
    self.len = len.min(SCRATCH_CAPACITY);
  }
}

impl Default for Scratch {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::{Scratch, SCRATCH_CAPACITY};

  #[test]
  fn valid_tracks_recorded_length() {
    let mut scratch = Scratch::new();
    assert!(scratch.valid().is_empty());
    scratch.as_mut_slice()[..4].copy_from_slice(b"ping");
    scratch.set_valid(4);
    assert_eq!(scratch.valid(), b"ping");
  }

  #[test]
  fn overwriting_shrinks_the_valid_region() {
    let mut scratch = Scratch::new();
    scratch.as_mut_slice()[..6].copy_from_slice(b"longer");
    scratch.set_valid(6);
    scratch.as_mut_slice()[..2].copy_from_slice(b"ok");
    scratch.set_valid(2);
    assert_eq!(scratch.valid(), b"ok");
  }

  #[test]
  fn set_valid_clamps_to_capacity() {
    let mut scratch = Scratch::new();
    scratch.set_valid(SCRATCH_CAPACITY + 1);
    assert_eq!(scratch.valid().len(), SCRATCH_CAPACITY);
  }
}
