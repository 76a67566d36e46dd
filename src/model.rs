//! Checkpoint persistence for trained agents.
//!
//! A checkpoint is the pair (games-played counter, agent). The pattern list
//! and every table entry round-trip exactly through the postcard encoding;
//! patterns never change after construction, so a reloaded agent picks up
//! training where it left off.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

/// A trained model as persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub games_played: u64,
    pub agent: Agent,
}

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Encode a checkpoint to postcard bytes.
pub fn to_postcard_bytes(checkpoint: &Checkpoint) -> Result<Vec<u8>, ModelError> {
    Ok(postcard::to_allocvec(checkpoint)?)
}

/// Decode a checkpoint from postcard bytes.
pub fn from_postcard_bytes(bytes: &[u8]) -> Result<Checkpoint, ModelError> {
    Ok(postcard::from_bytes(bytes)?)
}

/// Write a postcard-encoded checkpoint to a file.
pub fn write_postcard_to_path<P: AsRef<Path>>(
    path: P,
    checkpoint: &Checkpoint,
) -> Result<(), ModelError> {
    let bytes = to_postcard_bytes(checkpoint)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a postcard-encoded checkpoint from a file.
pub fn read_postcard_from_path<P: AsRef<Path>>(path: P) -> Result<Checkpoint, ModelError> {
    let bytes = fs::read(path)?;
    from_postcard_bytes(&bytes)
}
