use std::io;

use thiserror::Error;

/// Validation failures raised before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("invalid tile glyph {0:?}")]
    InvalidTile(char),

    #[error("invalid meld {text:?}: {reason}")]
    InvalidMeld { text: String, reason: &'static str },

    #[error("wrong tile count: {concealed} concealed tiles with {declared} declared melds")]
    WrongTileCount { concealed: usize, declared: usize },
}

pub type Result<T> = std::result::Result<T, HandError>;

/// Failures while loading a cache snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}
