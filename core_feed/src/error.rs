use std::io;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read batch input: {0}")]
    Io(#[from] io::Error),
    #[error("ingestion queue closed")]
    QueueClosed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewSelectorError {
    #[error("empty view selector")]
    Empty,
    #[error("unknown view selector '{0}' (expected global, g, 0 or a seat 1-10)")]
    Unknown(String),
}
