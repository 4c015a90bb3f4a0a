//! Feed consumer: owns the socket, turns frames into snapshots and queues them.
//!
//! Nothing here looks inside a snapshot. The render tick drains the queue on
//! its own schedule, so a stalled or reconnecting feed never blocks drawing.

use std::io::BufRead;
use std::time::Duration;

use braid_proto::{decode_snapshot_json, Snapshot};
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, trace, warn};

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected { endpoint: String },
    Snapshot(Box<Snapshot>),
    Disconnected { reason: String },
}

pub type FeedSender = UnboundedSender<FeedEvent>;
pub type FeedReceiver = UnboundedReceiver<FeedEvent>;

pub fn channel() -> (FeedSender, FeedReceiver) {
    unbounded_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Wait a fixed delay after every disconnect, forever.
    Fixed(Duration),
    /// Stop after the first disconnect.
    Disabled,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed(Duration::from_secs(2))
    }
}

/// Why a connection's message loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    RemoteClosed,
    ReceiverDropped,
}

pub struct FeedConsumer {
    endpoint: String,
    policy: ReconnectPolicy,
}

impl FeedConsumer {
    pub fn new(endpoint: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            endpoint: endpoint.into(),
            policy,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Connect, pump, and reconnect until the receiver goes away or the
    /// policy gives up. Safe to drop at any await point.
    pub async fn run(&self, sender: FeedSender) {
        loop {
            if sender.is_closed() {
                debug!(target: "braid::feed", "feed.stopped=receiver_closed");
                return;
            }

            info!(target: "braid::feed", endpoint = %self.endpoint, "feed.connecting");
            let reason = match connect_async(self.endpoint.as_str()).await {
                Ok((mut socket, _response)) => {
                    info!(target: "braid::feed", endpoint = %self.endpoint, "feed.connected");
                    let connected = FeedEvent::Connected {
                        endpoint: self.endpoint.clone(),
                    };
                    if sender.send(connected).is_err() {
                        return;
                    }
                    match pump_messages(&mut socket, &sender).await {
                        Ok(PumpEnd::ReceiverDropped) => return,
                        Ok(PumpEnd::RemoteClosed) => "stream closed by remote".to_string(),
                        Err(err) => err.to_string(),
                    }
                }
                Err(err) => FeedError::from(err).to_string(),
            };

            warn!(
                target: "braid::feed",
                endpoint = %self.endpoint,
                reason = %reason,
                "feed.disconnected"
            );
            if sender.send(FeedEvent::Disconnected { reason }).is_err() {
                return;
            }

            match self.policy {
                ReconnectPolicy::Fixed(delay) => {
                    info!(
                        target: "braid::feed",
                        delay_ms = delay.as_millis() as u64,
                        "feed.reconnect_scheduled"
                    );
                    tokio::time::sleep(delay).await;
                }
                ReconnectPolicy::Disabled => return,
            }
        }
    }
}

/// Forward every decodable frame of one connection into the queue.
///
/// Malformed frames are logged and skipped; transport errors end the loop.
pub async fn pump_messages<S>(stream: &mut S, sender: &FeedSender) -> Result<PumpEnd, FeedError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        let decoded = match message? {
            Message::Text(text) => Some(decode_frame(&text)),
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => Some(decode_frame(text)),
                Err(err) => {
                    warn!(target: "braid::feed", error = %err, "snapshot.decode_failed=binary");
                    None
                }
            },
            Message::Close(_) => {
                info!(target: "braid::feed", "feed.close_frame");
                return Ok(PumpEnd::RemoteClosed);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
        };
        let snapshot = match decoded {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(err)) => {
                warn!(target: "braid::feed", error = %err, "snapshot.decode_failed");
                continue;
            }
            None => continue,
        };
        trace!(target: "braid::feed", step = snapshot.step_or_zero(), "snapshot.received");
        if sender.send(FeedEvent::Snapshot(Box::new(snapshot))).is_err() {
            return Ok(PumpEnd::ReceiverDropped);
        }
    }
    Ok(PumpEnd::RemoteClosed)
}

pub fn decode_frame(text: &str) -> Result<Snapshot, FeedError> {
    Ok(decode_snapshot_json(text)?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub accepted: usize,
    pub skipped: usize,
}

/// Queue one snapshot per non-blank line of `reader`.
pub fn read_batch<R: BufRead>(reader: R, sender: &FeedSender) -> Result<BatchSummary, FeedError> {
    let mut summary = BatchSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match decode_frame(trimmed) {
            Ok(snapshot) => {
                sender
                    .send(FeedEvent::Snapshot(Box::new(snapshot)))
                    .map_err(|_| FeedError::QueueClosed)?;
                summary.accepted += 1;
            }
            Err(err) => {
                warn!(
                    target: "braid::feed",
                    line = index + 1,
                    error = %err,
                    "batch.line_skipped"
                );
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}
