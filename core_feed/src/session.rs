use braid_proto::Snapshot;
use tracing::{info, warn};

use crate::feed::{FeedEvent, FeedReceiver};
use crate::history::{AppendOutcome, HistoryStore};
use crate::registry::IdentityRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Waiting,
    Connected(String),
    Disconnected(String),
}

/// Counts from one render-tick drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: usize,
    pub resets: usize,
    pub link_changes: usize,
}

impl DrainReport {
    pub fn is_idle(&self) -> bool {
        self.applied == 0 && self.link_changes == 0
    }
}

/// Everything the render tick owns: the hand's history and the
/// process-wide name registry. Only the tick mutates it.
#[derive(Debug, Default)]
pub struct Session {
    history: HistoryStore,
    registry: IdentityRegistry,
    link: LinkStatus,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, snapshot: Snapshot) -> AppendOutcome {
        for (entity_id, name) in snapshot.named_players() {
            self.registry.observe(entity_id, Some(name));
        }
        self.history.append(snapshot)
    }

    pub fn handle(&mut self, event: FeedEvent) -> DrainReport {
        let mut report = DrainReport::default();
        match event {
            FeedEvent::Snapshot(snapshot) => {
                report.applied = 1;
                if self.apply(*snapshot).is_reset() {
                    report.resets = 1;
                }
            }
            FeedEvent::Connected { endpoint } => {
                info!(target: "braid::session", endpoint = %endpoint, "link.up");
                self.link = LinkStatus::Connected(endpoint);
                report.link_changes = 1;
            }
            FeedEvent::Disconnected { reason } => {
                warn!(target: "braid::session", reason = %reason, "link.down");
                self.link = LinkStatus::Disconnected(reason);
                report.link_changes = 1;
            }
        }
        report
    }

    /// Apply everything currently queued without waiting for more.
    pub fn drain(&mut self, receiver: &mut FeedReceiver) -> DrainReport {
        let mut total = DrainReport::default();
        while let Ok(event) = receiver.try_recv() {
            let report = self.handle(event);
            total.applied += report.applied;
            total.resets += report.resets;
            total.link_changes += report.link_changes;
        }
        total
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn link(&self) -> &LinkStatus {
        &self.link
    }
}
