use braid_proto::Snapshot;
use tracing::info;

/// Result of a single [`HistoryStore::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// `step` went backwards: the previous session was discarded first.
    Reset { dropped: usize, last_step: u64 },
}

impl AppendOutcome {
    pub fn is_reset(&self) -> bool {
        matches!(self, AppendOutcome::Reset { .. })
    }
}

/// Arrival-ordered snapshots of the current hand.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    entries: Vec<Snapshot>,
    resets: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, snapshot: Snapshot) -> AppendOutcome {
        let mut outcome = AppendOutcome::Appended;
        if let (Some(last), Some(step)) = (self.entries.last(), snapshot.step) {
            let last_step = last.step_or_zero();
            if step < last_step {
                let dropped = self.entries.len();
                self.entries.clear();
                self.resets += 1;
                info!(
                    target: "braid::history",
                    dropped,
                    last_step,
                    step,
                    "session.reset"
                );
                outcome = AppendOutcome::Reset { dropped, last_step };
            }
        }
        self.entries.push(snapshot);
        outcome
    }

    pub fn snapshot(&self) -> &[Snapshot] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of session resets observed over the life of the store.
    pub fn resets(&self) -> u64 {
        self.resets
    }
}
