#![allow(dead_code)]

use std::path::PathBuf;

use braid_proto::{PlayerRecord, Snapshot};
use core_feed::{channel, FeedEvent, Session};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Snapshot carrying only global metrics.
pub fn global(step: u64, action: &str, writhe: i64, burau: f64) -> Snapshot {
    Snapshot::new(step, action).with_global(writhe, burau)
}

pub fn seated(seat: u32, name: &str) -> PlayerRecord {
    PlayerRecord::named(format!("[S{seat}] {name}"), 0, 0.0)
}

/// Feed `snapshots` through the queue the way the render tick sees them.
pub fn session_from(snapshots: Vec<Snapshot>) -> Session {
    let (sender, mut receiver) = channel();
    for snapshot in snapshots {
        sender
            .send(FeedEvent::Snapshot(Box::new(snapshot)))
            .expect("receiver alive");
    }
    let mut session = Session::new();
    session.drain(&mut receiver);
    session
}

pub fn frame(snapshot: &Snapshot) -> String {
    braid_proto::encode_snapshot_json(snapshot).expect("snapshot encodes")
}
