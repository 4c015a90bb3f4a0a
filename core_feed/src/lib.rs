//! Streaming core for the braid fingerprint inspector.
//!
//! Consumes the metrics feed, keeps the current hand's snapshot history and a
//! process-wide seat name registry, and projects the selected view into a
//! bounded series for whatever renderer sits on top.

pub mod config;
mod error;
pub mod feed;
mod history;
mod projector;
mod registry;
pub mod roster;
pub mod seat_tag;
mod session;

pub use config::{
    load_inspector_config, load_inspector_config_from_env, ConfigError, InspectorConfig,
    InspectorConfigMetadata,
};
pub use error::{FeedError, ViewSelectorError};
pub use feed::{
    channel, read_batch, BatchSummary, FeedConsumer, FeedEvent, FeedReceiver, FeedSender,
    ReconnectPolicy,
};
pub use history::{AppendOutcome, HistoryStore};
pub use projector::{project, view_title, Projection, ViewSelector, ViewWindow, WAITING_ACTION};
pub use registry::{IdentityRegistry, TaggedEntry};
pub use roster::{
    format_roster, resolve_hotkey, roster_lines, Hotkey, HotkeyResolution, RosterLine,
    ROSTER_EMPTY, ROSTER_HEADER,
};
pub use session::{DrainReport, LinkStatus, Session};
