use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Aggregate metrics for the whole hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writhe: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burau: Option<f64>,
}

impl GlobalMetrics {
    pub fn new(writhe: i64, burau: f64) -> Self {
        Self {
            writhe: Some(writhe),
            burau: Some(burau),
        }
    }

    /// An object with no recognised fields carries nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.writhe.is_none() && self.burau.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writhe: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,
}

impl PlayerRecord {
    pub fn named(name: impl Into<String>, writhe: i64, complexity: f64) -> Self {
        Self {
            name: Some(name.into()),
            writhe: Some(writhe),
            complexity: Some(complexity),
        }
    }
}

/// One update from the metrics feed.
///
/// Every field is optional on the wire. Top-level `writhe` and
/// `burau_trace_magnitude` belong to the older flat format and are only
/// consulted when `global` is missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalMetrics>,
    #[serde(
        default,
        deserialize_with = "players_skipping_nulls",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub players: BTreeMap<String, PlayerRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writhe: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burau_trace_magnitude: Option<f64>,
}

impl Snapshot {
    pub fn new(step: u64, action: impl Into<String>) -> Self {
        Self {
            step: Some(step),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_global(mut self, writhe: i64, burau: f64) -> Self {
        self.global = Some(GlobalMetrics::new(writhe, burau));
        self
    }

    pub fn with_legacy(mut self, writhe: i64, burau_trace_magnitude: f64) -> Self {
        self.writhe = Some(writhe);
        self.burau_trace_magnitude = Some(burau_trace_magnitude);
        self
    }

    pub fn with_player(mut self, id: impl Into<String>, record: PlayerRecord) -> Self {
        self.players.insert(id.into(), record);
        self
    }

    pub fn step_or_zero(&self) -> u64 {
        self.step.unwrap_or(0)
    }

    /// `(writhe, burau)` for the global view, falling back to the flat fields.
    pub fn global_metrics(&self) -> (i64, f64) {
        match self.global.as_ref().filter(|metrics| !metrics.is_empty()) {
            Some(metrics) => (metrics.writhe.unwrap_or(0), metrics.burau.unwrap_or(0.0)),
            None => (
                self.writhe.unwrap_or(0),
                self.burau_trace_magnitude.unwrap_or(0.0),
            ),
        }
    }

    /// `(writhe, complexity)` for one seat; an absent seat is inactive and reads as zero.
    pub fn player_metrics(&self, id: &str) -> (i64, f64) {
        match self.players.get(id) {
            Some(record) => (
                record.writhe.unwrap_or(0),
                record.complexity.unwrap_or(0.0),
            ),
            None => (0, 0.0),
        }
    }

    /// Names announced in this snapshot, skipping blanks.
    pub fn named_players(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.players.iter().filter_map(|(id, record)| {
            record
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| (id.as_str(), name))
        })
    }
}

/// Explicit `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A `null` map reads as empty and a `null` record as an absent seat.
fn players_skipping_nulls<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, PlayerRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let players: BTreeMap<String, Option<PlayerRecord>> = null_as_default(deserializer)?;
    Ok(players
        .into_iter()
        .filter_map(|(id, record)| record.map(|record| (id, record)))
        .collect())
}

pub fn decode_snapshot_json(data: &str) -> serde_json::Result<Snapshot> {
    serde_json::from_str(data)
}

pub fn encode_snapshot_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}
