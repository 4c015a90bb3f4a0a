use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::debug;

use crate::seat_tag::parse_seat_tag;

/// A registry entry that carries a parseable seat tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEntry {
    pub seat: u32,
    pub entity_id: String,
    pub name: String,
}

/// Entity id to display name, kept for the life of the process.
///
/// Session resets never touch this map; names only ever get overwritten.
#[derive(Debug, Default, Clone)]
pub struct IdentityRegistry {
    names: BTreeMap<String, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins. Absent or empty names are ignored.
    pub fn observe(&mut self, entity_id: &str, name: Option<&str>) {
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            return;
        };
        match self.names.get_mut(entity_id) {
            Some(current) if current == name => {}
            Some(current) => {
                debug!(
                    target: "braid::registry",
                    entity_id,
                    previous = %current,
                    name,
                    "registry.renamed"
                );
                name.clone_into(current);
            }
            None => {
                debug!(target: "braid::registry", entity_id, name, "registry.added");
                self.names.insert(entity_id.to_string(), name.to_string());
            }
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&str> {
        self.names.get(entity_id).map(String::as_str)
    }

    /// Stored name, or `"Seat <id>"` when the id has never been named.
    pub fn lookup<'a>(&'a self, entity_id: &str) -> Cow<'a, str> {
        match self.names.get(entity_id) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(format!("Seat {entity_id}")),
        }
    }

    /// Tagged entries ordered by seat number; untagged names are skipped.
    pub fn all(&self) -> Vec<TaggedEntry> {
        let mut entries: Vec<TaggedEntry> = self
            .names
            .iter()
            .filter_map(|(entity_id, name)| {
                parse_seat_tag(name).map(|seat| TaggedEntry {
                    seat,
                    entity_id: entity_id.clone(),
                    name: name.clone(),
                })
            })
            .collect();
        // Stable sort keeps ties in entity-id order.
        entries.sort_by_key(|entry| entry.seat);
        entries
    }

    /// Entity currently wearing the `[S<seat>]` tag.
    pub fn entity_for_seat(&self, seat: u32) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, name)| parse_seat_tag(name) == Some(seat))
            .map(|(entity_id, _)| entity_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
