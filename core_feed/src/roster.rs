use std::fmt;

use tracing::info;

use crate::projector::ViewSelector;
use crate::registry::{IdentityRegistry, TaggedEntry};
use crate::seat_tag::display_name;

pub const ROSTER_HEADER: &str = "[G] GLOBAL VIEW";
pub const ROSTER_EMPTY: &str = "Waiting for players...";

/// Physical key bound to a roster entry. Only seats 1-10 map onto the digit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Digit(char),
    Unknown,
}

impl Hotkey {
    pub fn for_seat(seat: u32) -> Self {
        match seat {
            10 => Hotkey::Digit('0'),
            1..=9 => char::from_digit(seat, 10).map_or(Hotkey::Unknown, Hotkey::Digit),
            _ => Hotkey::Unknown,
        }
    }

    /// Seat addressed by a digit key, `0` standing in for seat 10.
    pub fn seat_for_key(key: char) -> Option<u32> {
        match key.to_digit(10)? {
            0 => Some(10),
            seat => Some(seat),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Hotkey::Digit(key) => key.to_string(),
            Hotkey::Unknown => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterLine {
    pub hotkey: Hotkey,
    pub seat: u32,
    pub entity_id: String,
    pub display_name: String,
}

impl RosterLine {
    fn from_entry(entry: &TaggedEntry) -> Self {
        Self {
            hotkey: Hotkey::for_seat(entry.seat),
            seat: entry.seat,
            entity_id: entry.entity_id.clone(),
            display_name: display_name(&entry.name),
        }
    }

    /// `"<name> (Seat <n>)"` without the hotkey prefix.
    pub fn label(&self) -> String {
        format!("{} (Seat {})", self.display_name, self.seat)
    }
}

impl fmt::Display for RosterLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.hotkey.label(), self.label())
    }
}

/// Display list for the HUD, ascending by tagged seat.
pub fn format_roster(registry: &IdentityRegistry) -> Vec<RosterLine> {
    registry.all().iter().map(RosterLine::from_entry).collect()
}

/// Roster panel text, one line per entry under the global-view header.
///
/// The header appears as soon as any name is known, tagged or not.
pub fn roster_lines(registry: &IdentityRegistry) -> Vec<String> {
    if registry.is_empty() {
        return vec![ROSTER_EMPTY.to_string()];
    }
    let roster = format_roster(registry);
    let mut lines = Vec::with_capacity(roster.len() + 2);
    lines.push(ROSTER_HEADER.to_string());
    lines.push(String::new());
    lines.extend(roster.iter().map(RosterLine::to_string));
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyResolution {
    Select(ViewSelector),
    /// A digit with no tagged player behind it; the view stays put.
    Unbound { seat: u32 },
    Ignored,
}

pub fn resolve_hotkey(key: char, registry: &IdentityRegistry) -> HotkeyResolution {
    if matches!(key, '`' | 'g' | 'G') {
        return HotkeyResolution::Select(ViewSelector::Global);
    }
    let Some(seat) = Hotkey::seat_for_key(key) else {
        return HotkeyResolution::Ignored;
    };
    match registry.entity_for_seat(seat) {
        Some(entity_id) => HotkeyResolution::Select(ViewSelector::Entity(entity_id.to_string())),
        None => {
            info!(
                target: "braid::roster",
                key = %key,
                seat,
                "hotkey.unbound"
            );
            HotkeyResolution::Unbound { seat }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, &str)]) -> IdentityRegistry {
        let mut registry = IdentityRegistry::new();
        for (id, name) in entries {
            registry.observe(id, Some(name));
        }
        registry
    }

    #[test]
    fn roster_is_sorted_by_tag_with_clean_names() {
        let registry = registry(&[("1", "[S2] Bob @ z9"), ("2", "[S1] Amy")]);
        let roster = format_roster(&registry);
        let rendered: Vec<(String, String)> = roster
            .iter()
            .map(|line| (line.hotkey.label(), line.label()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("1".to_string(), "Amy (Seat 1)".to_string()),
                ("2".to_string(), "Bob (Seat 2)".to_string()),
            ]
        );
    }

    #[test]
    fn seat_ten_binds_to_zero_and_out_of_range_is_unknown() {
        assert_eq!(Hotkey::for_seat(10), Hotkey::Digit('0'));
        assert_eq!(Hotkey::for_seat(7), Hotkey::Digit('7'));
        assert_eq!(Hotkey::for_seat(0), Hotkey::Unknown);
        assert_eq!(Hotkey::for_seat(11), Hotkey::Unknown);

        let registry = registry(&[("4", "[S12] Far"), ("5", "[S10] Ten")]);
        let lines = roster_lines(&registry);
        assert_eq!(
            lines,
            vec![
                ROSTER_HEADER.to_string(),
                String::new(),
                "[0] Ten (Seat 10)".to_string(),
                "[?] Far (Seat 12)".to_string(),
            ]
        );
    }

    #[test]
    fn untagged_registry_renders_bare_header() {
        let registry = registry(&[("3", "Nobody")]);
        assert!(format_roster(&registry).is_empty());
        assert_eq!(
            roster_lines(&registry),
            vec![ROSTER_HEADER.to_string(), String::new()]
        );
        assert_eq!(
            roster_lines(&IdentityRegistry::new()),
            vec![ROSTER_EMPTY.to_string()]
        );
    }

    #[test]
    fn hotkeys_resolve_through_tags() {
        let registry = registry(&[("6", "[S1] Amy"), ("2", "[S10] Zed")]);
        assert_eq!(
            resolve_hotkey('1', &registry),
            HotkeyResolution::Select(ViewSelector::Entity("6".into()))
        );
        assert_eq!(
            resolve_hotkey('0', &registry),
            HotkeyResolution::Select(ViewSelector::Entity("2".into()))
        );
        assert_eq!(
            resolve_hotkey('g', &registry),
            HotkeyResolution::Select(ViewSelector::Global)
        );
        assert_eq!(
            resolve_hotkey('`', &registry),
            HotkeyResolution::Select(ViewSelector::Global)
        );
        assert_eq!(
            resolve_hotkey('3', &registry),
            HotkeyResolution::Unbound { seat: 3 }
        );
        assert_eq!(resolve_hotkey('x', &registry), HotkeyResolution::Ignored);
    }
}
