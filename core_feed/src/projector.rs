use std::fmt;
use std::str::FromStr;

use braid_proto::Snapshot;

use crate::error::ViewSelectorError;
use crate::registry::IdentityRegistry;

pub const WAITING_ACTION: &str = "Waiting for data...";

/// Which series the renderer is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewSelector {
    #[default]
    Global,
    Entity(String),
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSelector::Global => f.write_str("global"),
            ViewSelector::Entity(id) => write!(f, "seat {id}"),
        }
    }
}

impl FromStr for ViewSelector {
    type Err = ViewSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ViewSelectorError::Empty);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "0" | "g" | "global" => Ok(ViewSelector::Global),
            other => match other.parse::<u32>() {
                Ok(seat @ 1..=10) => Ok(ViewSelector::Entity(seat.to_string())),
                _ => Err(ViewSelectorError::Unknown(trimmed.to_string())),
            },
        }
    }
}

/// Trailing window applied to a projected series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWindow {
    pub size: usize,
    pub auto_scroll: bool,
}

impl ViewWindow {
    pub fn unbounded() -> Self {
        Self {
            size: usize::MAX,
            auto_scroll: false,
        }
    }

    fn start_for(&self, len: usize) -> usize {
        if self.auto_scroll {
            len.saturating_sub(self.size)
        } else {
            0
        }
    }
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self {
            size: 50,
            auto_scroll: true,
        }
    }
}

/// Aligned series ready for a renderer. Rebuilt from scratch every tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub steps: Vec<u64>,
    pub primary: Vec<i64>,
    pub secondary: Vec<f64>,
    pub action: Option<String>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn action_or_waiting(&self) -> &str {
        self.action.as_deref().unwrap_or(WAITING_ACTION)
    }

    pub fn step_bounds(&self) -> Option<(f64, f64)> {
        let min = *self.steps.iter().min()?;
        let max = *self.steps.iter().max()?;
        Some((min as f64 - 0.5, max as f64 + 0.5))
    }

    pub fn primary_bounds(&self) -> Option<(f64, f64)> {
        let min = *self.primary.iter().min()?;
        let max = *self.primary.iter().max()?;
        Some((min as f64 - 1.0, max as f64 + 1.0))
    }

    pub fn secondary_bounds(&self) -> Option<(f64, f64)> {
        let (min, max) = self
            .secondary
            .iter()
            .copied()
            .fold(None, |acc: Option<(f64, f64)>, value| match acc {
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
                None => Some((value, value)),
            })?;
        let margin = if max == min { 0.1 } else { (max - min) * 0.1 };
        Some((min - margin, max + margin))
    }
}

/// Project `history` onto the selected view.
///
/// Pure: identical inputs always give identical output.
pub fn project(history: &[Snapshot], selector: &ViewSelector, window: ViewWindow) -> Projection {
    let visible = &history[window.start_for(history.len())..];
    let mut projection = Projection {
        steps: Vec::with_capacity(visible.len()),
        primary: Vec::with_capacity(visible.len()),
        secondary: Vec::with_capacity(visible.len()),
        action: history.last().map(|snapshot| snapshot.action.clone()),
    };
    for snapshot in visible {
        let (primary, secondary) = match selector {
            ViewSelector::Global => snapshot.global_metrics(),
            ViewSelector::Entity(id) => snapshot.player_metrics(id),
        };
        projection.steps.push(snapshot.step_or_zero());
        projection.primary.push(primary);
        projection.secondary.push(secondary);
    }
    projection
}

/// Header line naming the view and the latest action.
pub fn view_title(
    selector: &ViewSelector,
    registry: &IdentityRegistry,
    projection: &Projection,
) -> String {
    let action = projection.action_or_waiting();
    match selector {
        ViewSelector::Global => format!("WATCHING: GLOBAL - {action}"),
        ViewSelector::Entity(id) => format!(
            "WATCHING: SEAT {id} ({}) - {action}",
            registry.lookup(id)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_proto::PlayerRecord;

    fn hand() -> Vec<Snapshot> {
        vec![
            Snapshot::new(0, "deal")
                .with_global(0, 1.0)
                .with_player("4", PlayerRecord::named("[S4] Dee", 2, 0.5)),
            Snapshot::new(1, "Seat 1 call ($10)").with_global(1, 1.5),
            Snapshot::new(2, "Seat 4 raise ($30)")
                .with_global(3, 2.0)
                .with_player("4", PlayerRecord::named("[S4] Dee", 5, 1.25)),
        ]
    }

    #[test]
    fn global_view_reads_global_metrics() {
        let projection = project(&hand(), &ViewSelector::Global, ViewWindow::unbounded());
        assert_eq!(projection.steps, vec![0, 1, 2]);
        assert_eq!(projection.primary, vec![0, 1, 3]);
        assert_eq!(projection.secondary, vec![1.0, 1.5, 2.0]);
        assert_eq!(projection.action.as_deref(), Some("Seat 4 raise ($30)"));
    }

    #[test]
    fn legacy_and_structured_global_project_identically() {
        let legacy = vec![Snapshot::new(0, "x").with_legacy(5, 2.5)];
        let structured = vec![Snapshot::new(0, "x").with_global(5, 2.5)];
        assert_eq!(
            project(&legacy, &ViewSelector::Global, ViewWindow::default()),
            project(&structured, &ViewSelector::Global, ViewWindow::default())
        );
    }

    #[test]
    fn absent_entity_reads_zero_not_last_value() {
        let selector = ViewSelector::Entity("4".into());
        let projection = project(&hand(), &selector, ViewWindow::unbounded());
        assert_eq!(projection.primary, vec![2, 0, 5]);
        assert_eq!(projection.secondary, vec![0.5, 0.0, 1.25]);
    }

    #[test]
    fn projection_is_idempotent() {
        let history = hand();
        let selector = ViewSelector::Entity("4".into());
        let first = project(&history, &selector, ViewWindow::default());
        let second = project(&history, &selector, ViewWindow::default());
        assert_eq!(first, second);
    }

    #[test]
    fn auto_scroll_keeps_trailing_window() {
        let history: Vec<Snapshot> = (0..80)
            .map(|step| Snapshot::new(step, format!("a{step}")).with_global(step as i64, 0.0))
            .collect();
        let projection = project(&history, &ViewSelector::Global, ViewWindow::default());
        assert_eq!(projection.len(), 50);
        assert_eq!(projection.steps.first(), Some(&30));
        assert_eq!(projection.steps.last(), Some(&79));
        assert_eq!(projection.action.as_deref(), Some("a79"));

        let frozen = ViewWindow {
            size: 10,
            auto_scroll: false,
        };
        assert_eq!(project(&history, &ViewSelector::Global, frozen).len(), 80);
    }

    #[test]
    fn empty_history_has_no_action_or_bounds() {
        let projection = project(&[], &ViewSelector::Global, ViewWindow::default());
        assert!(projection.is_empty());
        assert_eq!(projection.action_or_waiting(), WAITING_ACTION);
        assert_eq!(projection.step_bounds(), None);
        assert_eq!(projection.primary_bounds(), None);
        assert_eq!(projection.secondary_bounds(), None);
    }

    #[test]
    fn bounds_pad_ranges() {
        let projection = project(&hand(), &ViewSelector::Global, ViewWindow::default());
        assert_eq!(projection.step_bounds(), Some((-0.5, 2.5)));
        assert_eq!(projection.primary_bounds(), Some((-1.0, 4.0)));
        let (lo, hi) = projection.secondary_bounds().unwrap();
        assert!((lo - 0.9).abs() < 1e-9);
        assert!((hi - 2.1).abs() < 1e-9);

        let flat = project(
            &[Snapshot::new(0, "").with_global(0, 3.0)],
            &ViewSelector::Global,
            ViewWindow::default(),
        );
        let (lo, hi) = flat.secondary_bounds().unwrap();
        assert!((lo - 2.9).abs() < 1e-9);
        assert!((hi - 3.1).abs() < 1e-9);
    }

    #[test]
    fn selector_parsing() {
        assert_eq!("global".parse::<ViewSelector>(), Ok(ViewSelector::Global));
        assert_eq!("G".parse::<ViewSelector>(), Ok(ViewSelector::Global));
        assert_eq!("0".parse::<ViewSelector>(), Ok(ViewSelector::Global));
        assert_eq!(
            "7".parse::<ViewSelector>(),
            Ok(ViewSelector::Entity("7".into()))
        );
        assert_eq!(
            "10".parse::<ViewSelector>(),
            Ok(ViewSelector::Entity("10".into()))
        );
        assert_eq!(
            "11".parse::<ViewSelector>(),
            Err(ViewSelectorError::Unknown("11".into()))
        );
        assert_eq!(" ".parse::<ViewSelector>(), Err(ViewSelectorError::Empty));
    }

    #[test]
    fn titles_name_the_view() {
        let mut registry = IdentityRegistry::new();
        registry.observe("4", Some("[S4] Dee"));
        let history = hand();
        let global = project(&history, &ViewSelector::Global, ViewWindow::default());
        assert_eq!(
            view_title(&ViewSelector::Global, &registry, &global),
            "WATCHING: GLOBAL - Seat 4 raise ($30)"
        );
        let seat = ViewSelector::Entity("9".into());
        let empty = project(&[], &seat, ViewWindow::default());
        assert_eq!(
            view_title(&seat, &registry, &empty),
            "WATCHING: SEAT 9 (Seat 9) - Waiting for data..."
        );
    }
}
