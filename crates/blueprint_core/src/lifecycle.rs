//! Data-join lifecycle vocabulary
//!
//! A layer handler is registered under one of eight keys: the four phases
//! `update`, `enter`, `merge`, `exit`, and each of them with a `:transition`
//! suffix. The set is closed.

use std::fmt;
use std::str::FromStr;

use crate::error::{BlueprintError, Result};

/// Suffix marking an animated handler key
pub const TRANSITION_SUFFIX: &str = ":transition";

/// One phase of a data-join, in draw order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Update,
    Enter,
    Merge,
    Exit,
}

impl Phase {
    /// Phases in the order a layer runs them
    pub const ALL: [Phase; 4] = [Phase::Update, Phase::Enter, Phase::Merge, Phase::Exit];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Phase::Update => "update",
            Phase::Enter => "enter",
            Phase::Merge => "merge",
            Phase::Exit => "exit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A valid lifecycle key: a phase, optionally animated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LifecycleEvent {
    pub phase: Phase,
    pub transition: bool,
}

impl LifecycleEvent {
    /// Every valid key: plain phases first, then the `:transition` variants
    pub const ALL: [LifecycleEvent; 8] = [
        LifecycleEvent::plain(Phase::Update),
        LifecycleEvent::plain(Phase::Enter),
        LifecycleEvent::plain(Phase::Merge),
        LifecycleEvent::plain(Phase::Exit),
        LifecycleEvent::animated(Phase::Update),
        LifecycleEvent::animated(Phase::Enter),
        LifecycleEvent::animated(Phase::Merge),
        LifecycleEvent::animated(Phase::Exit),
    ];

    pub const fn plain(phase: Phase) -> Self {
        Self {
            phase,
            transition: false,
        }
    }

    pub const fn animated(phase: Phase) -> Self {
        Self {
            phase,
            transition: true,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match (self.phase, self.transition) {
            (Phase::Update, false) => "update",
            (Phase::Enter, false) => "enter",
            (Phase::Merge, false) => "merge",
            (Phase::Exit, false) => "exit",
            (Phase::Update, true) => "update:transition",
            (Phase::Enter, true) => "enter:transition",
            (Phase::Merge, true) => "merge:transition",
            (Phase::Exit, true) => "exit:transition",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = BlueprintError;

    fn from_str(key: &str) -> Result<Self> {
        assert_lifecycle_event(key)
    }
}

fn lookup(key: &str) -> Option<LifecycleEvent> {
    LifecycleEvent::ALL
        .iter()
        .copied()
        .find(|event| event.as_str() == key)
}

/// `true` if `key` is one of the eight lifecycle keys
pub fn is_valid_lifecycle_event(key: &str) -> bool {
    lookup(key).is_some()
}

/// Parse `key`, failing with a message that lists every valid key
pub fn assert_lifecycle_event(key: &str) -> Result<LifecycleEvent> {
    lookup(key).ok_or_else(|| BlueprintError::InvalidLifecycleEvent {
        key: key.to_string(),
        expected: LifecycleEvent::ALL
            .iter()
            .map(LifecycleEvent::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let names: Vec<_> = Phase::ALL.iter().map(Phase::as_str).collect();
        assert_eq!(names, ["update", "enter", "merge", "exit"]);
    }

    #[test]
    fn test_all_keys_are_valid() {
        for event in LifecycleEvent::ALL {
            assert!(is_valid_lifecycle_event(event.as_str()));
            assert_eq!(assert_lifecycle_event(event.as_str()).unwrap(), event);
        }
        assert_eq!(
            "merge:transition".parse::<LifecycleEvent>().unwrap(),
            LifecycleEvent::animated(Phase::Merge)
        );
        assert!(event_suffix_is_consistent());
    }

    fn event_suffix_is_consistent() -> bool {
        LifecycleEvent::ALL
            .iter()
            .all(|e| e.as_str().ends_with(TRANSITION_SUFFIX) == e.transition)
    }

    #[test]
    fn test_near_misses_are_invalid() {
        for key in [
            "",
            "click",
            "Enter",
            "enter:animate",
            "enter:transition:transition",
            ":transition",
            " update",
        ] {
            assert!(!is_valid_lifecycle_event(key), "{key:?}");
            assert!(assert_lifecycle_event(key).is_err(), "{key:?}");
        }
    }

    #[test]
    fn test_error_lists_valid_keys() {
        let message = assert_lifecycle_event("click").unwrap_err().to_string();
        assert_eq!(
            message,
            "[d3-blueprint] \"click\" is not a valid lifecycle event. Expected one of: \
             update, enter, merge, exit, update:transition, enter:transition, \
             merge:transition, exit:transition"
        );
    }
}
