//! The four draw phases of a layer

use blueprint_animation::TransitionEnd;
use blueprint_core::{LifecycleEvent, Phase};
use blueprint_scene::{Join, Selection};

use crate::layer::{Handler, HandlerMap};

/// Completion of every transition a layer draw started. Never fails.
pub type LayerTransitions = TransitionEnd;

/// Selections handed to each phase's handlers
#[derive(Clone, Debug)]
pub struct PhaseSelections {
    /// Nodes matched to data
    pub update: Selection,
    /// Nodes just created for entering data
    pub enter: Selection,
    /// Entered and updated nodes, in data order
    pub merge: Selection,
    /// Nodes whose data disappeared
    pub exit: Selection,
}

impl PhaseSelections {
    /// Build from a join whose enter nodes were materialized as `entered`
    pub fn new(join: &Join, entered: Selection) -> Self {
        Self {
            update: join.update(),
            merge: join.merge_entered(&entered),
            enter: entered,
            exit: join.exit(),
        }
    }

    pub fn get(&self, phase: Phase) -> &Selection {
        match phase {
            Phase::Update => &self.update,
            Phase::Enter => &self.enter,
            Phase::Merge => &self.merge,
            Phase::Exit => &self.exit,
        }
    }
}

/// Run every handler phase by phase and collect transition completions.
///
/// Within a phase plain handlers run first, then each transition handler gets
/// a fresh transition over the phase selection.
pub(crate) fn run_phases(selections: &PhaseSelections, handlers: &HandlerMap) -> LayerTransitions {
    let mut ends = Vec::new();

    for phase in Phase::ALL {
        let selection = selections.get(phase);

        for handler in handlers
            .get(&LifecycleEvent::plain(phase))
            .into_iter()
            .flatten()
        {
            if let Handler::Phase(f) = handler {
                f(selection);
            }
        }

        for handler in handlers
            .get(&LifecycleEvent::animated(phase))
            .into_iter()
            .flatten()
        {
            if let Handler::Transition(f) = handler {
                let transition = selection.transition();
                f(&transition);
                ends.push(transition.end());
            }
        }
    }

    TransitionEnd::all(ends)
}
