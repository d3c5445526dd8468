//! Chart-level events

use std::rc::Rc;

use blueprint_core::EventKind;

use crate::chart::Chart;

/// The three events a chart dispatches per draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartEventKind {
    PreDraw,
    PostDraw,
    PostTransition,
}

impl ChartEventKind {
    pub const ALL: [ChartEventKind; 3] = [
        ChartEventKind::PreDraw,
        ChartEventKind::PostDraw,
        ChartEventKind::PostTransition,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ChartEventKind::PreDraw => "preDraw",
            ChartEventKind::PostDraw => "postDraw",
            ChartEventKind::PostTransition => "postTransition",
        }
    }
}

impl EventKind for ChartEventKind {
    fn parse(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }

    fn all() -> &'static [Self] {
        &Self::ALL
    }
}

/// Payload delivered to chart listeners: the transformed draw data
#[derive(Debug)]
pub enum ChartEvent<'a, D> {
    PreDraw(&'a D),
    PostDraw(&'a D),
    PostTransition(&'a D),
}

impl<'a, D> ChartEvent<'a, D> {
    pub fn kind(&self) -> ChartEventKind {
        match self {
            ChartEvent::PreDraw(_) => ChartEventKind::PreDraw,
            ChartEvent::PostDraw(_) => ChartEventKind::PostDraw,
            ChartEvent::PostTransition(_) => ChartEventKind::PostTransition,
        }
    }

    pub fn data(&self) -> &'a D {
        match self {
            ChartEvent::PreDraw(d) | ChartEvent::PostDraw(d) | ChartEvent::PostTransition(d) => *d,
        }
    }
}

/// A chart event listener
pub type Listener<D> = Rc<dyn Fn(&Chart<D>, &ChartEvent<'_, D>)>;

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::EventName;

    #[test]
    fn test_event_names_parse() {
        let name = EventName::<ChartEventKind>::parse("postDraw.tooltip").unwrap();
        assert_eq!(name.kind, Some(ChartEventKind::PostDraw));
        assert!(EventName::<ChartEventKind>::parse("draw").is_err());
        assert!(EventName::<ChartEventKind>::parse("postdraw").is_err());
    }

    #[test]
    fn test_payload_accessors() {
        let data = vec![1, 2];
        let event = ChartEvent::PostTransition(&data);
        assert_eq!(event.kind(), ChartEventKind::PostTransition);
        assert_eq!(event.data(), &[1, 2]);
    }
}
