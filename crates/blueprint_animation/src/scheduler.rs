//! Animation scheduler
//!
//! Owns every scheduled transition and advances them on each frame. The clock
//! only moves when [`AnimationScheduler::advance`] or
//! [`AnimationScheduler::tick`] is called, which keeps tests deterministic.
//!
//! An animation is scheduled on a `(target, name)` slot. It starts on the first
//! frame at or after its delay; starting interrupts every earlier animation in
//! the same slot. Interrupted animations are dropped without a final frame and
//! their completion resolves as interrupted.

use std::time::{Duration, Instant};

use futures::channel::oneshot;
use slotmap::{new_key_type, SlotMap};

use crate::easing::Easing;
use crate::end::{completion, Completion};

new_key_type! {
    pub struct TransitionId;
}

/// Timing of one animation, read when it starts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub delay: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            duration: Duration::from_millis(250),
            easing: Easing::default(),
        }
    }
}

/// Something the scheduler can drive from start to finish
pub trait Animation {
    fn timing(&self) -> Timing;

    /// Called once on the starting frame, before the first `apply`
    fn start(&mut self) {}

    /// Apply eased progress in 0.0..=1.0
    fn apply(&mut self, t: f64);

    /// Called after the final `apply(1.0)`
    fn finish(&mut self) {}
}

struct Entry {
    target: u64,
    name: String,
    seq: u64,
    scheduled_at: Duration,
    started: Option<Timing>,
    animation: Box<dyn Animation>,
    done: Option<oneshot::Sender<()>>,
}

/// The scheduler that ticks all active transitions
pub struct AnimationScheduler {
    entries: SlotMap<TransitionId, Entry>,
    now: Duration,
    next_seq: u64,
    last_frame: Instant,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            now: Duration::ZERO,
            next_seq: 0,
            last_frame: Instant::now(),
        }
    }

    /// Time elapsed on the scheduler clock
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `animation` in the `(target, name)` slot
    pub fn schedule(
        &mut self,
        target: u64,
        name: &str,
        animation: Box<dyn Animation>,
    ) -> (TransitionId, Completion) {
        let (tx, done) = completion();
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.entries.insert(Entry {
            target,
            name: name.to_string(),
            seq,
            scheduled_at: self.now,
            started: None,
            animation,
            done: Some(tx),
        });
        (id, done)
    }

    /// Drop every animation on `target`, or only those in slot `name`
    pub fn interrupt(&mut self, target: u64, name: Option<&str>) -> usize {
        let doomed: Vec<TransitionId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.target == target && name.map_or(true, |n| e.name == n))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.cancel(*id);
        }
        doomed.len()
    }

    /// Advance the clock by `dt` and step every animation
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;

        let mut order: Vec<(u64, TransitionId)> =
            self.entries.iter().map(|(id, e)| (e.seq, id)).collect();
        order.sort_unstable();

        for (_, id) in order {
            self.step(id);
        }
        tracing::trace!(now = ?self.now, active = self.entries.len(), "animation frame");
    }

    /// Advance by the wall-clock time since the previous tick
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        self.advance(dt);
    }

    pub fn has_active_animations(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn animation_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop every animation; their completions resolve as interrupted
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn step(&mut self, id: TransitionId) {
        let now = self.now;
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };

        let timing = match entry.started {
            Some(timing) => timing,
            None => {
                let timing = entry.animation.timing();
                if now < entry.scheduled_at + timing.delay {
                    return;
                }
                entry.started = Some(timing);
                entry.animation.start();
                let (target, name, seq) = (entry.target, entry.name.clone(), entry.seq);
                self.interrupt_older(target, &name, seq);
                timing
            }
        };

        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        let begin = entry.scheduled_at + timing.delay;
        let elapsed = now.saturating_sub(begin);
        let t = if timing.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / timing.duration.as_secs_f64()).min(1.0)
        };

        entry.animation.apply(timing.easing.apply(t));
        if t >= 1.0 {
            if let Some(mut entry) = self.entries.remove(id) {
                entry.animation.finish();
                if let Some(done) = entry.done.take() {
                    let _ = done.send(());
                }
            }
        }
    }

    fn interrupt_older(&mut self, target: u64, name: &str, seq: u64) {
        let doomed: Vec<TransitionId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.target == target && e.name == name && e.seq < seq)
            .map(|(id, _)| id)
            .collect();
        for id in doomed {
            tracing::debug!(node = target, slot = name, "transition interrupted");
            self.cancel(id);
        }
    }

    fn cancel(&mut self, id: TransitionId) {
        // Dropping the sender resolves the completion as interrupted.
        self.entries.remove(id);
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        started: bool,
        finished: bool,
        frames: Vec<f64>,
    }

    struct Recorder {
        timing: Timing,
        probe: Rc<RefCell<Probe>>,
    }

    impl Animation for Recorder {
        fn timing(&self) -> Timing {
            self.timing
        }

        fn start(&mut self) {
            self.probe.borrow_mut().started = true;
        }

        fn apply(&mut self, t: f64) {
            self.probe.borrow_mut().frames.push(t);
        }

        fn finish(&mut self) {
            self.probe.borrow_mut().finished = true;
        }
    }

    fn recorder(delay_ms: u64, duration_ms: u64) -> (Box<dyn Animation>, Rc<RefCell<Probe>>) {
        let probe = Rc::new(RefCell::new(Probe::default()));
        let animation = Recorder {
            timing: Timing {
                delay: Duration::from_millis(delay_ms),
                duration: Duration::from_millis(duration_ms),
                easing: Easing::Linear,
            },
            probe: probe.clone(),
        };
        (Box::new(animation), probe)
    }

    #[test]
    fn test_runs_to_completion() {
        let mut scheduler = AnimationScheduler::new();
        let (animation, probe) = recorder(0, 100);
        let (_, done) = scheduler.schedule(1, "", animation);

        scheduler.advance(Duration::from_millis(50));
        assert!(probe.borrow().started);
        assert_eq!(probe.borrow().frames, [0.5]);
        assert!(done.clone().now_or_never().is_none());

        scheduler.advance(Duration::from_millis(60));
        assert_eq!(probe.borrow().frames, [0.5, 1.0]);
        assert!(probe.borrow().finished);
        assert_eq!(done.now_or_never(), Some(Ok(())));
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_delay_postpones_start() {
        let mut scheduler = AnimationScheduler::new();
        let (animation, probe) = recorder(100, 100);
        scheduler.schedule(1, "", animation);

        scheduler.advance(Duration::from_millis(50));
        assert!(!probe.borrow().started);

        scheduler.advance(Duration::from_millis(100));
        assert!(probe.borrow().started);
        assert_eq!(probe.borrow().frames, [0.5]);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_frame() {
        let mut scheduler = AnimationScheduler::new();
        let (animation, probe) = recorder(0, 0);
        let (_, done) = scheduler.schedule(1, "", animation);

        scheduler.advance(Duration::ZERO);
        assert_eq!(probe.borrow().frames, [1.0]);
        assert_eq!(done.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn test_newer_animation_interrupts_same_slot() {
        let mut scheduler = AnimationScheduler::new();
        let (first, first_probe) = recorder(0, 100);
        let (_, first_done) = scheduler.schedule(7, "fade", first);
        scheduler.advance(Duration::from_millis(10));

        let (other, other_probe) = recorder(0, 100);
        scheduler.schedule(7, "move", other);
        let (second, _) = recorder(0, 100);
        scheduler.schedule(7, "fade", second);
        scheduler.advance(Duration::from_millis(10));

        assert!(!first_probe.borrow().finished);
        assert!(first_done.now_or_never().unwrap().is_err());
        assert!(other_probe.borrow().started);
        assert_eq!(scheduler.animation_count(), 2);
    }

    #[test]
    fn test_interrupt_and_clear_resolve_completions() {
        let mut scheduler = AnimationScheduler::new();
        let (a, _) = recorder(0, 100);
        let (b, _) = recorder(0, 100);
        let (_, a_done) = scheduler.schedule(1, "", a);
        let (_, b_done) = scheduler.schedule(2, "", b);

        assert_eq!(scheduler.interrupt(1, None), 1);
        assert!(a_done.now_or_never().unwrap().is_err());

        scheduler.clear();
        assert!(b_done.now_or_never().unwrap().is_err());
    }
}
