//! Transition completion signals

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

/// Completion of one scheduled animation.
///
/// Resolves with `Ok` when the animation ran to its end and with `Err` when it
/// was interrupted or dropped by the scheduler.
pub type Completion = Shared<oneshot::Receiver<()>>;

pub(crate) fn completion() -> (oneshot::Sender<()>, Completion) {
    let (tx, rx) = oneshot::channel();
    (tx, rx.shared())
}

/// Resolves once every wrapped completion has resolved.
///
/// Never fails: an interrupted animation counts as finished.
#[must_use = "futures do nothing unless polled"]
pub struct TransitionEnd {
    inner: LocalBoxFuture<'static, ()>,
}

impl TransitionEnd {
    pub fn new<I>(completions: I) -> Self
    where
        I: IntoIterator<Item = Completion>,
    {
        let all = future::join_all(completions);
        Self {
            inner: all.map(|_| ()).boxed_local(),
        }
    }

    /// Join several ends into one
    pub fn all<I>(ends: I) -> Self
    where
        I: IntoIterator<Item = TransitionEnd>,
    {
        let all = future::join_all(ends);
        Self {
            inner: all.map(|_| ()).boxed_local(),
        }
    }

    /// Already resolved, as for an empty selection
    pub fn ready() -> Self {
        Self {
            inner: future::ready(()).boxed_local(),
        }
    }
}

impl Future for TransitionEnd {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for TransitionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEnd").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_end_is_ready() {
        assert_eq!(TransitionEnd::new(Vec::new()).now_or_never(), Some(()));
        assert_eq!(TransitionEnd::ready().now_or_never(), Some(()));
    }

    #[test]
    fn test_end_waits_for_every_completion() {
        let (a_tx, a) = completion();
        let (b_tx, b) = completion();
        let mut end = TransitionEnd::new([a, b]);

        assert!((&mut end).now_or_never().is_none());
        a_tx.send(()).unwrap();
        assert!((&mut end).now_or_never().is_none());
        b_tx.send(()).unwrap();
        assert_eq!(end.now_or_never(), Some(()));
    }

    #[test]
    fn test_dropped_sender_counts_as_finished() {
        let (tx, c) = completion();
        let end = TransitionEnd::new([c.clone(), c]);
        drop(tx);
        assert_eq!(end.now_or_never(), Some(()));
    }
}
