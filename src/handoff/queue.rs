//! Channel-backed handoff with terminal flags.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, select, unbounded};

use super::{Signal, Sink};

/// Result of a blocking [`Handoff::pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next<T> {
    /// The oldest queued item.
    Item(T),
    /// The producer finished and the queue is drained.
    Finished,
    /// The run failed; queued items were discarded.
    Failed,
}

/// Result of a blocking [`Handoff::wait_terminal`].
#[derive(Debug, PartialEq, Eq)]
pub enum Terminal<T> {
    /// The producer finished; every item it pushed, in order.
    Finished(VecDeque<T>),
    /// The run failed.
    Failed,
}

/// An unbounded FIFO handoff between one producer and one consumer.
///
/// Items travel over an unbounded channel. The two terminal flags live
/// beside it and are one-way: once set they stay set. Raising either flag
/// also sends a wakeup on a second channel, so a consumer blocked in
/// [`pop`](Handoff::pop) or [`wait_terminal`](Handoff::wait_terminal) sees
/// it without polling. `failed` wins over everything else: a consumer that
/// observes it stops without draining what is still queued.
///
/// # Example
///
/// ```
/// use blocksig::handoff::{Handoff, Next, Signal, Sink};
///
/// let handoff = Handoff::new();
/// handoff.push(1);
/// handoff.push(2);
/// handoff.finish();
///
/// assert_eq!(handoff.pop(), Next::Item(1));
/// assert_eq!(handoff.pop(), Next::Item(2));
/// assert_eq!(handoff.pop(), Next::Finished);
/// ```
pub struct Handoff<T> {
    items_tx: Sender<T>,
    items_rx: Receiver<T>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    finished: AtomicBool,
    failed: AtomicBool,
}

impl<T> Handoff<T> {
    /// Creates an empty, open handoff.
    pub fn new() -> Self {
        let (items_tx, items_rx) = unbounded();
        let (wake_tx, wake_rx) = unbounded();
        Self {
            items_tx,
            items_rx,
            wake_tx,
            wake_rx,
            finished: AtomicBool::new(false),
            failed: AtomicBool::new(false),
        }
    }

    /// Takes the next item, blocking until one is available or the
    /// handoff reaches a terminal state.
    pub fn pop(&self) -> Next<T> {
        loop {
            if self.is_failed() {
                self.discard();
                return Next::Failed;
            }
            if let Ok(item) = self.items_rx.try_recv() {
                return Next::Item(item);
            }
            if self.is_finished() {
                // Items pushed before `finish` are already in the channel.
                return match self.items_rx.try_recv() {
                    Ok(item) => Next::Item(item),
                    Err(_) => Next::Finished,
                };
            }

            select! {
                recv(self.items_rx) -> item => match item {
                    Ok(_) if self.is_failed() => {
                        self.discard();
                        return Next::Failed;
                    }
                    Ok(item) => return Next::Item(item),
                    // Unreachable while `self` holds a sender.
                    Err(_) => return Next::Finished,
                },
                recv(self.wake_rx) -> _ => {}
            }
        }
    }

    /// Blocks until the handoff is finished or failed, then takes
    /// everything that was pushed.
    pub fn wait_terminal(&self) -> Terminal<T> {
        loop {
            if self.is_failed() {
                self.discard();
                return Terminal::Failed;
            }
            if self.is_finished() {
                return Terminal::Finished(self.items_rx.try_iter().collect());
            }
            let _ = self.wake_rx.recv();
        }
    }

    /// Returns true once the run has failed.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Returns true once the producer has finished.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Number of items waiting to be consumed.
    pub fn len(&self) -> usize {
        self.items_rx.len()
    }

    /// Returns true if no items are waiting.
    pub fn is_empty(&self) -> bool {
        self.items_rx.is_empty()
    }

    fn discard(&self) {
        while self.items_rx.try_recv().is_ok() {}
    }

    fn wake(&self) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.wake_tx.send(());
    }
}

impl<T> Sink<T> for Handoff<T> {
    fn push(&self, item: T) {
        if self.is_failed() {
            return;
        }
        let _ = self.items_tx.send(item);
    }

    fn is_closed(&self) -> bool {
        self.is_failed()
    }
}

impl<T> Signal for Handoff<T> {
    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
        self.wake();
    }

    fn fail(&self) {
        self.failed.store(true, Ordering::Release);
        self.discard();
        self.wake();
    }
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Handoff<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handoff")
            .field("queued", &self.len())
            .field("finished", &self.is_finished())
            .field("failed", &self.is_failed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let handoff = Handoff::new();
        for i in 0..5 {
            handoff.push(i);
        }
        handoff.finish();

        for i in 0..5 {
            assert_eq!(handoff.pop(), Next::Item(i));
        }
        assert_eq!(handoff.pop(), Next::Finished);
        assert_eq!(handoff.pop(), Next::Finished);
    }

    #[test]
    fn test_finish_drains_before_reporting() {
        let handoff = Handoff::new();
        handoff.push("a");
        handoff.finish();

        assert!(handoff.is_finished());
        assert_eq!(handoff.pop(), Next::Item("a"));
        assert_eq!(handoff.pop(), Next::Finished);
    }

    #[test]
    fn test_failure_discards_queue() {
        let handoff = Handoff::new();
        handoff.push(1);
        handoff.push(2);
        handoff.fail();

        assert!(handoff.is_empty());
        assert_eq!(handoff.pop(), Next::Failed);
    }

    #[test]
    fn test_push_after_failure_is_dropped() {
        let handoff = Handoff::new();
        handoff.fail();
        handoff.push(1);

        assert_eq!(handoff.len(), 0);
        assert_eq!(handoff.pop(), Next::Failed);
    }

    #[test]
    fn test_flags_are_monotone() {
        let handoff: Handoff<u8> = Handoff::new();
        handoff.finish();
        handoff.fail();
        handoff.finish();

        assert!(handoff.is_finished());
        assert!(handoff.is_failed());
        assert_eq!(handoff.pop(), Next::Failed);
    }

    #[test]
    fn test_failure_overrides_finish() {
        let handoff = Handoff::new();
        handoff.push(1);
        handoff.finish();
        handoff.fail();

        assert_eq!(handoff.wait_terminal(), Terminal::Failed);
    }

    #[test]
    fn test_wait_terminal_collects_in_order() {
        let handoff = Handoff::new();
        handoff.push(3);
        handoff.push(1);
        handoff.push(2);
        handoff.finish();

        match handoff.wait_terminal() {
            Terminal::Finished(items) => assert_eq!(Vec::from(items), vec![3, 1, 2]),
            Terminal::Failed => panic!("expected finished"),
        }
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let handoff = Handoff::new();

        thread::scope(|s| {
            let consumer = s.spawn(|| handoff.pop());
            thread::sleep(Duration::from_millis(20));
            handoff.push(42);
            assert_eq!(consumer.join().unwrap(), Next::Item(42));
        });
    }

    #[test]
    fn test_fail_wakes_waiting_consumer() {
        let handoff: Handoff<u32> = Handoff::new();

        thread::scope(|s| {
            let consumer = s.spawn(|| handoff.wait_terminal());
            thread::sleep(Duration::from_millis(20));
            handoff.fail();
            assert_eq!(consumer.join().unwrap(), Terminal::Failed);
        });
    }

    #[test]
    fn test_fail_wakes_blocked_pop() {
        let handoff: Handoff<u32> = Handoff::new();

        thread::scope(|s| {
            let consumer = s.spawn(|| handoff.pop());
            thread::sleep(Duration::from_millis(20));
            handoff.fail();
            assert_eq!(consumer.join().unwrap(), Next::Failed);
        });
    }

    #[test]
    fn test_finish_wakes_blocked_pop() {
        let handoff: Handoff<u32> = Handoff::new();

        thread::scope(|s| {
            let consumer = s.spawn(|| handoff.pop());
            thread::sleep(Duration::from_millis(20));
            handoff.finish();
            assert_eq!(consumer.join().unwrap(), Next::Finished);
        });
    }

    #[test]
    fn test_failure_preempts_items_queued_before_it() {
        let handoff = Handoff::new();
        for i in 0..100u32 {
            handoff.push(i);
        }
        handoff.finish();
        handoff.fail();

        assert_eq!(handoff.pop(), Next::Failed);
        assert_eq!(handoff.len(), 0);
        assert_eq!(handoff.wait_terminal(), Terminal::Failed);
    }

    #[test]
    fn test_concurrent_producer_keeps_order() {
        let handoff = Handoff::new();

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..10_000u32 {
                    handoff.push(i);
                }
                handoff.finish();
            });

            let mut expected = 0u32;
            while let Next::Item(i) = handoff.pop() {
                assert_eq!(i, expected);
                expected += 1;
            }
            assert_eq!(expected, 10_000);
        });
    }
}
