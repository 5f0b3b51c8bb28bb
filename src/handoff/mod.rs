//! Ordered handoff between pipeline stages.
//!
//! - [`Handoff`] - FIFO channel with `finished` / `failed` terminal flags
//! - [`Sink`] / [`Signal`] - What a producing stage needs from its downstream
//!
//! Each handoff has exactly one producer and one consumer, so FIFO order on
//! every handoff is enough to keep blocks and checksums in file order.

mod queue;

pub use queue::{Handoff, Next, Terminal};

/// Accepts items in production order.
pub trait Sink<T> {
    /// Hands one item downstream.
    fn push(&self, item: T);

    /// Returns true once downstream no longer accepts items.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Terminal signals a producer raises exactly once per run.
pub trait Signal {
    /// No more items will be pushed.
    fn finish(&self);

    /// The run is aborted; anything not yet consumed is void.
    fn fail(&self);
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &S {
    fn push(&self, item: T) {
        (**self).push(item)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<S: Signal + ?Sized> Signal for &S {
    fn finish(&self) {
        (**self).finish()
    }

    fn fail(&self) {
        (**self).fail()
    }
}
