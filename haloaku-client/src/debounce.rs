use haloaku_common::util::PositiveDuration;
use std::num::NonZeroU64;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::debug;

pub const SEARCH_QUIET_PERIOD: PositiveDuration =
    PositiveDuration::from_millis(NonZeroU64::new(300).unwrap());

/// Delivers a pushed value once no newer value was pushed for the quiet
/// period.
///
/// Only the timer is cancelled by a newer push. Work started for an earlier
/// settled value keeps running.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: PositiveDuration,
    pending: Option<JoinHandle<()>>,
    settled: UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(quiet: PositiveDuration) -> (Self, UnboundedReceiver<T>) {
        let (settled, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            quiet,
            pending: None,
            settled,
        };

        (debouncer, receiver)
    }

    #[must_use]
    pub fn for_search() -> (Self, UnboundedReceiver<T>) {
        Self::new(SEARCH_QUIET_PERIOD)
    }

    /// Must be called from within a Tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();

        let settled = self.settled.clone();
        let quiet = self.quiet.get();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if settled.send(value).is_err() {
                debug!("Debounced value settled after its receiver was dropped");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    #[must_use]
    pub fn quiet_period(&self) -> PositiveDuration {
        self.quiet
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
