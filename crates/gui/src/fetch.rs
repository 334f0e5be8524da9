#![forbid(unsafe_code)]

use std::future::Future;
use std::sync::mpsc;

use metrics::counter;
use tracing::debug;

/// One in-flight-at-a-time async load owned by a UI component.
///
/// Every [`start`](FetchSlot::start) bumps the generation; [`poll`](FetchSlot::poll)
/// only hands back results tagged with the current generation, and nothing
/// at all once the owner has [`deactivate`](FetchSlot::deactivate)d the slot.
/// Superseded and late results are dropped.
pub struct FetchSlot<T> {
    name: &'static str,
    generation: u64,
    active: bool,
    in_flight: bool,
    tx: mpsc::Sender<(u64, T)>,
    rx: mpsc::Receiver<(u64, T)>,
}

impl<T: Send + 'static> FetchSlot<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { name, generation: 0, active: true, in_flight: false, tx, rx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Spawn `fut` on the current tokio runtime as the newest load.
    pub fn start<F>(&mut self, fut: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.generation += 1;
        self.in_flight = true;
        let generation = self.generation;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let out = fut.await;
            let _ = tx.send((generation, out));
        });
        generation
    }

    /// Newest result of the current generation, if one has arrived.
    pub fn poll(&mut self) -> Option<T> {
        let mut latest = None;
        while let Ok((generation, out)) = self.rx.try_recv() {
            if self.active && generation == self.generation {
                self.in_flight = false;
                latest = Some(out);
            } else {
                debug!(slot = self.name, generation, current = self.generation, active = self.active, "fetch: stale result dropped");
                counter!("ui_stale_results_dropped_total", 1, "slot" => self.name);
            }
        }
        latest
    }

    /// The owner went away: no later result is ever delivered.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn controlled(slot: &mut FetchSlot<&'static str>) -> oneshot::Sender<&'static str> {
        let (tx, rx) = oneshot::channel();
        slot.start(async move { rx.await.unwrap_or("cancelled") });
        tx
    }

    #[tokio::test]
    async fn delivers_current_generation() {
        let mut slot = FetchSlot::new("test");
        let done = controlled(&mut slot);
        assert!(slot.in_flight());
        assert_eq!(slot.poll(), None);
        done.send("a").unwrap();
        settle().await;
        assert_eq!(slot.poll(), Some("a"));
        assert!(!slot.in_flight());
        assert_eq!(slot.poll(), None);
    }

    #[tokio::test]
    async fn superseded_result_is_dropped_even_if_it_finishes_last() {
        let mut slot = FetchSlot::new("test");
        let first = controlled(&mut slot);
        let second = controlled(&mut slot);
        assert_eq!(slot.generation(), 2);

        second.send("new").unwrap();
        settle().await;
        assert_eq!(slot.poll(), Some("new"));

        first.send("old").unwrap();
        settle().await;
        assert_eq!(slot.poll(), None);
    }

    #[tokio::test]
    async fn superseded_result_finishing_first_is_dropped() {
        let mut slot = FetchSlot::new("test");
        let first = controlled(&mut slot);
        let second = controlled(&mut slot);
        first.send("old").unwrap();
        settle().await;
        assert_eq!(slot.poll(), None);
        assert!(slot.in_flight());
        second.send("new").unwrap();
        settle().await;
        assert_eq!(slot.poll(), Some("new"));
    }

    #[tokio::test]
    async fn nothing_is_delivered_after_deactivate() {
        let mut slot = FetchSlot::new("test");
        let done = controlled(&mut slot);
        slot.deactivate();
        done.send("late").unwrap();
        settle().await;
        assert_eq!(slot.poll(), None);
        assert!(!slot.is_active());
    }
}
