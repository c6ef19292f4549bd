use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// One write to the shared project count.
///
/// Three components write the count independently and nothing orders their
/// writes, so whichever update lands last determines the displayed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountUpdate {
    /// The dashboard fetched the aggregate count.
    Fetched(u64),
    /// The project list fetched its working set of this length.
    Listed(usize),
    /// The form created one project.
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    Initial,
    Dashboard,
    ProjectList,
    ProjectForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSnapshot {
    pub value: u64,
    pub source: CountSource,
}

impl CountSnapshot {
    pub fn apply(self, update: CountUpdate) -> Self {
        match update {
            CountUpdate::Fetched(value) => Self {
                value,
                source: CountSource::Dashboard,
            },
            CountUpdate::Listed(len) => Self {
                value: len as u64,
                source: CountSource::ProjectList,
            },
            CountUpdate::Created => Self {
                value: self.value.saturating_add(1),
                source: CountSource::ProjectForm,
            },
        }
    }
}

impl Default for CountSnapshot {
    fn default() -> Self {
        Self {
            value: 0,
            source: CountSource::Initial,
        }
    }
}

/// Shared count slot held by the shell and handed to every writer.
#[derive(Clone)]
pub struct CountSlot {
    tx: Arc<watch::Sender<CountSnapshot>>,
}

impl CountSlot {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CountSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn apply(&self, update: CountUpdate) -> CountSnapshot {
        let mut applied = CountSnapshot::default();
        self.tx.send_modify(|snapshot| {
            *snapshot = snapshot.apply(update);
            applied = *snapshot;
        });
        debug!(?update, value = applied.value, "count: slot updated");
        applied
    }

    pub fn value(&self) -> u64 {
        self.tx.borrow().value
    }

    pub fn snapshot(&self) -> CountSnapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountSnapshot> {
        self.tx.subscribe()
    }
}

impl Default for CountSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwriting_writers_replace_and_form_increments() {
        let slot = CountSlot::new();

        slot.apply(CountUpdate::Fetched(5));
        assert_eq!(slot.value(), 5);

        slot.apply(CountUpdate::Listed(2));
        assert_eq!(slot.snapshot().source, CountSource::ProjectList);
        assert_eq!(slot.value(), 2);

        let after_create = slot.apply(CountUpdate::Created);
        assert_eq!(after_create.value, 3);
        assert_eq!(after_create.source, CountSource::ProjectForm);
    }

    #[test]
    fn last_writer_wins_regardless_of_source() {
        let slot = CountSlot::new();
        slot.apply(CountUpdate::Listed(4));
        slot.apply(CountUpdate::Created);
        slot.apply(CountUpdate::Fetched(1));

        assert_eq!(slot.value(), 1);
        assert_eq!(slot.snapshot().source, CountSource::Dashboard);
    }

    #[tokio::test]
    async fn subscribers_observe_updates() {
        let slot = CountSlot::new();
        let mut rx = slot.subscribe();

        slot.apply(CountUpdate::Fetched(9));

        rx.changed().await.expect("slot dropped");
        assert_eq!(rx.borrow().value, 9);
    }
}
