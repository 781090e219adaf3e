//! In-memory record list shared by the CRUD, predict and stream endpoints

use std::sync::Arc;

use shared::models::{WeatherInput, WeatherRecord};
use tokio::sync::{broadcast, RwLock};

use crate::error::{AppError, AppResult};

/// A change applied to the record list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEvent {
    Created { index: usize },
    Updated { index: usize },
    Deleted { index: usize },
}

/// Process-wide record list addressed by position.
///
/// Each operation holds the lock for its whole read-check-write, so a bounds
/// check can never be invalidated by a concurrent mutation before it applies.
#[derive(Clone)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<WeatherRecord>>>,
    events: broadcast::Sender<RecordEvent>,
}

impl RecordStore {
    pub fn new(channel_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            events,
        }
    }

    /// Receive a [`RecordEvent`] after every mutation
    pub fn subscribe(&self) -> broadcast::Receiver<RecordEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the list in insertion order
    pub async fn list(&self) -> Vec<WeatherRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Append a client-submitted record
    pub async fn create(&self, input: WeatherInput) -> WeatherRecord {
        self.append(WeatherRecord::observed(input)).await
    }

    /// Append any record, returning the stored copy
    pub async fn append(&self, record: WeatherRecord) -> WeatherRecord {
        let mut records = self.records.write().await;
        records.push(record.clone());
        self.notify(RecordEvent::Created {
            index: records.len() - 1,
        });
        record
    }

    /// Replace the record at `index`; the previous prediction label is discarded
    pub async fn update(&self, index: i64, input: WeatherInput) -> AppResult<WeatherRecord> {
        let mut records = self.records.write().await;
        let index = checked_index(index, records.len())?;
        let record = WeatherRecord::observed(input);
        records[index] = record.clone();
        self.notify(RecordEvent::Updated { index });
        Ok(record)
    }

    /// Remove and return the record at `index`
    pub async fn delete(&self, index: i64) -> AppResult<WeatherRecord> {
        let mut records = self.records.write().await;
        let index = checked_index(index, records.len())?;
        let removed = records.remove(index);
        self.notify(RecordEvent::Deleted { index });
        Ok(removed)
    }

    fn notify(&self, event: RecordEvent) {
        // Err only means nobody is subscribed right now
        if self.events.send(event).is_err() {
            tracing::trace!(?event, "No record stream subscribers");
        }
    }
}

fn checked_index(index: i64, len: usize) -> AppResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&idx| idx < len)
        .ok_or_else(|| AppError::NotFound("Data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(seed: f64) -> WeatherInput {
        WeatherInput::new(seed, seed - 1.0, seed * 2.0, seed / 10.0)
    }

    async fn store_with(n: usize) -> RecordStore {
        let store = RecordStore::new(16);
        for i in 0..n {
            store.create(input(i as f64)).await;
        }
        store
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let store = RecordStore::new(4);
        assert!(store.is_empty().await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_appends_in_order() {
        let store = store_with(3).await;
        let records = store.list().await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].input, input(2.0));
        assert!(records.iter().all(|r| r.prediction.is_none()));
    }

    #[tokio::test]
    async fn test_update_drops_prediction() {
        let store = RecordStore::new(4);
        store
            .append(WeatherRecord::predicted(input(1.0), "Fog"))
            .await;

        let updated = store.update(0, input(9.0)).await.unwrap();

        assert_eq!(updated.prediction, None);
        assert_eq!(store.list().await[0], updated);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_not_found() {
        let store = store_with(2).await;

        assert!(matches!(store.delete(2).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.delete(-1).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            store.update(i64::MAX, input(0.0)).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_mutations_are_broadcast() {
        let store = RecordStore::new(8);
        let mut events = store.subscribe();

        store.create(input(1.0)).await;
        store.create(input(2.0)).await;
        store.update(1, input(3.0)).await.unwrap();
        store.delete(0).await.unwrap();

        assert_eq!(events.recv().await.unwrap(), RecordEvent::Created { index: 0 });
        assert_eq!(events.recv().await.unwrap(), RecordEvent::Created { index: 1 });
        assert_eq!(events.recv().await.unwrap(), RecordEvent::Updated { index: 1 });
        assert_eq!(events.recv().await.unwrap(), RecordEvent::Deleted { index: 0 });
    }

    #[tokio::test]
    async fn test_failed_mutation_is_not_broadcast() {
        let store = RecordStore::new(8);
        let mut events = store.subscribe();

        assert!(store.delete(0).await.is_err());

        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// update(i, data) followed by list() shows list()[i] == data
        #[test]
        fn prop_update_then_list(len in 1usize..20, pick in any::<prop::sample::Index>(), value in -50.0f64..50.0) {
            tokio_test::block_on(async {
                let store = store_with(len).await;
                let idx = pick.index(len);

                let updated = store.update(idx as i64, input(value)).await.unwrap();
                let records = store.list().await;

                assert_eq!(records.len(), len);
                assert_eq!(records[idx], updated);
                assert_eq!(records[idx].input, input(value));
            });
        }

        /// delete(i) shrinks the list by one and returns the former element i
        #[test]
        fn prop_delete_returns_element(len in 1usize..20, pick in any::<prop::sample::Index>()) {
            tokio_test::block_on(async {
                let store = store_with(len).await;
                let idx = pick.index(len);
                let before = store.list().await;

                let removed = store.delete(idx as i64).await.unwrap();

                assert_eq!(removed, before[idx]);
                assert_eq!(store.len().await, len - 1);
            });
        }

        /// Any index outside [0, len) is NotFound and leaves the list untouched
        #[test]
        fn prop_out_of_range_never_mutates(len in 0usize..10, index in any::<i64>()) {
            prop_assume!(index < 0 || index >= len as i64);
            tokio_test::block_on(async {
                let store = store_with(len).await;

                assert!(matches!(store.delete(index).await, Err(AppError::NotFound(_))));
                assert!(matches!(store.update(index, input(1.0)).await, Err(AppError::NotFound(_))));
                assert_eq!(store.len().await, len);
            });
        }
    }
}
