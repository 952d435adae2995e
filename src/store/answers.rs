use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::models::{AnswerMap, QuizId};

use super::backend::StorageBackend;
use super::answers_key;

/// Quiet period after the last change before the answer map hits storage.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Durable store for one quiz's in-progress answers.
///
/// `schedule_save` hands a snapshot to a writer task that coalesces rapid
/// consecutive saves into a single write once the quiet period elapses.
/// Later snapshots always replace earlier pending ones, and closing the store
/// flushes whatever is still pending, so the last state before shutdown is
/// never dropped.
pub struct AnswerStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
    tx: mpsc::UnboundedSender<String>,
    writer: JoinHandle<()>,
}

impl AnswerStore {
    pub fn new(backend: Arc<dyn StorageBackend>, quiz_id: QuizId) -> Self {
        let key = answers_key(quiz_id);
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(writer_loop(Arc::clone(&backend), key.clone(), rx));
        Self {
            backend,
            key,
            tx,
            writer,
        }
    }

    /// Previously saved answers for this quiz. Absent or malformed payloads
    /// read back as an empty map, never an error.
    pub fn load(&self) -> AnswerMap {
        let Some(payload) = self.backend.read(&self.key) else {
            return AnswerMap::new();
        };
        match serde_json::from_str(&payload) {
            Ok(answers) => answers,
            Err(err) => {
                debug!("discarding malformed payload under {}: {err}", self.key);
                AnswerMap::new()
            }
        }
    }

    /// Queue the current full answer map for a debounced write.
    pub fn schedule_save(&self, answers: &AnswerMap) {
        match serde_json::to_string(answers) {
            // Send failures mean the writer is gone; nothing left to do.
            Ok(payload) => {
                let _ = self.tx.send(payload);
            }
            Err(err) => debug!("failed to encode answers for {}: {err}", self.key),
        }
    }

    /// Write any pending snapshot and stop the writer task.
    pub async fn flush(self) {
        drop(self.tx);
        let _ = self.writer.await;
    }
}

async fn writer_loop(
    backend: Arc<dyn StorageBackend>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(mut payload) = rx.recv().await {
        loop {
            match timeout(DEBOUNCE_WINDOW, rx.recv()).await {
                // A newer snapshot arrived inside the window; it wins.
                Ok(Some(next)) => payload = next,
                // Store closed: flush the pending snapshot and stop.
                Ok(None) => {
                    persist(backend.as_ref(), &key, &payload);
                    return;
                }
                // Quiet period elapsed.
                Err(_) => break,
            }
        }
        persist(backend.as_ref(), &key, &payload);
    }
}

fn persist(backend: &dyn StorageBackend, key: &str, payload: &str) {
    if let Err(err) = backend.write(key, payload) {
        debug!("autosave under {key} failed: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::backend::MemoryBackend;
    use super::*;
    use crate::models::AnswerValue;

    struct CountingBackend {
        inner: MemoryBackend,
        writes: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(),
                writes: AtomicUsize::new(0),
            }
        }
    }

    impl StorageBackend for CountingBackend {
        fn read(&self, key: &str) -> Option<String> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> io::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.write(key, value)
        }
    }

    fn map_with(id: u64, value: &str) -> AnswerMap {
        let mut answers = AnswerMap::new();
        answers.set(id, AnswerValue::from(value));
        answers
    }

    #[tokio::test]
    async fn load_treats_malformed_payload_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("quiz:7:answers", "{not valid json").unwrap();

        let store = AnswerStore::new(backend, 7);
        assert!(store.load().is_empty());
        store.flush().await;
    }

    #[tokio::test]
    async fn load_returns_empty_map_when_nothing_saved() {
        let store = AnswerStore::new(Arc::new(MemoryBackend::new()), 3);
        assert!(store.load().is_empty());
        store.flush().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_saves_coalesce_into_one_write_with_last_state() {
        let backend = Arc::new(CountingBackend::new());
        let store = AnswerStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>, 9);

        store.schedule_save(&map_with(1, "a"));
        store.schedule_save(&map_with(1, "ab"));
        store.schedule_save(&map_with(1, "abc"));

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
        let stored: AnswerMap =
            serde_json::from_str(&backend.read("quiz:9:answers").unwrap()).unwrap();
        assert_eq!(stored, map_with(1, "abc"));
        store.flush().await;
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_pending_snapshot_before_the_window_elapses() {
        let backend = Arc::new(CountingBackend::new());
        let store = AnswerStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>, 4);

        store.schedule_save(&map_with(2, "final"));
        store.flush().await;

        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
        let stored: AnswerMap =
            serde_json::from_str(&backend.read("quiz:4:answers").unwrap()).unwrap();
        assert_eq!(stored, map_with(2, "final"));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_quiet_periods_produce_separate_writes() {
        let backend = Arc::new(CountingBackend::new());
        let store = AnswerStore::new(Arc::clone(&backend) as Arc<dyn StorageBackend>, 5);

        store.schedule_save(&map_with(1, "first"));
        tokio::time::sleep(Duration::from_millis(400)).await;
        store.schedule_save(&map_with(1, "second"));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
        store.flush().await;
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        struct FailingBackend;
        impl StorageBackend for FailingBackend {
            fn read(&self, _key: &str) -> Option<String> {
                None
            }
            fn write(&self, _key: &str, _value: &str) -> io::Result<()> {
                Err(io::Error::other("quota exceeded"))
            }
        }

        let store = AnswerStore::new(Arc::new(FailingBackend), 1);
        store.schedule_save(&map_with(1, "x"));
        // Flush must complete despite the backend refusing every write.
        store.flush().await;
    }
}
