//! Write coalescing over a [`KeyValueStore`].
//!
//! Writes land in a pending buffer and a single timer thread flushes the whole
//! buffer once no write has happened for `delay`. Reads see pending values
//! first. Dropping the storage flushes whatever is still pending.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::backend::KeyValueStore;

/// `None` is a tombstone: the key is deleted on flush.
type Pending = HashMap<String, Option<String>>;

#[derive(Debug)]
enum TimerCmd {
    /// (Re)start the flush countdown.
    Restart,
    /// Forget the countdown; the caller flushed already.
    Cancel,
    Quit,
}

struct Shared {
    pending: Mutex<Pending>,
    backend: Mutex<Box<dyn KeyValueStore>>,
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Shared {
    /// Write every pending entry to the backend and clear the buffer.
    ///
    /// The backend lock is taken before the buffer is drained so two flushes
    /// can never apply their batches out of order.
    fn flush(&self) -> usize {
        let mut backend = lock(&self.backend);
        let batch = std::mem::take(&mut *lock(&self.pending));
        let count = batch.len();

        for (key, value) in batch {
            let result = match value.as_deref() {
                Some(v) => backend.set(&key, v),
                None => backend.remove(&key),
            };
            if let Err(e) = result {
                warn!(key = %key, error = %e, "failed to flush persisted value");
            }
        }

        if count > 0 {
            debug!(entries = count, "flushed pending writes");
        }
        count
    }
}

fn spawn_timer_thread(shared: Arc<Shared>, rx: Receiver<TimerCmd>, delay: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut deadline: Option<Instant> = None;

        loop {
            let cmd = match deadline {
                None => match rx.recv() {
                    Ok(cmd) => cmd,
                    Err(_) => break,
                },
                Some(at) => {
                    let wait = at.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(wait) {
                        Ok(cmd) => cmd,
                        Err(RecvTimeoutError::Timeout) => {
                            shared.flush();
                            deadline = None;
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            };

            match cmd {
                TimerCmd::Restart => deadline = Some(Instant::now() + delay),
                TimerCmd::Cancel => deadline = None,
                TimerCmd::Quit => break,
            }
        }
    })
}

pub struct ThrottledStorage {
    shared: Arc<Shared>,
    tx: Sender<TimerCmd>,
    join: Option<JoinHandle<()>>,
}

impl ThrottledStorage {
    pub fn new(backend: impl KeyValueStore + 'static, delay: Duration) -> Self {
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            backend: Mutex::new(Box::new(backend)),
        });
        let (tx, rx) = mpsc::channel::<TimerCmd>();
        let join = spawn_timer_thread(shared.clone(), rx, delay);

        Self {
            shared,
            tx,
            join: Some(join),
        }
    }

    /// Read a value, preferring one that is still waiting to be flushed.
    pub fn get_item(&self, key: &str) -> Option<String> {
        if let Some(pending) = lock(&self.shared.pending).get(key) {
            return pending.clone();
        }

        match lock(&self.shared.backend).get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to read persisted value");
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        lock(&self.shared.pending).insert(key.to_string(), Some(value.into()));
        self.restart_timer();
    }

    pub fn remove_item(&self, key: &str) {
        lock(&self.shared.pending).insert(key.to_string(), None);
        self.restart_timer();
    }

    /// Number of keys waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        lock(&self.shared.pending).len()
    }

    /// Cancel the countdown and write everything pending right now.
    pub fn force_flush(&self) {
        let _ = self.tx.send(TimerCmd::Cancel);
        self.shared.flush();
    }

    fn restart_timer(&self) {
        if self.tx.send(TimerCmd::Restart).is_err() {
            // Timer thread is gone; do not let the write sit in the buffer.
            self.shared.flush();
        }
    }
}

impl Drop for ThrottledStorage {
    fn drop(&mut self) {
        self.force_flush();
        let _ = self.tx.send(TimerCmd::Quit);
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}
