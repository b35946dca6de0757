//! Bounded parallel fan-out with optional order restoration.
//!
//! [`FanOut`] pulls items from an upstream iterator on the consuming thread and hands each one
//! to a [`WorkerPool`] task. At most `window` items are in flight at a time, counting results
//! held back for reordering, so memory stays bounded no matter how long the input is.
//!
//! - **Unordered**: results are yielded in completion order.
//! - **Ordered**: results wait in a [`ReorderBuffer`] until every earlier item has been yielded.

use crate::error::ConfigError;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-flight items allowed per worker thread.
pub const IN_FLIGHT_PER_WORKER: usize = 2;

/// Fixed-size thread pool used for row work.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    degree: usize,
}

impl WorkerPool {
    /// # Errors
    /// [`ConfigError::InvalidOptions`] for `degree == 0`, [`ConfigError::ThreadPool`] if the
    /// threads cannot be started.
    pub fn new(degree: usize) -> Result<Self, ConfigError> {
        if degree == 0 {
            return Err(ConfigError::InvalidOptions {
                reason: "degree_of_parallelism must be at least 1".into(),
            });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(degree)
            .thread_name(|i| format!("csvbeam-worker-{i}"))
            .build()?;
        debug!(degree, "started worker pool");
        Ok(Self { pool, degree })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    fn spawn<F: FnOnce() + Send + 'static>(&self, task: F) {
        self.pool.spawn(task);
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Holds out-of-order results until the next expected sequence number arrives.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    next: u64,
    pending: BTreeMap<u64, T>,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self {
            next: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, seq: u64, item: T) {
        self.pending.insert(seq, item);
    }

    /// Pop the item with the next expected sequence number, if it has arrived.
    pub fn pop_ready(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

type Task<T, O> = Arc<dyn Fn(T) -> Option<O> + Send + Sync>;

/// Task output, or the payload of a panic raised by the task.
type Slot<O> = std::thread::Result<Option<O>>;

/// Iterator running `task` over upstream items on a [`WorkerPool`].
///
/// A task returning `None` produces no output. Once cancelled, no new items are dispatched;
/// tasks that have not started yet skip their work, and results already computed are still
/// yielded.
///
/// A panic inside `task` is caught on the worker and resumed on the consuming thread by the
/// `next` call that receives it; the stream is cancelled first.
pub struct FanOut<'a, T, O> {
    upstream: Box<dyn Iterator<Item = T> + 'a>,
    task: Task<T, O>,
    pool: Arc<WorkerPool>,
    tx: Sender<(u64, Slot<O>)>,
    rx: Receiver<(u64, Slot<O>)>,
    reorder: Option<ReorderBuffer<Option<O>>>,
    cancel: CancelToken,
    window: usize,
    next_seq: u64,
    in_flight: usize,
    exhausted: bool,
}

impl<T, O> FanOut<'_, T, O> {
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Items dispatched but not yet yielded or discarded.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether upstream has been fully consumed and nothing remains in flight.
    pub fn is_done(&self) -> bool {
        (self.exhausted || self.cancel.is_cancelled()) && self.in_flight == 0
    }
}

impl<'a, T, O> FanOut<'a, T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    pub fn new<I, F>(upstream: I, task: F, pool: Arc<WorkerPool>, keep_order: bool) -> Self
    where
        I: Iterator<Item = T> + 'a,
        F: Fn(T) -> Option<O> + Send + Sync + 'static,
    {
        let window = pool.degree() * IN_FLIGHT_PER_WORKER;
        let (tx, rx) = bounded(window);
        Self {
            upstream: Box::new(upstream),
            task: Arc::new(task),
            pool,
            tx,
            rx,
            reorder: keep_order.then(ReorderBuffer::new),
            cancel: CancelToken::new(),
            window,
            next_seq: 0,
            in_flight: 0,
            exhausted: false,
        }
    }

    fn fill(&mut self) {
        while !self.exhausted && self.in_flight < self.window && !self.cancel.is_cancelled() {
            let Some(item) = self.upstream.next() else {
                self.exhausted = true;
                break;
            };
            let seq = self.next_seq;
            self.next_seq += 1;
            self.in_flight += 1;

            let task = Arc::clone(&self.task);
            let tx = self.tx.clone();
            let cancel = self.cancel.clone();
            self.pool.spawn(move || {
                let out = if cancel.is_cancelled() {
                    Ok(None)
                } else {
                    panic::catch_unwind(AssertUnwindSafe(|| task(item)))
                };
                // The receiver is gone once the consumer drops the stream.
                let _ = tx.send((seq, out));
            });
        }
    }
}

impl<T, O> Iterator for FanOut<'_, T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    type Item = O;

    fn next(&mut self) -> Option<O> {
        loop {
            self.fill();

            if let Some(buffer) = self.reorder.as_mut() {
                if let Some(slot) = buffer.pop_ready() {
                    self.in_flight -= 1;
                    match slot {
                        Some(out) => return Some(out),
                        None => continue,
                    }
                }
            }

            if self.in_flight == 0 {
                return None;
            }

            let (seq, out) = self.rx.recv().ok()?;
            let out = match out {
                Ok(out) => out,
                Err(payload) => {
                    self.in_flight -= 1;
                    self.cancel.cancel();
                    panic::resume_unwind(payload);
                }
            };
            match self.reorder.as_mut() {
                Some(buffer) => buffer.insert(seq, out),
                None => {
                    self.in_flight -= 1;
                    if let Some(out) = out {
                        return Some(out);
                    }
                }
            }
        }
    }
}

impl<T, O> Drop for FanOut<'_, T, O> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
