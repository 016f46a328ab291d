//! Bounded per-session outbound queue.
//!
//! Producers never wait: when the queue is full the oldest buffered message
//! is dropped to make room. A single writer task drains the queue with
//! [`Outbox::next`] until the outbox is closed and empty.

use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// Rendered message shared by every queue it was fanned out to.
pub type Message = Arc<str>;

#[derive(Debug, Clone)]
pub struct Outbox {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    label: String,
    capacity: usize,
    queue: Mutex<VecDeque<Message>>,
    ready: Notify,
    closed_signal: Notify,
    closed: AtomicBool,
    dropped: AtomicU64,
}

impl Outbox {
    pub fn new(label: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                label: label.into(),
                capacity,
                queue: Mutex::new(VecDeque::with_capacity(capacity)),
                ready: Notify::new(),
                closed_signal: Notify::new(),
                closed: AtomicBool::new(false),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Enqueues a message, evicting the oldest one if the queue is full.
    ///
    /// Returns false if the outbox is already closed.
    pub fn push(&self, message: Message) -> bool {
        if self.is_closed() {
            return false;
        }

        {
            let mut queue = self.lock();
            if queue.len() >= self.inner.capacity {
                queue.pop_front();
                let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped == 1 {
                    warn!(
                        "Outbox for {} is full, dropping oldest messages",
                        self.inner.label
                    );
                } else {
                    debug!("Outbox for {} dropped message #{}", self.inner.label, dropped);
                }
            }
            queue.push_back(message);
        }

        self.inner.ready.notify_one();
        true
    }

    /// Waits for the next message. Returns `None` once closed and drained.
    pub async fn next(&self) -> Option<Message> {
        loop {
            if let Some(message) = self.try_next() {
                return Some(message);
            }
            if self.is_closed() {
                // A push may have raced the close.
                return self.try_next();
            }
            self.inner.ready.notified().await;
        }
    }

    /// Pops the next message without waiting.
    pub fn try_next(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    /// Stops accepting messages. Already queued messages are still drained.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            self.inner.ready.notify_one();
            self.inner.closed_signal.notify_waiters();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Resolves once [`Outbox::close`] has been called.
    pub async fn closed(&self) {
        loop {
            let notified = self.inner.closed_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of messages evicted because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        // The queue holds plain data, so a poisoned lock is still usable.
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
