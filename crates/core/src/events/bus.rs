// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for routing events to subscribers
//!
//! Publication never blocks on a subscriber: every subscriber sits behind a
//! bounded channel and is skipped when its queue is full. Callbacks are
//! drained by a dedicated worker thread behind a panic guard. Async handlers
//! run on their own tokio task with a timeout.

use super::subscription::{EventFilter, SubscriberId, Subscription};
use crate::event::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Sender for event delivery
pub type EventSender = mpsc::Sender<Arc<Event>>;
/// Receiver for event delivery
pub type EventReceiver = mpsc::Receiver<Arc<Event>>;

/// Error a subscriber callback may return
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Asynchronous subscriber run on the tokio runtime
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Errors returned by bus operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("event bus is closed")]
    Closed,

    #[error("async handlers need a running tokio runtime")]
    NoRuntime,

    #[error("failed to start subscriber worker: {0}")]
    Worker(String),
}

/// A failure delivering one event to one subscriber.
///
/// Queue failures are collected in [`DispatchReport`]. Handler failures
/// happen off the publishing thread and are logged by the worker. None of
/// them fail a publication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusDeliveryError {
    #[error("subscriber queue is full")]
    QueueFull,

    #[error("subscriber has disconnected")]
    Disconnected,

    #[error("handler failed: {0}")]
    HandlerFailed(String),

    #[error("handler panicked")]
    Panicked,

    #[error("handler timed out after {0:?}")]
    TimedOut(Duration),
}

/// Tuning for subscriber delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    /// Queue depth for channel subscribers
    pub capacity: usize,
    /// Upper bound on one async handler invocation
    pub handler_timeout: Duration,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            capacity: 1024,
            handler_timeout: Duration::from_secs(5),
        }
    }
}

/// What happened to one published event
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub matched: usize,
    pub delivered: usize,
    pub failures: Vec<(SubscriberId, BusDeliveryError)>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Entry {
    subscription: Subscription,
    sender: EventSender,
}

/// The event bus routes events to matching subscribers
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<SubscriberId, Entry>>>,
    next_id: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
    settings: BusSettings,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_settings(BusSettings::default())
    }

    pub fn with_settings(settings: BusSettings) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            closed: Arc::new(AtomicBool::new(false)),
            settings,
        }
    }

    pub fn settings(&self) -> BusSettings {
        self.settings
    }

    /// Subscribe with a bounded queue.
    ///
    /// On a closed bus the returned receiver is already disconnected.
    pub fn subscribe(
        &self,
        filter: EventFilter,
        description: impl Into<String>,
    ) -> (SubscriberId, EventReceiver) {
        let (tx, rx) = mpsc::channel(self.settings.capacity.max(1));
        let id = self.register(filter, description.into(), tx);
        (id, rx)
    }

    /// Subscribe a blocking callback.
    ///
    /// The callback runs on its own worker thread fed by a bounded queue, so
    /// a slow callback only delays its own backlog. The worker exits when the
    /// subscription is removed or the bus closes.
    pub fn subscribe_fn<F>(
        &self,
        filter: EventFilter,
        description: impl Into<String>,
        handler: F,
    ) -> Result<SubscriberId, BusError>
    where
        F: Fn(&Event) -> Result<(), HandlerError> + Send + 'static,
    {
        let (id, mut rx) = self.subscribe(filter, description);
        let worker_id = id.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("herald-{}", id))
            .spawn(move || {
                while let Some(event) = rx.blocking_recv() {
                    if let Err(e) = run_callback(&handler, &event) {
                        warn!(subscriber = %worker_id, event_id = %event.id, error = %e, "event callback failed");
                    }
                }
                debug!(subscriber = %worker_id, "event callback stopped");
            });

        match spawned {
            Ok(_) => Ok(id),
            Err(e) => {
                error!(subscriber = %id, error = %e, "failed to start subscriber worker");
                self.unsubscribe(&id);
                Err(BusError::Worker(e.to_string()))
            }
        }
    }

    /// Subscribe an async handler driven by a worker task on the current runtime
    pub fn subscribe_handler<H: EventHandler>(
        &self,
        filter: EventFilter,
        description: impl Into<String>,
        handler: H,
    ) -> Result<SubscriberId, BusError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BusError::NoRuntime)?;
        let (id, mut rx) = self.subscribe(filter, description);
        let handler = Arc::new(handler);
        let timeout = self.settings.handler_timeout;
        let worker_id = id.clone();

        runtime.spawn(async move {
            while let Some(event) = rx.recv().await {
                let event_id = event.id.clone();
                if let Err(e) = run_handler(&handler, event, timeout).await {
                    warn!(subscriber = %worker_id, event_id = %event_id, error = %e, "event handler failed");
                }
            }
            debug!(subscriber = %worker_id, "event handler stopped");
        });

        Ok(id)
    }

    fn register(&self, filter: EventFilter, description: String, sender: EventSender) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if self.is_closed() {
            debug!(subscriber = %id, "subscription to closed bus ignored");
            return id;
        }

        let subscription = Subscription::new(id.clone(), filter, description);
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id.clone(), Entry { subscription, sender });
        id
    }

    /// Unsubscribe from events. Returns whether the subscriber existed.
    pub fn unsubscribe(&self, id: &SubscriberId) -> bool {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.remove(id).is_some()
    }

    /// Publish an event to all matching subscribers
    pub fn publish(&self, event: Event) -> Result<DispatchReport, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let event = Arc::new(event);

        // Snapshot targets so delivery happens without holding the lock
        let targets: Vec<(SubscriberId, EventSender)> = {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            subs.values()
                .filter(|entry| entry.subscription.matches(event.as_ref()))
                .map(|entry| (entry.subscription.id.clone(), entry.sender.clone()))
                .collect()
        };

        let mut report = DispatchReport {
            matched: targets.len(),
            ..DispatchReport::default()
        };
        let mut gone = Vec::new();

        for (id, sender) in targets {
            match deliver(&sender, &event) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        subscriber = %id,
                        event_id = %event.id,
                        event_name = %event.name,
                        error = %e,
                        "event delivery failed"
                    );
                    if e == BusDeliveryError::Disconnected {
                        gone.push(id.clone());
                    }
                    report.failures.push((id, e));
                }
            }
        }

        if !gone.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in &gone {
                subs.remove(id);
            }
        }

        debug!(
            event_id = %event.id,
            event_name = %event.name,
            matched = report.matched,
            delivered = report.delivered,
            "event published"
        );

        Ok(report)
    }

    /// Stop accepting events and drop every subscriber.
    ///
    /// Queued receivers see the end of the stream once drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Get count of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// List all subscriptions, oldest first
    pub fn list_subscriptions(&self) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|entry| entry.subscription.clone())
            .collect();
        subs.sort_by(|a, b| a.id.cmp(&b.id));
        subs
    }
}

fn deliver(sender: &EventSender, event: &Arc<Event>) -> Result<(), BusDeliveryError> {
    sender.try_send(Arc::clone(event)).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => BusDeliveryError::QueueFull,
        mpsc::error::TrySendError::Closed(_) => BusDeliveryError::Disconnected,
    })
}

fn run_callback<F>(handler: &F, event: &Event) -> Result<(), BusDeliveryError>
where
    F: Fn(&Event) -> Result<(), HandlerError>,
{
    match catch_unwind(AssertUnwindSafe(|| handler(event))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BusDeliveryError::HandlerFailed(e.to_string())),
        Err(_) => Err(BusDeliveryError::Panicked),
    }
}

async fn run_handler<H: EventHandler>(
    handler: &Arc<H>,
    event: Arc<Event>,
    timeout: Duration,
) -> Result<(), BusDeliveryError> {
    let handler = Arc::clone(handler);
    let mut task = tokio::spawn(async move { handler.handle(&event).await });

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(e))) => Err(BusDeliveryError::HandlerFailed(e.to_string())),
        Ok(Err(join)) if join.is_panic() => Err(BusDeliveryError::Panicked),
        Ok(Err(join)) => Err(BusDeliveryError::HandlerFailed(join.to_string())),
        Err(_) => {
            task.abort();
            Err(BusDeliveryError::TimedOut(timeout))
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
            closed: Arc::clone(&self.closed),
            settings: self.settings,
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("closed", &self.is_closed())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
