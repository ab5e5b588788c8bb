//! In-process publish/subscribe bus for domain events.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::{DomainEvent, EventKind};
use crate::errors::{Error, Result};

/// A consumer of domain events.
///
/// Handlers run one after another on the publishing task. A handler that
/// needs exactly-once effects must make itself idempotent; the bus only
/// guarantees ordering and isolation.
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> Result<()>;
}

/// One subscription of a named handler to an event type.
///
/// Lower `priority` runs first. A handler name may appear once per event type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRegistration {
    pub handler_name: String,
    pub event_type: EventKind,
    pub priority: i32,
    pub is_enabled: bool,
}

impl HandlerRegistration {
    pub fn new(handler_name: impl Into<String>, event_type: EventKind, priority: i32) -> Self {
        Self {
            handler_name: handler_name.into(),
            event_type,
            priority,
            is_enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = false;
        self
    }
}

/// Outcome of a single `publish` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub event_id: String,
    /// Handlers invoked, in dispatch order (failed ones included).
    pub invoked: Vec<String>,
    /// Handlers that returned an error or panicked.
    pub failed: Vec<String>,
}

impl DispatchSummary {
    fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            ..Default::default()
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

struct HandlerEntry {
    registration: HandlerRegistration,
    sequence: u64,
    handler: Arc<dyn DomainEventHandler>,
}

fn same_handler(a: &Arc<dyn DomainEventHandler>, b: &Arc<dyn DomainEventHandler>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Event type -> handlers, each list kept in (priority, registration order).
#[derive(Default)]
struct HandlerRegistry {
    by_event: HashMap<EventKind, Vec<HandlerEntry>>,
    next_sequence: u64,
}

impl HandlerRegistry {
    fn insert(
        &mut self,
        registration: HandlerRegistration,
        handler: Arc<dyn DomainEventHandler>,
    ) -> Result<()> {
        // A name stands for one handler object across every event type.
        let bound_elsewhere = self
            .by_event
            .values()
            .flatten()
            .find(|e| e.registration.handler_name == registration.handler_name);
        if let Some(existing) = bound_elsewhere {
            if !same_handler(&existing.handler, &handler) {
                return Err(Error::ConstraintViolation(format!(
                    "Handler name '{}' is already bound to a different handler",
                    registration.handler_name
                )));
            }
        }

        let entries = self
            .by_event
            .entry(registration.event_type.clone())
            .or_default();
        if entries
            .iter()
            .any(|e| e.registration.handler_name == registration.handler_name)
        {
            return Err(Error::ConstraintViolation(format!(
                "Handler '{}' is already subscribed to {}",
                registration.handler_name, registration.event_type
            )));
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        // Later registrations with equal priority go after existing ones.
        let position = entries.partition_point(|e| e.registration.priority <= registration.priority);
        entries.insert(
            position,
            HandlerEntry {
                registration,
                sequence,
                handler,
            },
        );
        Ok(())
    }

    fn remove(&mut self, handler_name: &str) -> usize {
        let mut removed = 0;
        for entries in self.by_event.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.registration.handler_name != handler_name);
            removed += before - entries.len();
        }
        self.by_event.retain(|_, entries| !entries.is_empty());
        removed
    }

    fn set_enabled(&mut self, handler_name: &str, enabled: bool) -> usize {
        let mut updated = 0;
        for entry in self
            .by_event
            .values_mut()
            .flat_map(|entries| entries.iter_mut())
            .filter(|e| e.registration.handler_name == handler_name)
        {
            entry.registration.is_enabled = enabled;
            updated += 1;
        }
        updated
    }

    fn dispatch_list(&self, event_type: &EventKind) -> Vec<(String, Arc<dyn DomainEventHandler>)> {
        self.by_event
            .get(event_type)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.registration.is_enabled)
                    .map(|e| (e.registration.handler_name.clone(), e.handler.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Publishes domain events to subscribed handlers.
///
/// For a single `publish` call, enabled handlers for the event's type run
/// sequentially in non-decreasing priority order (ties in registration
/// order). A failing or panicking handler is logged and skipped; it never
/// stops later handlers and never fails the publish.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<HandlerRegistry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, HandlerRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, HandlerRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` under `registration`.
    ///
    /// Fails with a constraint violation when the same handler name is
    /// already subscribed to the same event type.
    pub fn subscribe(
        &self,
        registration: HandlerRegistration,
        handler: Arc<dyn DomainEventHandler>,
    ) -> Result<()> {
        debug!(
            "Subscribing handler '{}' to {} (priority {}, enabled {})",
            registration.handler_name,
            registration.event_type,
            registration.priority,
            registration.is_enabled
        );
        self.write_registry().insert(registration, handler)
    }

    /// Subscribes one handler to several event types under the same name and priority.
    pub fn subscribe_many(
        &self,
        handler_name: &str,
        event_types: &[EventKind],
        priority: i32,
        handler: Arc<dyn DomainEventHandler>,
    ) -> Result<()> {
        for event_type in event_types {
            self.subscribe(
                HandlerRegistration::new(handler_name, event_type.clone(), priority),
                handler.clone(),
            )?;
        }
        Ok(())
    }

    /// Removes every registration of `handler_name`. Returns how many were removed.
    pub fn unsubscribe(&self, handler_name: &str) -> usize {
        let removed = self.write_registry().remove(handler_name);
        if removed == 0 {
            warn!("Unsubscribe requested for unknown handler '{}'", handler_name);
        }
        removed
    }

    /// Enables or disables every registration of `handler_name`.
    pub fn set_enabled(&self, handler_name: &str, enabled: bool) -> usize {
        self.write_registry().set_enabled(handler_name, enabled)
    }

    /// All registrations, grouped by event type in dispatch order.
    pub fn registrations(&self) -> Vec<HandlerRegistration> {
        let registry = self.read_registry();
        let mut all: Vec<(&HandlerRegistration, u64)> = registry
            .by_event
            .values()
            .flat_map(|entries| entries.iter().map(|e| (&e.registration, e.sequence)))
            .collect();
        all.sort_by(|(a, a_seq), (b, b_seq)| {
            a.event_type
                .as_str()
                .cmp(b.event_type.as_str())
                .then(a.priority.cmp(&b.priority))
                .then(a_seq.cmp(b_seq))
        });
        all.into_iter().map(|(r, _)| r.clone()).collect()
    }

    /// Dispatches `event` to every enabled handler subscribed to its type.
    ///
    /// Only an ill-formed event makes this return an error.
    pub async fn publish(&self, event: &DomainEvent) -> Result<DispatchSummary> {
        event.validate()?;

        // Snapshot the dispatch list so no lock is held while handlers run.
        let targets = self.read_registry().dispatch_list(&event.event_type);
        let mut summary = DispatchSummary::new(&event.id);

        if targets.is_empty() {
            debug!("No handlers subscribed to {} (event {})", event.event_type, event.id);
            return Ok(summary);
        }

        for (handler_name, handler) in targets {
            let outcome = AssertUnwindSafe(handler.handle(event)).catch_unwind().await;
            summary.invoked.push(handler_name.clone());
            match outcome {
                Ok(Ok(())) => {
                    debug!("Handler '{}' processed event {}", handler_name, event.id);
                }
                Ok(Err(e)) => {
                    error!(
                        "Handler '{}' failed on {} event {}: {}",
                        handler_name, event.event_type, event.id, e
                    );
                    summary.failed.push(handler_name);
                }
                Err(panic) => {
                    let reason = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(
                        "Handler '{}' panicked on {} event {}: {}",
                        handler_name, event.event_type, event.id, reason
                    );
                    summary.failed.push(handler_name);
                }
            }
        }

        Ok(summary)
    }
}
