// 📜 Activity Log - explicit audit handle
// "Every change is an event": the repository and the merger record what they do
// through a handle they are given, never through a process-wide logger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

// ============================================================================
// ACTIVITY EVENT
// ============================================================================

/// One recorded action on a customer or contract
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl ActivityEvent {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// ACTIVITY LOG HANDLE
// ============================================================================

/// Events kept in memory unless configured otherwise
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Cloneable handle; clones share the same event buffer.
///
/// Only the most recent `capacity` events stay in memory, older ones are
/// dropped. Every event still reaches the tracing subscriber.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    actor: String,
    capacity: usize,
    events: Arc<RwLock<VecDeque<ActivityEvent>>>,
}

impl ActivityLog {
    pub fn new(actor: impl Into<String>) -> Self {
        Self::with_capacity(actor, DEFAULT_EVENT_CAPACITY)
    }

    /// `capacity` 0 keeps nothing in memory (tracing only)
    pub fn with_capacity(actor: impl Into<String>, capacity: usize) -> Self {
        ActivityLog {
            actor: actor.into(),
            capacity,
            events: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(64)))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Record an event and forward it to the tracing subscriber
    pub fn record(
        &self,
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
    ) {
        let event = ActivityEvent::new(event_type, entity_type, entity_id, data, &self.actor);

        tracing::info!(
            event_type = %event.event_type,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            data = %event.data,
            actor = %event.actor,
            "activity"
        );

        if self.capacity == 0 {
            return;
        }

        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Retained events in recording order
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn events_for_entity(&self, entity_id: &str) -> Vec<ActivityEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new("system")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_and_query() {
        let log = ActivityLog::new("tester");
        log.record("customer_added", "customer", "c-1", json!({"name": "Anna"}));
        log.record("contract_added", "contract", "k-1", json!({}));
        log.record("customer_renamed", "customer", "c-1", json!({}));

        assert_eq!(log.count(), 3);
        let for_customer = log.events_for_entity("c-1");
        assert_eq!(for_customer.len(), 2);
        assert_eq!(for_customer[0].event_type, "customer_added");
        assert_eq!(for_customer[1].event_type, "customer_renamed");
        assert!(for_customer.iter().all(|e| e.actor == "tester"));
    }

    #[test]
    fn test_clones_share_events() {
        let log = ActivityLog::new("tester");
        let handle = log.clone();
        handle.record("customer_deleted", "customer", "c-9", json!(null));

        assert_eq!(log.count(), 1);
        assert_ne!(log.events()[0].event_id, "");
    }

    #[test]
    fn test_buffer_keeps_most_recent_events() {
        let log = ActivityLog::with_capacity("tester", 2);
        log.record("customer_added", "customer", "c-1", json!({}));
        log.record("customer_added", "customer", "c-2", json!({}));
        log.record("customer_added", "customer", "c-3", json!({}));

        assert_eq!(log.count(), 2);
        let ids: Vec<String> = log.events().into_iter().map(|e| e.entity_id).collect();
        assert_eq!(ids, vec!["c-2", "c-3"]);
        assert!(log.events_for_entity("c-1").is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let log = ActivityLog::with_capacity("tester", 0);
        log.record("customer_added", "customer", "c-1", json!({}));
        assert_eq!(log.count(), 0);
        assert_eq!(log.capacity(), 0);
    }
}
