use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::PaymentStatus;

/// notifications emitted by billing operations, drained by the hosting
/// application to feed its notification surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BillingEvent {
    ConfigSaved {
        category_id: String,
        timestamp: DateTime<Utc>,
    },
    PaymentsRegenerated {
        player_id: String,
        generated: usize,
        retained_paid: usize,
        timestamp: DateTime<Utc>,
    },
    PaymentStatusChanged {
        payment_id: Uuid,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    SweepCompleted {
        category_id: String,
        players_swept: usize,
        players_failed: usize,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations. thread-safe
/// because sweep workers emit from multiple threads.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Mutex<Vec<BillingEvent>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: BillingEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn take_events(&self) -> Vec<BillingEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().map(|events| events.is_empty()).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_events_drains() {
        let store = EventStore::new();
        store.emit(BillingEvent::ConfigSaved {
            category_id: "cat-1".to_string(),
            timestamp: Utc::now(),
        });

        assert!(!store.is_empty());
        assert_eq!(store.take_events().len(), 1);
        assert!(store.is_empty());
        assert!(store.take_events().is_empty());
    }
}
