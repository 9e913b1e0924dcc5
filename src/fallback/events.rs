//! Bounded log of provider-to-provider transitions.

use super::policy::FallbackReason;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

/// Number of events retained before the oldest is dropped.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Longest error text kept on an event.
const MAX_ERROR_LEN: usize = 1024;

/// One fallback from `from_service` to `to_service`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackEvent {
    pub timestamp: DateTime<Utc>,
    pub reason: FallbackReason,
    pub from_service: String,
    pub to_service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl FallbackEvent {
    pub fn new(
        reason: FallbackReason,
        from_service: impl Into<String>,
        to_service: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            reason,
            from_service: from_service.into(),
            to_service: to_service.into(),
            error: None,
            request_id: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Ring buffer of the most recent fallback events, oldest first.
pub struct FallbackEventLog {
    events: RwLock<VecDeque<FallbackEvent>>,
    capacity: usize,
}

impl FallbackEventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an event, evicting the oldest if at capacity.
    pub fn push(&self, mut event: FallbackEvent) {
        if let Some(error) = event.error.as_mut() {
            truncate_on_char_boundary(error, MAX_ERROR_LEN);
        }

        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// All events in chronological order (oldest first).
    pub fn get_all(&self) -> Vec<FallbackEvent> {
        self.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, VecDeque<FallbackEvent>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FallbackEventLog {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
