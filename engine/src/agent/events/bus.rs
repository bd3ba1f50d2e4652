//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Queued event dispatch
//!
//! Systems publish while they hold the agent state; handlers only run when the
//! context drains the queue at the end of a host operation, so a handler never
//! observes a half applied change.

use super::types::AgentEvent;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub type EventHandler = Box<dyn Fn(&AgentEvent) + Send + Sync>;

/// Events kept when nobody drains the queue. Older ones are dropped first.
pub const MAX_QUEUED_EVENTS: usize = 1024;

struct Subscription {
    /// Only events with this [`AgentEvent::event_type`], or all when `None`
    filter: Option<&'static str>,
    handler: EventHandler,
}

/// Event bus the host subscribes to for agent changes
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
    queue: Arc<RwLock<VecDeque<AgentEvent>>>,
    dispatched: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(RwLock::new(Vec::new())),
            queue: Arc::new(RwLock::new(VecDeque::new())),
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Receive every event
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&AgentEvent) + Send + Sync + 'static,
    {
        self.add(None, Box::new(handler));
    }

    /// Receive only events of one kind, e.g. `"behavior_changed"`
    pub fn subscribe_to<F>(&self, event_type: &'static str, handler: F)
    where
        F: Fn(&AgentEvent) + Send + Sync + 'static,
    {
        self.add(Some(event_type), Box::new(handler));
    }

    fn add(&self, filter: Option<&'static str>, handler: EventHandler) {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(PoisonError::into_inner);
        subscriptions.push(Subscription { filter, handler });
    }

    /// Queue an event for the next dispatch
    pub fn publish(&self, event: AgentEvent) {
        let mut queue = self.queue.write().unwrap_or_else(PoisonError::into_inner);
        if queue.len() >= MAX_QUEUED_EVENTS {
            if let Some(dropped) = queue.pop_front() {
                tracing::warn!("Event queue full, dropping {}", dropped.event_type());
            }
        }
        queue.push_back(event);
    }

    /// Dispatch all queued events in publish order
    pub fn process_events(&self) {
        let events: Vec<_> = {
            let mut queue = self.queue.write().unwrap_or_else(PoisonError::into_inner);
            queue.drain(..).collect()
        };
        if events.is_empty() {
            return;
        }

        let subscriptions = self.subscriptions.read().unwrap_or_else(PoisonError::into_inner);
        for event in &events {
            let event_type = event.event_type();
            for subscription in subscriptions.iter() {
                if subscription.filter.is_none_or(|filter| filter == event_type) {
                    (subscription.handler)(event);
                }
            }
        }
        self.dispatched.fetch_add(events.len() as u64, Ordering::Relaxed);
    }

    pub fn queue_len(&self) -> usize {
        let queue = self.queue.read().unwrap_or_else(PoisonError::into_inner);
        queue.len()
    }

    /// Total events dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
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
            subscriptions: Arc::clone(&self.subscriptions),
            queue: Arc::clone(&self.queue),
            dispatched: Arc::clone(&self.dispatched),
        }
    }
}
