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

//! Simulated monotonic clock with a queue of delayed continuations
//!
//! The timeline never runs anything itself. The owner pops due entries and
//! decides whether each one is still relevant, which is how superseded
//! continuations get dropped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Milliseconds since the agent was mounted
pub type Millis = u64;

struct Entry<T> {
    due: Millis,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap yields the earliest entry, ties in scheduling order
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Clock plus pending continuations of type `T`
pub struct Timeline<T> {
    now: Millis,
    next_seq: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Schedule `payload` to become due `delay` milliseconds from now
    pub fn schedule_in(&mut self, delay: Millis, payload: T) {
        let due = self.now.saturating_add(delay);
        self.schedule_at(due, payload);
    }

    pub fn schedule_at(&mut self, due: Millis, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { due, seq, payload });
    }

    /// Due time of the earliest pending entry
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|entry| entry.due)
    }

    /// Remove and return the earliest entry due at or before `until`
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, T)> {
        if self.next_due()? > until {
            return None;
        }
        self.queue.pop().map(|entry| (entry.due, entry.payload))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_in_due_order() {
        let mut timeline = Timeline::new();
        timeline.schedule_in(300, "c");
        timeline.schedule_in(100, "a");
        timeline.schedule_in(200, "b");

        assert_eq!(timeline.next_due(), Some(100));
        assert_eq!(timeline.pop_due(50), None);
        assert_eq!(timeline.pop_due(1000), Some((100, "a")));
        assert_eq!(timeline.pop_due(1000), Some((200, "b")));
        assert_eq!(timeline.pop_due(1000), Some((300, "c")));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_ties_keep_scheduling_order() {
        let mut timeline = Timeline::new();
        timeline.schedule_at(10, 1);
        timeline.schedule_at(10, 2);
        timeline.schedule_at(10, 3);

        let order: Vec<_> = std::iter::from_fn(|| timeline.pop_due(10)).map(|(_, v)| v).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_schedule_is_relative_to_now() {
        let mut timeline = Timeline::new();
        timeline.set_now(1000);
        timeline.schedule_in(500, ());
        assert_eq!(timeline.next_due(), Some(1500));
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut timeline: Timeline<()> = Timeline::new();
        timeline.set_now(100);
        timeline.set_now(50);
        assert_eq!(timeline.now(), 100);
    }
}
