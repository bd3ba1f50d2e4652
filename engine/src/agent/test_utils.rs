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

//! Test utilities for agent system testing

use crate::agent::components::{AgentState, Continuation, Viewport};
use crate::agent::events::{AgentEvent, EventBus};
use crate::agent::systems::TickContext;
use crate::config::EngineConfig;
use crate::random::ScriptedRandom;
use crate::timeline::Timeline;
use std::sync::{Arc, Mutex};

/// 800x600 window scrolled to the top
pub fn test_viewport() -> Viewport {
    Viewport::new(800.0, 600.0, 0.0)
}

/// Owns everything a [`TickContext`] borrows
pub struct Harness {
    pub state: AgentState,
    pub timeline: Timeline<Continuation>,
    pub rng: ScriptedRandom,
    pub config: EngineConfig,
    pub viewport: Viewport,
    pub event_bus: EventBus,
}

impl Harness {
    /// Harness replaying `draws`, then drawing 0.5 forever
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        let config = EngineConfig::default();
        let viewport = test_viewport();
        Self {
            state: AgentState::new(&viewport, &config.motion),
            timeline: Timeline::new(),
            rng: ScriptedRandom::new(draws),
            config,
            viewport,
            event_bus: EventBus::new(),
        }
    }

    pub fn cx(&mut self) -> TickContext<'_> {
        TickContext {
            state: &mut self.state,
            timeline: &mut self.timeline,
            rng: &mut self.rng,
            config: &self.config,
            viewport: self.viewport,
            event_bus: &self.event_bus,
        }
    }

    /// Pending continuations in due order, leaving the clock untouched
    pub fn drain_timeline(&mut self) -> Vec<(u64, Continuation)> {
        std::iter::from_fn(|| self.timeline.pop_due(u64::MAX)).collect()
    }
}

/// Record every event dispatched on `bus`
pub fn collect_events(bus: &EventBus) -> Arc<Mutex<Vec<AgentEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bus.subscribe(move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use whiskers_common::{Behavior, Vec2};

    #[test]
    fn test_harness_starts_idle_in_center() {
        let harness = Harness::new([]);
        assert_eq!(harness.state.behavior(), Behavior::Idle);
        assert_eq!(harness.state.position(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_collect_events() {
        let bus = EventBus::new();
        let events = collect_events(&bus);
        bus.publish(AgentEvent::ThoughtCleared);
        bus.process_events();
        assert_eq!(*events.lock().unwrap(), vec![AgentEvent::ThoughtCleared]);
    }
}
