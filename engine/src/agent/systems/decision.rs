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

//! Autonomous behavior decisions
//!
//! Once per decision interval the cat evaluates, in this order:
//!
//! 1. **Sleep**: bored for long enough and a draw above the sleep gate puts
//!    it to sleep, ending the tick.
//! 2. **Mood**: after the mood refresh interval, a draw above the mood gate
//!    picks a fresh mood uniformly.
//! 3. **Thought**: a draw above the thought gate shows a phrase for the
//!    behavior the tick started in.
//! 4. **Behavior**: one draw mapped onto walk, idle, curious and play bands.
//!    Play is only reachable once playfulness exceeds its threshold. A
//!    sleeping cat only wakes on a high draw.
//!
//! Reordering these steps changes which draw feeds which gate.

use super::TickContext;
use super::scripts;
use crate::agent::components::Episode;
use crate::agent::events::AgentEvent;
use crate::random::choose;
use whiskers_common::{Behavior, Mood};

/// What step 4 of a tick picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    FellAsleep,
    WokeUp,
    Walk,
    Idle,
    LookAround,
    Bounce,
    NoChange,
}

/// Behavior state machine driven by the periodic decision tick
#[derive(Debug, Default)]
pub struct BehaviorSystem {
    ticks: u64,
}

impl BehaviorSystem {
    /// Create a new behavior system
    pub fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Number of decision ticks evaluated so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Evaluate one decision tick
    pub fn tick(&mut self, cx: &mut TickContext) -> Decision {
        self.ticks += 1;

        let config = cx.config;
        let now = cx.now();
        let behavior = cx.state.behavior();
        let since_interaction = now.saturating_sub(cx.state.last_interaction_at);
        let since_mood_change = now.saturating_sub(cx.state.last_mood_change_at);

        // Bored cats doze off
        if behavior != Behavior::Sleeping
            && since_interaction > config.decision.sleep_after_ms
            && cx.draw() > config.decision.sleep_gate
        {
            tracing::debug!("Tick {}: idle for {}ms, falling asleep", self.ticks, since_interaction);
            cx.begin(Episode::Sleeping);
            return Decision::FellAsleep;
        }

        if since_mood_change > config.decision.mood_refresh_ms && cx.draw() > config.decision.mood_gate {
            self.refresh_mood(cx);
        }

        if cx.draw() > config.decision.thought_gate {
            if let Some(text) = choose(cx.rng, config.thoughts.phrases(behavior)) {
                cx.think(text.as_str());
            }
        }

        let decision = self.pick_behavior(cx, behavior);
        tracing::debug!("Tick {}: {} -> {:?}", self.ticks, behavior, decision);
        decision
    }

    fn refresh_mood(&self, cx: &mut TickContext) {
        let from = cx.state.mood;
        let to = choose(cx.rng, &Mood::ALL).copied().unwrap_or(from);
        cx.state.mood = to;
        cx.state.last_mood_change_at = cx.now();
        if from != to {
            cx.event_bus.publish(AgentEvent::MoodChanged { from, to });
        }
    }

    fn pick_behavior(&self, cx: &mut TickContext, behavior: Behavior) -> Decision {
        let config = cx.config;
        let decision = &config.decision;
        let roll = cx.draw();

        if behavior == Behavior::Sleeping {
            if roll > decision.wake_gate {
                cx.begin(Episode::Idle);
                return Decision::WokeUp;
            }
            return Decision::NoChange;
        }

        if roll < decision.walk_band {
            if scripts::start_walk(cx) {
                Decision::Walk
            } else {
                Decision::NoChange
            }
        } else if roll < decision.idle_band {
            cx.begin(Episode::Idle);
            Decision::Idle
        } else if roll < decision.curious_band {
            scripts::start_look_around(cx);
            Decision::LookAround
        } else if roll < decision.play_band && cx.state.playfulness > decision.playfulness_threshold {
            if scripts::start_bounce(cx) {
                Decision::Bounce
            } else {
                Decision::NoChange
            }
        } else {
            Decision::NoChange
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_utils::{Harness, collect_events};
    use crate::random::MockRandomSource;
    use crate::agent::components::{AgentState, Continuation, Viewport};
    use crate::agent::events::EventBus;
    use crate::config::EngineConfig;
    use crate::timeline::Timeline;
    use whiskers_common::Facing;

    #[test]
    fn test_behavior_system_creation() {
        let system = BehaviorSystem::new();
        assert_eq!(system.ticks(), 0);
    }

    #[test]
    fn test_sleep_requires_boredom() {
        // Not bored yet: no sleep draw, the first draw feeds the thought gate
        let mut harness = Harness::new([0.1, 0.45]);
        harness.timeline.set_now(3000);
        let mut system = BehaviorSystem::new();
        let decision = system.tick(&mut harness.cx());
        assert_eq!(decision, Decision::Idle);
        assert_eq!(harness.state.behavior(), Behavior::Idle);
    }

    #[test]
    fn test_bored_cat_falls_asleep() {
        let mut harness = Harness::new([0.95]);
        harness.timeline.set_now(31_000);
        let mut system = BehaviorSystem::new();

        assert_eq!(system.tick(&mut harness.cx()), Decision::FellAsleep);
        assert_eq!(harness.state.behavior(), Behavior::Sleeping);
        // Sleep ends the tick: nothing else was drawn
        assert_eq!(harness.rng.remaining(), 0);
        assert!(harness.state.thought().is_none());
    }

    #[test]
    fn test_sleep_gate_failure_continues_tick() {
        // sleep gate fails, mood gate fails, no thought, idle band
        let mut harness = Harness::new([0.5, 0.5, 0.1, 0.4]);
        harness.timeline.set_now(31_000);
        let mut system = BehaviorSystem::new();

        assert_eq!(system.tick(&mut harness.cx()), Decision::Idle);
        assert_eq!(harness.state.mood, Mood::Happy);
        assert_eq!(harness.rng.remaining(), 0);
    }

    #[test]
    fn test_sleep_check_skipped_when_sleeping() {
        // No sleep draw: mood gate is not due, 0.1 thought gate, 0.5 roll stays asleep
        let mut harness = Harness::new([0.1, 0.5]);
        harness.timeline.set_now(10_000);
        harness.cx().begin(Episode::Sleeping);
        harness.timeline.set_now(40_000);
        harness.state.last_mood_change_at = 40_000;
        let mut system = BehaviorSystem::new();

        assert_eq!(system.tick(&mut harness.cx()), Decision::NoChange);
        assert_eq!(harness.state.behavior(), Behavior::Sleeping);
        assert_eq!(harness.rng.remaining(), 0);
    }

    #[test]
    fn test_high_roll_wakes_sleeper() {
        let mut harness = Harness::new([0.1, 0.85]);
        harness.cx().begin(Episode::Sleeping);
        let mut system = BehaviorSystem::new();

        assert_eq!(system.tick(&mut harness.cx()), Decision::WokeUp);
        assert_eq!(harness.state.behavior(), Behavior::Idle);
    }

    #[test]
    fn test_mood_refresh() {
        // mood gate passes, 0.6 picks Tired, no thought, idle band
        let mut harness = Harness::new([0.7, 0.6, 0.1, 0.4]);
        harness.timeline.set_now(16_000);
        harness.state.last_interaction_at = 16_000;
        let events = collect_events(&harness.event_bus);
        let mut system = BehaviorSystem::new();

        system.tick(&mut harness.cx());
        assert_eq!(harness.state.mood, Mood::Tired);
        assert_eq!(harness.state.last_mood_change_at, 16_000);

        harness.event_bus.process_events();
        assert!(events.lock().unwrap().contains(&AgentEvent::MoodChanged {
            from: Mood::Happy,
            to: Mood::Tired,
        }));
    }

    #[test]
    fn test_thought_uses_starting_behavior_phrases() {
        // thought gate passes, phrase index 1, then idle band
        let mut harness = Harness::new([0.8, 0.4, 0.4]);
        let mut system = BehaviorSystem::new();
        system.tick(&mut harness.cx());

        let thought = harness.state.thought().map(|t| t.text.clone());
        assert_eq!(thought.as_deref(), Some("This spot is nice"));
        let pending = harness.drain_timeline();
        assert!(pending.iter().any(|(due, c)| *due == 3000 && matches!(c, Continuation::ClearThought(_))));
    }

    #[test]
    fn test_walk_band() {
        let mut harness = Harness::new([0.1, 0.2, 0.25, 0.75]);
        let mut system = BehaviorSystem::new();
        assert_eq!(system.tick(&mut harness.cx()), Decision::Walk);
        assert_eq!(harness.state.behavior(), Behavior::Walking);
        assert!(harness.state.is_moving());
    }

    #[test]
    fn test_curious_band_starts_look_around() {
        let mut harness = Harness::new([0.1, 0.6]);
        harness.state.facing = Facing::Left;
        let mut system = BehaviorSystem::new();
        assert_eq!(system.tick(&mut harness.cx()), Decision::LookAround);
        assert_eq!(harness.state.behavior(), Behavior::Curious);
        assert_eq!(harness.state.facing, Facing::Right);
    }

    #[test]
    fn test_play_band_requires_playfulness() {
        let mut harness = Harness::new([0.1, 0.8]);
        harness.state.playfulness = 5;
        let mut system = BehaviorSystem::new();
        assert_eq!(system.tick(&mut harness.cx()), Decision::NoChange);
        assert_eq!(harness.state.behavior(), Behavior::Idle);

        let mut harness = Harness::new([0.1, 0.8]);
        harness.state.playfulness = 6;
        assert_eq!(system.tick(&mut harness.cx()), Decision::Bounce);
        assert_eq!(harness.state.behavior(), Behavior::Playing);
    }

    #[test]
    fn test_top_band_changes_nothing() {
        let mut harness = Harness::new([0.1, 0.95]);
        harness.state.playfulness = 100;
        let mut system = BehaviorSystem::new();
        assert_eq!(system.tick(&mut harness.cx()), Decision::NoChange);
        assert_eq!(harness.state.behavior(), Behavior::Idle);
    }

    #[test]
    fn test_tick_with_mock_random() {
        let config = EngineConfig::default();
        let viewport = Viewport::new(800.0, 600.0, 0.0);
        let mut state = AgentState::new(&viewport, &config.motion);
        let mut timeline: Timeline<Continuation> = Timeline::new();
        let event_bus = EventBus::new();

        // Fresh agent: only the thought gate and the behavior roll are drawn
        let mut rng = MockRandomSource::new();
        rng.expect_next_f64().times(2).return_const(0.45);

        let mut cx = TickContext {
            state: &mut state,
            timeline: &mut timeline,
            rng: &mut rng,
            config: &config,
            viewport,
            event_bus: &event_bus,
        };
        let mut system = BehaviorSystem::new();
        assert_eq!(system.tick(&mut cx), Decision::Idle);
    }
}
