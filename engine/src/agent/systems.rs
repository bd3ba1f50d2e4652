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

//! Agent Systems
//!
//! This module contains the logic that mutates [`AgentState`]. Every system
//! works through a [`TickContext`], which bundles the state with the clock,
//! random source, configuration, viewport and event bus for one operation.

mod decision;
mod interaction;
pub mod scripts;
mod visibility;

pub use decision::*;
pub use interaction::*;
pub use visibility::*;

use crate::agent::components::{AgentState, Continuation, Episode, EpisodeToken, Viewport};
use crate::agent::events::{AgentEvent, EventBus};
use crate::config::{EngineConfig, SpringParams};
use crate::random::RandomSource;
use crate::timeline::{Millis, Timeline};
use whiskers_common::{Facing, Vec2};

/// Everything a system may touch while handling one tick or event
pub struct TickContext<'a> {
    pub state: &'a mut AgentState,
    pub timeline: &'a mut Timeline<Continuation>,
    pub rng: &'a mut dyn RandomSource,
    pub config: &'a EngineConfig,
    pub viewport: Viewport,
    pub event_bus: &'a EventBus,
}

impl TickContext<'_> {
    pub fn now(&self) -> Millis {
        self.timeline.now()
    }

    /// One uniform draw
    pub fn draw(&mut self) -> f64 {
        self.rng.next_f64()
    }

    /// Start a new episode. Anything the previous one scheduled goes stale
    /// and an unfinished hop drops back down.
    pub fn begin(&mut self, episode: Episode) -> EpisodeToken {
        let from = self.state.behavior();
        let token = self.state.begin_episode(episode);
        let to = self.state.behavior();
        self.state.hop.set_target(0.0, self.config.motion.hop_spring);

        tracing::debug!("Episode {:?} began: {} -> {}", token, from, to);
        if from != to {
            self.event_bus.publish(AgentEvent::BehaviorChanged { from, to });
        }
        token
    }

    pub fn face(&mut self, facing: Facing) {
        if self.state.facing != facing {
            self.state.facing = facing;
            self.event_bus.publish(AgentEvent::FacingChanged { facing });
        }
    }

    /// Show a thought and schedule its removal
    pub fn think(&mut self, text: impl Into<String>) {
        let text = text.into();
        let generation = self.state.set_thought(text.clone());
        self.timeline
            .schedule_in(self.config.thoughts.display_ms, Continuation::ClearThought(generation));
        tracing::debug!("Thought #{}: {}", generation, text);
        self.event_bus.publish(AgentEvent::ThoughtShown { text });
    }

    /// Ease toward `target` inside the visible window
    pub fn move_to(&mut self, target: Vec2, spring: SpringParams, owner: Option<EpisodeToken>) -> Vec2 {
        let bounds = self.viewport.bounds();
        let accepted = self.state.motion.set_target(target, &bounds, spring, owner);
        self.event_bus.publish(AgentEvent::MovementStarted { target: accepted });
        accepted
    }
}
