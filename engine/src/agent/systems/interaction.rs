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

//! Pointer and activation handling

use super::TickContext;
use crate::agent::components::{Continuation, CuriousScript, Episode, PlayScript};
use crate::agent::events::AgentEvent;
use crate::random::choose;
use whiskers_common::{Behavior, Facing, Vec2};

/// Reacts to the user, overriding whatever the cat decided on its own
#[derive(Debug, Default)]
pub struct InteractionSystem {
    activations: u64,
}

impl InteractionSystem {
    /// Create a new interaction system
    pub fn new() -> Self {
        Self { activations: 0 }
    }

    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// The pointer moved to `client` (viewport coordinates).
    ///
    /// Only an occasional nearby move gets noticed; when it does, the cat turns
    /// and creeps toward the pointer, preempting any move in flight. Returns
    /// whether the cat reacted.
    pub fn on_pointer_move(&mut self, cx: &mut TickContext, client: Vec2) -> bool {
        if cx.state.behavior() == Behavior::Sleeping || cx.viewport.is_degenerate() {
            return false;
        }

        let config = cx.config;
        if cx.draw() >= config.interaction.pointer_gate {
            return false;
        }

        let pointer = cx.viewport.to_document(client);
        if !pointer.is_finite() {
            return false;
        }

        let position = cx.state.position();
        let distance = position.distance(pointer);
        if distance >= config.interaction.proximity_radius {
            return false;
        }

        tracing::debug!("Pointer noticed at {} ({:.0} away)", pointer, distance);
        cx.state.last_interaction_at = cx.now();
        let token = cx.begin(Episode::Curious(CuriousScript::Approach { target: pointer }));
        cx.face(Facing::toward(position.x, pointer.x));
        cx.move_to(pointer, config.motion.approach_spring, Some(token));
        true
    }

    /// The cat was clicked, tapped or activated from the keyboard.
    ///
    /// Always accepted. A sleeping cat wakes up; an awake one plays, hops,
    /// purrs and celebrates until the fallback timer calms it down. Each
    /// activation supersedes the previous fallback and celebration.
    pub fn on_activate(&mut self, cx: &mut TickContext) {
        self.activations += 1;
        let config = cx.config;

        cx.state.last_interaction_at = cx.now();
        cx.state.playfulness = cx.state.playfulness.saturating_add(1);

        if cx.state.behavior() == Behavior::Sleeping {
            tracing::debug!("Activation woke the cat");
            cx.begin(Episode::Idle);
            cx.think(config.thoughts.waking.as_str());
            return;
        }

        let token = cx.begin(Episode::Playing(PlayScript::Petted));
        cx.state
            .hop
            .set_target(-config.interaction.activation_hop, config.motion.hop_spring);
        cx.timeline
            .schedule_in(config.interaction.hop_settle_ms, Continuation::HopSettle(token));

        if let Some(text) = choose(cx.rng, &config.thoughts.happy) {
            cx.think(text.as_str());
        }

        let celebration = cx.state.start_celebration();
        cx.event_bus.publish(AgentEvent::CelebrationStarted);
        cx.timeline
            .schedule_in(config.interaction.celebration_ms, Continuation::CelebrationEnd(celebration));

        cx.timeline
            .schedule_in(config.interaction.play_fallback_ms, Continuation::PlayFallback(token));
        tracing::debug!(
            "Activation #{} started play episode {:?}, playfulness {}",
            self.activations,
            token,
            cx.state.playfulness
        );
    }
}
