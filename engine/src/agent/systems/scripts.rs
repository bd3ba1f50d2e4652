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

//! Scripted sub-animations
//!
//! Each scripted episode advances one step per [`Continuation::Script`] and
//! schedules the next step only after the current one ran. A step whose token
//! no longer matches the running episode is discarded, so a superseded script
//! can never fire late over a newer behavior.

use super::TickContext;
use crate::agent::components::{
    Arrival, Continuation, CuriousScript, Episode, EpisodeToken, PlayScript,
};
use crate::agent::events::AgentEvent;
use whiskers_common::{Facing, Vec2};

/// Wander to a random spot in the visible window.
///
/// Returns `false` without touching the state when a move is already in
/// flight or the viewport is unusable.
pub fn start_walk(cx: &mut TickContext) -> bool {
    if cx.state.is_moving() {
        tracing::debug!("Walk skipped, already moving");
        return false;
    }
    if cx.viewport.is_degenerate() {
        tracing::debug!("Walk skipped, no usable viewport");
        return false;
    }

    let config = cx.config;
    let viewport = cx.viewport;
    let margin = config.decision.walk_margin;

    let rx = cx.draw();
    let ry = cx.draw();
    let x = (rx * viewport.width).min(viewport.width - margin).max(margin);
    let y = (viewport.top() + ry * viewport.height)
        .min(viewport.bottom() - margin)
        .max(viewport.top() + margin);
    let current = cx.state.position();
    let target = viewport.bounds().clamp(Vec2::new(x, y), current);

    let token = cx.begin(Episode::Walking { target });
    cx.face(Facing::toward(current.x, target.x));
    cx.move_to(target, config.motion.walk_spring, Some(token));
    true
}

/// Look right, left, right, then settle back to idle
pub fn start_look_around(cx: &mut TickContext) {
    let config = cx.config;
    let token = cx.begin(Episode::Curious(CuriousScript::LookAround { step: 0 }));

    match config.motion.curious_look.first() {
        Some(step) => {
            cx.face(step.facing);
            cx.timeline.schedule_in(step.hold_ms, Continuation::Script(token));
        }
        None => {
            cx.begin(Episode::Idle);
        }
    }
}

/// Bounce in place a few times, flipping direction on the first hops
pub fn start_bounce(cx: &mut TickContext) -> bool {
    let config = cx.config;
    let phases = config.motion.bounce_repeats * 2;
    if phases == 0 {
        return false;
    }

    let token = cx.begin(Episode::Playing(PlayScript::Bounce { phase: 0, phases }));
    cx.state
        .hop
        .set_target(-config.motion.bounce_height, config.motion.hop_spring);
    cx.timeline
        .schedule_in(config.motion.bounce_half_period_ms, Continuation::Script(token));
    true
}

/// Run the next step of the episode's script
pub fn advance_script(cx: &mut TickContext, token: EpisodeToken) {
    if !cx.state.is_current(token) {
        tracing::debug!("Discarding stale script step for episode {:?}", token);
        return;
    }

    let config = cx.config;
    let episode = *cx.state.episode();
    match episode {
        Episode::Curious(CuriousScript::LookAround { step }) => {
            let next = step + 1;
            match config.motion.curious_look.get(next) {
                Some(look) => {
                    cx.state
                        .update_episode(Episode::Curious(CuriousScript::LookAround { step: next }));
                    cx.face(look.facing);
                    cx.timeline.schedule_in(look.hold_ms, Continuation::Script(token));
                }
                None => {
                    cx.begin(Episode::Idle);
                }
            }
        }
        Episode::Playing(PlayScript::Bounce { phase, phases }) => {
            let next = phase + 1;
            if next >= phases {
                cx.begin(Episode::Idle);
                return;
            }

            cx.state
                .update_episode(Episode::Playing(PlayScript::Bounce { phase: next, phases }));
            let height = if next % 2 == 0 {
                -config.motion.bounce_height
            } else {
                0.0
            };
            cx.state.hop.set_target(height, config.motion.hop_spring);
            match next {
                1 => cx.face(Facing::Left),
                2 => cx.face(Facing::Right),
                _ => {}
            }
            cx.timeline
                .schedule_in(config.motion.bounce_half_period_ms, Continuation::Script(token));
        }
        episode => {
            tracing::debug!("Episode {:?} has no script step", episode);
        }
    }
}

/// Finish moves that end their episode on arrival
pub fn on_arrival(cx: &mut TickContext, arrival: Arrival) {
    cx.event_bus.publish(AgentEvent::Arrived { at: arrival.at });

    let Some(owner) = arrival.owner else {
        return;
    };
    if !cx.state.is_current(owner) {
        tracing::debug!("Arrival for superseded episode {:?}", owner);
        return;
    }

    let episode = *cx.state.episode();
    match episode {
        Episode::Walking { .. } | Episode::Curious(CuriousScript::Approach { .. }) => {
            cx.begin(Episode::Idle);
        }
        _ => {}
    }
}

/// A petted cat calms down unless it was petted again since
pub fn play_fallback(cx: &mut TickContext, token: EpisodeToken) {
    if !cx.state.is_current(token) {
        tracing::debug!("Discarding stale play fallback for episode {:?}", token);
        return;
    }
    cx.begin(Episode::Idle);
    if cx.state.clear_thought() {
        cx.event_bus.publish(AgentEvent::ThoughtCleared);
    }
}

pub fn hop_settle(cx: &mut TickContext, token: EpisodeToken) {
    if cx.state.is_current(token) {
        cx.state.hop.set_target(0.0, cx.config.motion.hop_spring);
    }
}

pub fn clear_thought(cx: &mut TickContext, generation: u64) {
    if cx.state.clear_thought_if(generation) {
        cx.event_bus.publish(AgentEvent::ThoughtCleared);
    }
}

pub fn end_celebration(cx: &mut TickContext, generation: u64) {
    if cx.state.end_celebration_if(generation) {
        cx.event_bus.publish(AgentEvent::CelebrationEnded);
    }
}
