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

use crate::agent::components::{AgentState, Continuation, Viewport};
use crate::agent::events::EventBus;
use crate::agent::systems::{BehaviorSystem, InteractionSystem, TickContext, VisibilityGuard, scripts};
use crate::config::EngineConfig;
use crate::random::RandomSource;
use crate::timeline::{Millis, Timeline};
use std::time::Duration;
use whiskers_common::{AgentSnapshot, Vec2};

/// Agent context that owns the cat and everything that drives it
///
/// The host feeds it time, pointer, activation and scroll input and reads back
/// snapshots or subscribes to events. Nothing here blocks and nothing runs
/// concurrently: every operation mutates the state on one logical timeline.
///
/// # Architecture
///
/// The context wraps:
/// - **State**: the single owned [`AgentState`]
/// - **Timeline**: the simulated clock and every pending continuation
/// - **Random source**: all probability gates draw from it
/// - **Systems**: behavior decisions, interaction handling, visibility guard
/// - **Event bus**: queued [`crate::agent::events::AgentEvent`]s, dispatched
///   at the end of every public operation
///
/// # Operations
///
/// ## Host input
/// - `advance()` - Move the clock forward, running physics and due work
/// - `on_pointer_move()` - Pointer moved, in viewport coordinates
/// - `on_activate()` - Click, tap or keyboard activation
/// - `on_scroll()` / `resize()` - Viewport changes
/// - `check_visibility()` - Run the visibility guard right now
///
/// ## Output
/// - `snapshot()` - Everything the host needs to render one frame
/// - `event_bus()` - Subscribe to individual changes
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use whiskers_engine::agent::AgentContext;
/// use whiskers_engine::agent::components::Viewport;
/// use whiskers_engine::config::EngineConfig;
/// use whiskers_engine::random::SeededRandom;
///
/// let mut context = AgentContext::new(
///     EngineConfig::default(),
///     Viewport::new(1280.0, 800.0, 0.0),
///     Box::new(SeededRandom::new(7)),
/// );
/// context.on_activate();
/// context.advance(Duration::from_millis(16));
/// assert!(context.snapshot().celebrating);
/// ```
pub struct AgentContext {
    core: Core,
    behavior_system: BehaviorSystem,
    interaction_system: InteractionSystem,
    visibility_guard: VisibilityGuard,
}

/// Everything a [`TickContext`] borrows, kept apart from the systems
struct Core {
    config: EngineConfig,
    state: AgentState,
    timeline: Timeline<Continuation>,
    rng: Box<dyn RandomSource>,
    viewport: Viewport,
    event_bus: EventBus,
}

impl Core {
    fn cx(&mut self) -> TickContext<'_> {
        TickContext {
            state: &mut self.state,
            timeline: &mut self.timeline,
            rng: self.rng.as_mut(),
            config: &self.config,
            viewport: self.viewport,
            event_bus: &self.event_bus,
        }
    }
}

impl AgentContext {
    /// Mount a new cat in the middle of `viewport`
    pub fn new(config: EngineConfig, viewport: Viewport, rng: Box<dyn RandomSource>) -> Self {
        let viewport = viewport.sanitized();
        let state = AgentState::new(&viewport, &config.motion);
        let mut timeline = Timeline::new();
        timeline.schedule_in(config.decision.interval_ms, Continuation::DecisionTick);
        timeline.schedule_in(config.visibility.interval_ms, Continuation::VisibilityCheck);

        tracing::debug!("Agent mounted at {} in {:?}", state.position(), viewport);
        Self {
            core: Core {
                config,
                state,
                timeline,
                rng,
                viewport,
                event_bus: EventBus::new(),
            },
            behavior_system: BehaviorSystem::new(),
            interaction_system: InteractionSystem::new(),
            visibility_guard: VisibilityGuard::new(),
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn now(&self) -> Millis {
        self.core.timeline.now()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.core.config
    }

    pub fn state(&self) -> &AgentState {
        &self.core.state
    }

    /// Direct state access, bypassing the systems
    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.core.state
    }

    pub fn viewport(&self) -> Viewport {
        self.core.viewport
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.core.event_bus
    }

    pub fn behavior_system(&self) -> &BehaviorSystem {
        &self.behavior_system
    }

    pub fn interaction_system(&self) -> &InteractionSystem {
        &self.interaction_system
    }

    pub fn visibility_guard(&self) -> &VisibilityGuard {
        &self.visibility_guard
    }

    /// Number of continuations still pending
    pub fn pending(&self) -> usize {
        self.core.timeline.len()
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        self.core.state.snapshot()
    }

    // ============================================================================
    // Host input
    // ============================================================================

    /// Move the clock forward by `elapsed`.
    ///
    /// Physics is integrated up to each pending continuation's due time before
    /// it fires, in steps no longer than the configured physics step while
    /// anything is in motion.
    pub fn advance(&mut self, elapsed: Duration) {
        let elapsed_ms = Millis::try_from(elapsed.as_millis()).unwrap_or(Millis::MAX);
        let end = self.now().saturating_add(elapsed_ms);
        let max_step = self.core.config.motion.physics_step_ms();

        if self.visibility_guard.take_pending() {
            self.visibility_guard.check(&mut self.core.cx());
        }

        loop {
            self.fire_due();

            let now = self.now();
            if now >= end {
                break;
            }

            let mut stop = end;
            if let Some(due) = self.core.timeline.next_due() {
                stop = stop.min(due);
            }
            if self.physics_active() {
                stop = stop.min(now + max_step);
            }

            self.step_physics(stop - now);
            self.core.timeline.set_now(stop);
        }

        self.core.event_bus.process_events();
    }

    /// The pointer moved to `(x, y)` in viewport coordinates
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let reacted = self
            .interaction_system
            .on_pointer_move(&mut self.core.cx(), Vec2::new(x, y));
        self.core.event_bus.process_events();
        reacted
    }

    /// The cat was clicked, tapped or activated from the keyboard
    pub fn on_activate(&mut self) {
        self.interaction_system.on_activate(&mut self.core.cx());
        self.core.event_bus.process_events();
    }

    /// The page scrolled. The visibility check runs on the next frame, so a
    /// burst of scroll events costs one check.
    pub fn on_scroll(&mut self, scroll_y: f64) {
        let viewport = self.core.viewport;
        self.core.viewport = Viewport::new(viewport.width, viewport.height, scroll_y);
        self.visibility_guard.request_check();
    }

    /// The window was resized
    pub fn resize(&mut self, width: f64, height: f64) {
        let scroll_y = self.core.viewport.scroll_y;
        self.core.viewport = Viewport::new(width, height, scroll_y);
        tracing::debug!("Viewport resized to {:?}", self.core.viewport);
        self.visibility_guard.request_check();
    }

    /// Run the visibility guard immediately. Returns whether the cat moved.
    pub fn check_visibility(&mut self) -> bool {
        let relocated = self.visibility_guard.check(&mut self.core.cx());
        self.core.event_bus.process_events();
        relocated
    }

    // ============================================================================
    // Timeline
    // ============================================================================

    fn fire_due(&mut self) {
        let now = self.now();
        while let Some((_, continuation)) = self.core.timeline.pop_due(now) {
            self.dispatch(continuation);
        }
    }

    fn dispatch(&mut self, continuation: Continuation) {
        let mut cx = self.core.cx();
        match continuation {
            Continuation::DecisionTick => {
                self.behavior_system.tick(&mut cx);
                let interval = cx.config.decision.interval_ms.max(1);
                cx.timeline.schedule_in(interval, Continuation::DecisionTick);
            }
            Continuation::VisibilityCheck => {
                self.visibility_guard.check(&mut cx);
                let interval = cx.config.visibility.interval_ms.max(1);
                cx.timeline.schedule_in(interval, Continuation::VisibilityCheck);
            }
            Continuation::Script(token) => scripts::advance_script(&mut cx, token),
            Continuation::PlayFallback(token) => scripts::play_fallback(&mut cx, token),
            Continuation::HopSettle(token) => scripts::hop_settle(&mut cx, token),
            Continuation::ClearThought(generation) => scripts::clear_thought(&mut cx, generation),
            Continuation::CelebrationEnd(generation) => scripts::end_celebration(&mut cx, generation),
        }
    }

    // ============================================================================
    // Physics
    // ============================================================================

    fn physics_active(&self) -> bool {
        let motion = &self.core.config.motion;
        self.core.state.is_moving()
            || !self.core.state.hop.is_at_rest(motion.rest_delta, motion.rest_speed)
    }

    fn step_physics(&mut self, elapsed_ms: Millis) {
        if !self.physics_active() {
            return;
        }

        let dt = elapsed_ms as f64 / 1000.0;
        let (rest_delta, rest_speed) = {
            let motion = &self.core.config.motion;
            (motion.rest_delta, motion.rest_speed)
        };

        let state = &mut self.core.state;
        state.hop.step(dt);
        if state.hop.is_at_rest(rest_delta, rest_speed) {
            state.hop.settle();
        }

        if let Some(arrival) = state.motion.tick(dt) {
            tracing::trace!("Arrived at {}", arrival.at);
            scripts::on_arrival(&mut self.core.cx(), arrival);
        }
    }
}
