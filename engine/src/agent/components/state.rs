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

//! The agent's complete mutable state

use super::episode::{Episode, EpisodeToken};
use super::spatial::Viewport;
use super::spring::{PositionController, SpringAxis};
use crate::config::MotionConfig;
use crate::timeline::Millis;
use whiskers_common::{AgentSnapshot, Behavior, Facing, Mood, Vec2};

/// A transient line of text above the cat's head
#[derive(Debug, Clone, PartialEq)]
pub struct ThoughtBubble {
    pub text: String,
    pub generation: u64,
}

/// Single owned agent state, mutated only through the systems
#[derive(Debug, Clone)]
pub struct AgentState {
    pub motion: PositionController,
    /// Vertical hop offset layered over the base position (negative is up)
    pub hop: SpringAxis,
    pub mood: Mood,
    pub facing: Facing,
    /// Interaction count. Never decays.
    pub playfulness: u32,
    pub last_interaction_at: Millis,
    pub last_mood_change_at: Millis,
    episode: Episode,
    token: EpisodeToken,
    thought: Option<ThoughtBubble>,
    thought_generation: u64,
    celebrating: bool,
    celebration_generation: u64,
}

impl AgentState {
    /// Fresh agent centered in the viewport
    pub fn new(viewport: &Viewport, motion: &MotionConfig) -> Self {
        Self {
            motion: PositionController::new(
                viewport.center(),
                motion.walk_spring,
                motion.rest_delta,
                motion.rest_speed,
            ),
            hop: SpringAxis::new(0.0, motion.hop_spring),
            mood: Mood::Happy,
            facing: Facing::Right,
            playfulness: 0,
            last_interaction_at: 0,
            last_mood_change_at: 0,
            episode: Episode::Idle,
            token: EpisodeToken::new(0),
            thought: None,
            thought_generation: 0,
            celebrating: false,
            celebration_generation: 0,
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.episode.behavior()
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Token of the episode currently running
    pub fn token(&self) -> EpisodeToken {
        self.token
    }

    /// Whether `token` still names the running episode
    pub fn is_current(&self, token: EpisodeToken) -> bool {
        self.token == token
    }

    /// Replace the running episode, superseding everything it scheduled
    pub fn begin_episode(&mut self, episode: Episode) -> EpisodeToken {
        self.episode = episode;
        self.token = self.token.next();
        self.token
    }

    /// Advance the running episode's script without superseding it
    pub fn update_episode(&mut self, episode: Episode) {
        self.episode = episode;
    }

    /// Base position, without hop offset
    pub fn position(&self) -> Vec2 {
        self.motion.position()
    }

    /// Position as the host should draw it
    pub fn rendered_position(&self) -> Vec2 {
        self.position() + Vec2::new(0.0, self.hop.value)
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_moving()
    }

    pub fn thought(&self) -> Option<&ThoughtBubble> {
        self.thought.as_ref()
    }

    /// Show a thought, returning its generation for the clear timer
    pub fn set_thought(&mut self, text: impl Into<String>) -> u64 {
        self.thought_generation += 1;
        self.thought = Some(ThoughtBubble {
            text: text.into(),
            generation: self.thought_generation,
        });
        self.thought_generation
    }

    /// Clear the thought only if it is still the one with `generation`
    pub fn clear_thought_if(&mut self, generation: u64) -> bool {
        match &self.thought {
            Some(bubble) if bubble.generation == generation => {
                self.thought = None;
                true
            }
            _ => false,
        }
    }

    /// Clear whatever thought is showing
    pub fn clear_thought(&mut self) -> bool {
        self.thought.take().is_some()
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn start_celebration(&mut self) -> u64 {
        self.celebration_generation += 1;
        self.celebrating = true;
        self.celebration_generation
    }

    /// End the celebration only if no newer one started since
    pub fn end_celebration_if(&mut self, generation: u64) -> bool {
        if self.celebrating && self.celebration_generation == generation {
            self.celebrating = false;
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.rendered_position(),
            behavior: self.behavior(),
            mood: self.mood,
            facing: self.facing,
            thought: self.thought.as_ref().map(|bubble| bubble.text.clone()),
            celebrating: self.celebrating,
            is_moving: self.is_moving(),
            playfulness: self.playfulness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::components::CuriousScript;

    fn state() -> AgentState {
        AgentState::new(&Viewport::new(800.0, 600.0, 100.0), &MotionConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.position(), Vec2::new(400.0, 400.0));
        assert_eq!(state.behavior(), Behavior::Idle);
        assert_eq!(state.mood, Mood::Happy);
        assert_eq!(state.facing, Facing::Right);
        assert!(state.thought().is_none());
        assert_eq!(state.playfulness, 0);
        assert!(!state.is_moving());
    }

    #[test]
    fn test_begin_episode_supersedes_token() {
        let mut state = state();
        let first = state.begin_episode(Episode::Sleeping);
        assert!(state.is_current(first));
        assert_eq!(state.behavior(), Behavior::Sleeping);

        let second = state.begin_episode(Episode::Curious(CuriousScript::LookAround { step: 0 }));
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        assert_eq!(state.behavior(), Behavior::Curious);

        state.update_episode(Episode::Curious(CuriousScript::LookAround { step: 1 }));
        assert!(state.is_current(second));
    }

    #[test]
    fn test_thought_generations() {
        let mut state = state();
        let first = state.set_thought("Zzz...");
        let second = state.set_thought("Wheee!");

        assert!(!state.clear_thought_if(first));
        assert_eq!(state.thought().map(|t| t.text.as_str()), Some("Wheee!"));
        assert!(state.clear_thought_if(second));
        assert!(state.thought().is_none());
        assert!(!state.clear_thought());
    }

    #[test]
    fn test_celebration_generations() {
        let mut state = state();
        let first = state.start_celebration();
        let second = state.start_celebration();
        assert!(!state.end_celebration_if(first));
        assert!(state.is_celebrating());
        assert!(state.end_celebration_if(second));
        assert!(!state.is_celebrating());
    }

    #[test]
    fn test_snapshot_includes_hop_offset() {
        let mut state = state();
        state.hop.value = -30.0;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.position, Vec2::new(400.0, 370.0));
        assert_eq!(snapshot.behavior, Behavior::Idle);
    }
}
