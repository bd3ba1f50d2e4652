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

//! Behavior episodes and the continuations they schedule
//!
//! An episode is one run of a behavior from entry to exit. Every episode gets
//! a fresh [`EpisodeToken`]; continuations carry the token of the episode that
//! scheduled them and are dropped when it no longer matches.

use serde::{Deserialize, Serialize};
use whiskers_common::{Behavior, Vec2};

/// Generation number of a behavior episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeToken(u64);

impl EpisodeToken {
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub fn generation(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// Why the agent is curious
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CuriousScript {
    /// Scripted look-around, `step` indexes the configured look sequence
    LookAround { step: usize },
    /// Creeping up on the pointer
    Approach { target: Vec2 },
}

/// Flavor of play
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayScript {
    /// Self-started bounce, `phase` counts half hops (up, down, up, ...)
    Bounce { phase: u32, phases: u32 },
    /// Played with by the user; ends on the fallback timer
    Petted,
}

/// Current behavior plus the sub-state of its scripted animation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Episode {
    #[default]
    Idle,
    Walking {
        target: Vec2,
    },
    Curious(CuriousScript),
    Playing(PlayScript),
    Sleeping,
}

impl Episode {
    pub fn behavior(&self) -> Behavior {
        match self {
            Episode::Idle => Behavior::Idle,
            Episode::Walking { .. } => Behavior::Walking,
            Episode::Curious(_) => Behavior::Curious,
            Episode::Playing(_) => Behavior::Playing,
            Episode::Sleeping => Behavior::Sleeping,
        }
    }
}

/// Work scheduled on the agent's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Periodic behavior decision
    DecisionTick,
    /// Periodic visibility check
    VisibilityCheck,
    /// Next step of the episode's scripted animation
    Script(EpisodeToken),
    /// Return a petted cat to idle
    PlayFallback(EpisodeToken),
    /// Let the activation hop come back down
    HopSettle(EpisodeToken),
    /// Clear the thought with this generation
    ClearThought(u64),
    /// End the celebration with this generation
    CelebrationEnd(u64),
}
