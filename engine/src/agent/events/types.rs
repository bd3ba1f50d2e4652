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

//! Event type definitions

use serde::{Deserialize, Serialize};
use whiskers_common::{Behavior, Facing, Mood, Vec2};

/// Observable changes to the agent, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentEvent {
    BehaviorChanged { from: Behavior, to: Behavior },
    MoodChanged { from: Mood, to: Mood },
    FacingChanged { facing: Facing },
    ThoughtShown { text: String },
    ThoughtCleared,
    MovementStarted { target: Vec2 },
    Arrived { at: Vec2 },
    Relocated { from_y: f64, to_y: f64 },
    CelebrationStarted,
    CelebrationEnded,
}

impl AgentEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::BehaviorChanged { .. } => "behavior_changed",
            AgentEvent::MoodChanged { .. } => "mood_changed",
            AgentEvent::FacingChanged { .. } => "facing_changed",
            AgentEvent::ThoughtShown { .. } => "thought_shown",
            AgentEvent::ThoughtCleared => "thought_cleared",
            AgentEvent::MovementStarted { .. } => "movement_started",
            AgentEvent::Arrived { .. } => "arrived",
            AgentEvent::Relocated { .. } => "relocated",
            AgentEvent::CelebrationStarted => "celebration_started",
            AgentEvent::CelebrationEnded => "celebration_ended",
        }
    }
}
