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

//! Shared agent types published to the rendering host

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point or displacement in document space.
///
/// `y` grows downward and includes the page scroll offset, so an agent at
/// `y = scroll_y` sits on the top edge of the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// What the agent is doing right now. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    #[default]
    Idle,
    Walking,
    Playing,
    Sleeping,
    Curious,
}

impl Behavior {
    pub const ALL: [Behavior; 5] = [
        Behavior::Idle,
        Behavior::Walking,
        Behavior::Playing,
        Behavior::Sleeping,
        Behavior::Curious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Idle => "idle",
            Behavior::Walking => "walking",
            Behavior::Playing => "playing",
            Behavior::Sleeping => "sleeping",
            Behavior::Curious => "curious",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic mood, drifting independently of behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Playful,
    Tired,
    Curious,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Playful, Mood::Tired, Mood::Curious];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Playful => "playful",
            Mood::Tired => "tired",
            Mood::Curious => "curious",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal facing of the sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing needed to look from `from_x` toward `to_x`.
    /// Ties face left.
    pub fn toward(from_x: f64, to_x: f64) -> Self {
        if to_x > from_x {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Everything the host needs to draw one frame of the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Rendered position, including any hop offset
    pub position: Vec2,
    pub behavior: Behavior,
    pub mood: Mood,
    pub facing: Facing,
    pub thought: Option<String>,
    /// Show the celebratory particle burst
    pub celebrating: bool,
    pub is_moving: bool,
    pub playfulness: u32,
}
