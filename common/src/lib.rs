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

//! Whiskers Common Types
//!
//! This crate defines the semantic state the mascot engine publishes to its host:
//! - Geometry (`Vec2`)
//! - Behavior, mood and facing enumerations
//! - The per-frame `AgentSnapshot` the host renders from
//!
//! The host owns all drawing; nothing in here knows about pixels, colors or icons.

pub mod agent;

pub use agent::{AgentSnapshot, Behavior, Facing, Mood, Vec2};
