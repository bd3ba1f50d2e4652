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

//! Agent Components
//!
//! Pure data describing the agent. Components never schedule work or publish
//! events; systems do that.

mod episode;
mod spatial;
mod spring;
mod state;

// Re-export all components
pub use episode::*;
pub use spatial::*;
pub use spring::*;
pub use state::*;
