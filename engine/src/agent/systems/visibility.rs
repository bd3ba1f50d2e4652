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

//! Keeps the cat near the visible part of the page

use super::TickContext;
use crate::agent::events::AgentEvent;

/// Pulls the cat back when the user scrolls far away from it.
///
/// Only the vertical axis is corrected and behavior is never touched.
#[derive(Debug, Default)]
pub struct VisibilityGuard {
    scroll_pending: bool,
    relocations: u64,
}

impl VisibilityGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a check on the next frame. Repeated requests coalesce.
    pub fn request_check(&mut self) {
        self.scroll_pending = true;
    }

    /// Consume a pending request
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }

    pub fn relocations(&self) -> u64 {
        self.relocations
    }

    /// Relocate the cat to the middle of the window if it is more than the
    /// margin above or below it. Returns whether it moved.
    pub fn check(&mut self, cx: &mut TickContext) -> bool {
        if cx.viewport.is_degenerate() {
            return false;
        }

        let margin = cx.config.visibility.margin;
        let y = cx.state.position().y;
        if y >= cx.viewport.top() - margin && y <= cx.viewport.bottom() + margin {
            return false;
        }

        let to_y = cx.viewport.top() + cx.viewport.height / 2.0;
        cx.state.motion.relocate_y(to_y);
        self.relocations += 1;
        tracing::debug!("Relocated from y={:.1} to y={:.1}", y, to_y);
        cx.event_bus.publish(AgentEvent::Relocated { from_y: y, to_y });
        true
    }
}
