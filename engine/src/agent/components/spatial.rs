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

//! Spatial components: the visible window and clamping rectangles

use serde::{Deserialize, Serialize};
use whiskers_common::Vec2;

/// The host's visible window in document space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Viewport {
    /// Create a viewport, replacing unusable metrics with zero
    pub fn new(width: f64, height: f64, scroll_y: f64) -> Self {
        Self {
            width,
            height,
            scroll_y,
        }
        .sanitized()
    }

    /// Negative or non-finite sizes become 0, a non-finite scroll becomes 0
    pub fn sanitized(self) -> Self {
        fn size(value: f64) -> f64 {
            if value.is_finite() && value > 0.0 { value } else { 0.0 }
        }
        Self {
            width: size(self.width),
            height: size(self.height),
            scroll_y: if self.scroll_y.is_finite() { self.scroll_y } else { 0.0 },
        }
    }

    /// A zero-area viewport means the host gave us nothing to work with
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn top(&self) -> f64 {
        self.scroll_y
    }

    pub fn bottom(&self) -> f64 {
        self.scroll_y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.scroll_y + self.height / 2.0)
    }

    /// Rectangle currently visible to the user
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            Vec2::new(0.0, self.top()),
            Vec2::new(self.width, self.bottom()),
        )
    }

    /// Convert pointer client coordinates to document space
    pub fn to_document(&self, client: Vec2) -> Vec2 {
        Vec2::new(client.x, client.y + self.scroll_y)
    }
}

/// Axis aligned rectangle used to clamp movement targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Clamp `point` into the rectangle.
    ///
    /// NaN components are replaced by the matching component of `fallback`
    /// first. Never panics, even for an inverted rectangle.
    pub fn clamp(&self, point: Vec2, fallback: Vec2) -> Vec2 {
        fn axis(value: f64, fallback: f64, min: f64, max: f64) -> f64 {
            let value = if value.is_nan() { fallback } else { value };
            value.min(max).max(min)
        }
        Vec2::new(
            axis(point.x, fallback.x, self.min.x, self.max.x),
            axis(point.y, fallback.y, self.min.y, self.max.y),
        )
    }
}
